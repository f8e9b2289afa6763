//! REST API definitions.
//!
//! Every endpoint follows the same pipeline: the bearer token resolves into
//! a [`Session`] through the [`Context`], an authorization filter gates the
//! operation, and only then the domain operation runs.
//!
//! [`Context`]: crate::Context
//! [`Session`]: service::auth::Session

pub mod articles;
pub mod channels;
pub mod sessions;
pub mod status;
pub mod users;

use axum::Router;
use common::pagination;
use serde::Deserialize;

use crate::{error::AsError, Error};

/// Builds the [`Router`] of the whole REST API.
pub fn router() -> Router {
    Router::new()
        .merge(status::router())
        .nest("/sessions", sessions::router())
        .nest("/users", users::router())
        .nest("/articles", articles::router())
        .nest("/channels", channels::router())
}

/// Pagination query parameters, shared by every list endpoint.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Pagination {
    /// Zero-based page number.
    pub page: Option<usize>,

    /// Page size.
    pub size: Option<usize>,
}

impl Pagination {
    /// Validates these parameters into pagination [`Arguments`].
    ///
    /// # Errors
    ///
    /// Errors with a validation [`Error`] if the parameters are out of
    /// bounds.
    ///
    /// [`Arguments`]: pagination::Arguments
    pub fn arguments(self) -> Result<pagination::Arguments, Error> {
        pagination::Arguments::new(self.page, self.size)
            .map_err(AsError::into_error)
    }
}
