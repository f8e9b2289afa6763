//! [`Query`] collection related to a single [`Channel`].

use common::operations::By;

use crate::domain::{channel, Channel};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Channel`] by its [`channel::Id`].
pub type ById = DatabaseQuery<By<Option<Channel>, channel::Id>>;
