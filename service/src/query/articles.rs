//! [`Query`] collection related to multiple [`Article`]s.
//!
//! [`Article`]: crate::domain::Article

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a list of [`Article`]s.
///
/// [`Article`]: crate::domain::Article
pub type List =
    DatabaseQuery<By<read::article::list::Page, read::article::list::Selector>>;
