//! [`Query`] collection related to a single [`Article`].

use common::operations::By;

use crate::domain::{article, Article};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries an [`Article`] by its [`article::Id`].
pub type ById = DatabaseQuery<By<Option<Article>, article::Id>>;
