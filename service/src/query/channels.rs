//! [`Query`] collection related to multiple [`Channel`]s.
//!
//! [`Channel`]: crate::domain::Channel

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a list of [`Channel`]s.
///
/// [`Channel`]: crate::domain::Channel
pub type List =
    DatabaseQuery<By<read::channel::list::Page, read::channel::list::Selector>>;
