//! In-memory [`Database`] implementation.
//!
//! Stores raw entity descriptors in process memory, keyed by ID, and
//! re-populates entities through their validating constructors on every
//! read, the same way a document database mapping would. Reference fields
//! (authors, owners, members) are resolved against the user collection
//! before population.
//!
//! Operations complete synchronously under the inner locks, so the bounded
//! execution time required by the [`Database`] contract holds trivially
//! here.
//!
//! [`Database`]: super::Database

mod impls;

use std::{collections::HashMap, sync::Arc};

use common::validate::{self, Constraint};
use parking_lot::RwLock;
use tracerr::Traced;

use crate::domain::{article, channel, user, User};

use super::Error;

/// In-memory document store.
///
/// Cheaply cloneable: clones share the same underlying collections.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Shared collections of this [`Memory`] store.
    inner: Arc<Collections>,
}

/// Raw descriptor collections of a [`Memory`] store.
#[derive(Debug, Default)]
struct Collections {
    /// Stored [`user::Descriptor`]s, keyed by ID.
    users: RwLock<HashMap<user::Id, user::Descriptor>>,

    /// Stored [`article::Descriptor`]s, keyed by ID.
    articles: RwLock<HashMap<article::Id, article::Descriptor>>,

    /// Stored [`channel::Descriptor`]s, keyed by ID.
    channels: RwLock<HashMap<channel::Id, channel::Descriptor>>,

    /// Stored [`channel::message::Descriptor`]s, keyed by ID.
    channel_messages:
        RwLock<HashMap<channel::message::Id, channel::message::Descriptor>>,
}

impl Memory {
    /// Creates a new empty [`Memory`] store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-populates a [`User`] out of its stored descriptor.
    fn populate_user(desc: user::Descriptor) -> Result<User, Traced<Error>> {
        User::new(desc).map_err(|e| tracerr::new!(Error::Corrupt(e)))
    }

    /// Resolves the [`User`] referenced by the provided ID, failing if the
    /// reference is dangling.
    ///
    /// Used while re-populating entities referencing users: a stored record
    /// pointing at a missing user is corrupt.
    fn resolve_user(&self, id: &str) -> Result<User, Traced<Error>> {
        let id = user::Id::new(id).ok_or_else(|| {
            tracerr::new!(Error::Corrupt(validate::Error::violation(
                "user",
                Constraint::Format,
            )))
        })?;
        let desc = self.inner.users.read().get(&id).cloned().ok_or_else(|| {
            tracerr::new!(Error::Corrupt(validate::Error::violation(
                "user",
                Constraint::Required,
            )))
        })?;
        Self::populate_user(desc)
    }

    /// Resolves every [`User`] referenced by the provided IDs, failing on a
    /// dangling reference.
    fn resolve_users(
        &self,
        ids: &[String],
    ) -> Result<Vec<User>, Traced<Error>> {
        ids.iter().map(|id| self.resolve_user(id)).collect()
    }

    /// Indicates whether the `term` occurs in the `value`,
    /// case-insensitively.
    fn matches_term(value: &str, term: &str) -> bool {
        value.to_lowercase().contains(&term.to_lowercase())
    }
}
