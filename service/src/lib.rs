//! Service contains the business logic of the application.

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod auth;
pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use std::{error::Error, sync::Arc};

use common::operations::{By, Start};

use crate::auth::SessionStore;

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    /// Sessions configuration.
    pub sessions: SessionsConfig,
}

/// Sessions configuration of a [`Service`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionsConfig {
    /// [`SessionStore`] configuration.
    pub store: auth::store::Config,

    /// [`task::ExpireSessions`] watcher configuration.
    pub watcher: task::expire_sessions::Config,
}

/// Domain service.
///
/// Owns the single [`SessionStore`] instance and the [`Database`] handle,
/// and is passed by injection to everything needing them: no component
/// reaches for global state.
///
/// [`Database`]: infra::Database
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    ///
    /// [`Database`]: infra::Database
    database: Db,

    /// [`SessionStore`] of this [`Service`].
    sessions: Arc<SessionStore>,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters, spawning its
    /// [`task::ExpireSessions`] watcher inside the returned
    /// [`task::Background`] environment.
    pub fn new(config: Config, database: Db) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::ExpireSessions<Self>,
                        (task::expire_sessions::Config, task::Stopper),
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Clone
            + 'static,
    {
        let sessions = Arc::new(SessionStore::new(config.sessions.store));
        let this = Service {
            config,
            database,
            sessions,
        };

        let mut bg = task::Background::default();
        let stopper = bg.stopper();
        let watcher = this.config.sessions.watcher;
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new((watcher, stopper)))).await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    ///
    /// [`Database`]: infra::Database
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns the [`SessionStore`] of this [`Service`].
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}
