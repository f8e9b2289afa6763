//! Background [`Task`] definitions.

pub mod background;
pub mod expire_sessions;

/// [`Task`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Task;

pub use self::{
    background::{Background, Stopper},
    expire_sessions::ExpireSessions,
};
