//! [`Command`] for removing a [`Session`].
//!
//! [`Session`]: crate::auth::Session

use std::convert::Infallible;

use crate::{auth::Token, Service};

use super::Command;

/// [`Command`] for removing a [`Session`].
///
/// The [`Token`] no longer resolves afterwards. Removing an already removed
/// (or expired) session is not an error.
///
/// [`Session`]: crate::auth::Session
#[derive(Clone, Debug)]
pub struct RemoveUserSession {
    /// [`Token`] of the [`Session`] to remove.
    ///
    /// [`Session`]: crate::auth::Session
    pub token: Token,
}

impl<Db> Command<RemoveUserSession> for Service<Db> {
    type Ok = bool;
    type Err = Infallible;

    async fn execute(
        &self,
        cmd: RemoveUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        let RemoveUserSession { token } = cmd;

        Ok(self.sessions().remove(&token))
    }
}
