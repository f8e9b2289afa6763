//! [`Command`] for authorizing a request [`Token`].

use tracerr::Traced;

use crate::{
    auth::{Session, Token, UnknownSession},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a request [`Token`].
///
/// Resolves the bearer [`Token`] of an incoming request into its live
/// [`Session`], sliding the session's `last_access_date` forward: every
/// authorized call extends the session's life.
#[derive(Clone, Debug)]
pub struct AuthorizeUserSession {
    /// [`Session`] [`Token`] to authorize.
    pub token: Token,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db> {
    type Ok = Session;
    type Err = Traced<UnknownSession>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        let AuthorizeUserSession { token } = cmd;

        self.sessions().get(&token).map_err(tracerr::wrap!())
    }
}
