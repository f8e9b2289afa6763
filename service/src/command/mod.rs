//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_article;
pub mod create_channel;
pub mod create_channel_message;
pub mod create_user;
pub mod create_user_session;
pub mod modify_article;
pub mod modify_channel;
pub mod modify_user;
pub mod remove_channel;
pub mod remove_user_session;

use common::operations::{By, Delete};
use tracerr::Traced;

use crate::{
    infra::{database, Database},
    Service,
};

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    create_article::CreateArticle, create_channel::CreateChannel,
    create_channel_message::CreateChannelMessage, create_user::CreateUser,
    create_user_session::CreateUserSession, modify_article::ModifyArticle,
    modify_channel::ModifyChannel, modify_user::ModifyUser,
    remove_channel::RemoveChannel, remove_user_session::RemoveUserSession,
};

/// [`Command`] [`Delete`]ing a `T`ype from a [`Database`].
///
/// Mutating operations are never retried, to avoid duplicate side effects.
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseCommand<T>(T);

impl<W, B> DatabaseCommand<Delete<By<W, B>>> {
    /// Creates a new [`DatabaseCommand`] deleting a `W` by the provided
    /// `B`.
    #[must_use]
    pub fn delete(by: B) -> Self {
        Self(Delete(By::new(by)))
    }
}

impl<Db, W, B> Command<DatabaseCommand<Delete<By<W, B>>>> for Service<Db>
where
    Db: Database<Delete<By<W, B>>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DatabaseCommand(op): DatabaseCommand<Delete<By<W, B>>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database().execute(op).await.map_err(tracerr::wrap!())
    }
}
