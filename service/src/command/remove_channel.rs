//! [`Command`] for removing a [`Channel`].

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{channel, Channel, ChannelMessage},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for removing a [`Channel`].
///
/// Removes the channel's messages first, so no orphaned message survives
/// its channel.
#[derive(Clone, Debug)]
pub struct RemoveChannel {
    /// ID of the [`Channel`] to remove.
    pub id: channel::Id,
}

impl<Db> Command<RemoveChannel> for Service<Db>
where
    Db: Database<
            Delete<By<ChannelMessage, channel::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Channel, channel::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RemoveChannel) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RemoveChannel { id } = cmd;

        self.database()
            .execute(Delete(By::<ChannelMessage, _>::new(id.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        self.database()
            .execute(Delete(By::<Channel, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(())
    }
}

/// Error of [`RemoveChannel`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
