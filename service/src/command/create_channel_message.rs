//! [`Command`] for posting a new [`ChannelMessage`].

use common::{
    operations::Insert,
    validate::{self, Constraint},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{channel, Channel, ChannelMessage, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for posting a new [`ChannelMessage`] into a [`Channel`].
#[derive(Clone, Debug)]
pub struct CreateChannelMessage {
    /// [`Channel`] the message is posted into.
    pub channel: Channel,

    /// [`User`] authoring the message.
    pub author: User,

    /// Text of the new message.
    pub text: String,
}

impl<Db> Command<CreateChannelMessage> for Service<Db>
where
    Db: Database<
        Insert<ChannelMessage>,
        Ok = channel::message::Id,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ChannelMessage;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateChannelMessage,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateChannelMessage {
            channel,
            author,
            text,
        } = cmd;

        let required = |field: &str| {
            E::Validation(validate::Error::violation(field, Constraint::Required))
        };
        let channel_id = channel
            .id()
            .ok_or_else(|| required("channel"))
            .map_err(tracerr::wrap!())?
            .to_string();
        let author_id = author
            .id()
            .ok_or_else(|| required("author"))
            .map_err(tracerr::wrap!())?
            .to_string();

        let mut message = ChannelMessage::new(
            channel::message::Descriptor {
                id: None,
                channel: channel_id,
                author: author_id,
                date: DateTime::now().to_rfc3339(),
                text,
            },
            author,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        let id = self
            .database()
            .execute(Insert(message.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        message.assign_id(id).map_err(tracerr::from_and_wrap!(=> E))?;

        Ok(message)
    }
}

/// Error of [`CreateChannelMessage`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Provided descriptor failed its validation.
    #[display("`ChannelMessage` validation failed: {_0}")]
    Validation(validate::Error),
}
