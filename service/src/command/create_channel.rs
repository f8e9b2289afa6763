//! [`Command`] for creating a new [`Channel`].

use common::{
    operations::Insert,
    validate::{self, Constraint},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{channel, Channel, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Channel`].
///
/// The creating [`User`] becomes the channel's owner; the member map
/// starts empty.
#[derive(Clone, Debug)]
pub struct CreateChannel {
    /// [`User`] owning the new [`Channel`].
    pub owner: User,

    /// Title of the new [`Channel`].
    pub title: String,

    /// Summary of the new [`Channel`].
    pub summary: String,

    /// Tags of the new [`Channel`].
    pub tags: Vec<String>,
}

impl<Db> Command<CreateChannel> for Service<Db>
where
    Db: Database<
        Insert<Channel>,
        Ok = channel::Id,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Channel;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateChannel) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateChannel {
            owner,
            title,
            summary,
            tags,
        } = cmd;

        let owner_id = owner
            .id()
            .ok_or_else(|| {
                E::Validation(validate::Error::violation(
                    "owner",
                    Constraint::Required,
                ))
            })
            .map_err(tracerr::wrap!())?
            .to_string();

        let mut channel = Channel::new(
            channel::Descriptor {
                id: None,
                owner: owner_id,
                date: DateTime::now().to_rfc3339(),
                title,
                summary,
                tags,
                members: Vec::new(),
            },
            owner,
            Vec::new(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        let id = self
            .database()
            .execute(Insert(channel.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        channel.assign_id(id).map_err(tracerr::from_and_wrap!(=> E))?;

        Ok(channel)
    }
}

/// Error of [`CreateChannel`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Provided descriptor failed its validation.
    #[display("`Channel` validation failed: {_0}")]
    Validation(validate::Error),
}
