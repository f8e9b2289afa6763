//! [`Command`] for modifying an existing [`Channel`].

use std::collections::HashMap;

use common::{
    operations::{By, Select, Update},
    validate,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{user, Channel, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for modifying an existing [`Channel`].
///
/// Only the provided fields are modified; every modification passes the
/// field's declared validator before anything is persisted. A provided
/// member list replaces the channel's member map wholesale.
#[derive(Clone, Debug)]
pub struct ModifyChannel {
    /// [`Channel`] to modify.
    pub channel: Channel,

    /// New title, if changing.
    pub title: Option<String>,

    /// New summary, if changing.
    pub summary: Option<String>,

    /// New tags, if changing.
    pub tags: Option<Vec<String>>,

    /// New member [`user::Id`]s, if changing.
    pub members: Option<Vec<user::Id>>,
}

impl<Db> Command<ModifyChannel> for Service<Db>
where
    Db: Database<
            Select<By<HashMap<user::Id, User>, Vec<user::Id>>>,
            Ok = HashMap<user::Id, User>,
            Err = Traced<database::Error>,
        > + Database<Update<Channel>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Channel;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: ModifyChannel) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ModifyChannel {
            mut channel,
            title,
            summary,
            tags,
            members,
        } = cmd;

        if let Some(title) = title {
            channel.set_title(title).map_err(tracerr::from_and_wrap!(=> E))?;
        }
        if let Some(summary) = summary {
            channel
                .set_summary(summary)
                .map_err(tracerr::from_and_wrap!(=> E))?;
        }
        if let Some(tags) = tags {
            channel.set_tags(tags).map_err(tracerr::from_and_wrap!(=> E))?;
        }
        if let Some(ids) = members {
            let mut resolved = self
                .database()
                .execute(Select(By::new(ids.clone())))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;

            let mut members = Vec::with_capacity(ids.len());
            for id in ids {
                let user = resolved
                    .remove(&id)
                    .ok_or_else(|| E::UnknownMember(id))
                    .map_err(tracerr::wrap!())?;
                members.push(user);
            }
            channel.set_members(members);
        }

        self.database()
            .execute(Update(channel.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(channel)
    }
}

/// Error of [`ModifyChannel`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Provided member [`user::Id`] does not resolve to a [`User`].
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UnknownMember(#[error(not(source))] user::Id),

    /// Provided modification failed its validation.
    #[display("`Channel` validation failed: {_0}")]
    Validation(validate::Error),
}
