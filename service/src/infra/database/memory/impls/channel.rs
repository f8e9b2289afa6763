//! [`Channel`]-related [`Database`] implementations of the [`Memory`]
//! store.

use common::{
    operations::{By, Delete, Insert, Select, Update},
    validate::{self, Constraint},
};
use tracerr::Traced;

use crate::{
    domain::{channel, Channel},
    infra::database::{memory::Memory, Database, Error},
    read,
};

impl Memory {
    /// Re-populates a [`Channel`] out of its stored descriptor, resolving
    /// its owner and members.
    fn populate_channel(
        &self,
        desc: channel::Descriptor,
    ) -> Result<Channel, Traced<Error>> {
        let owner = self.resolve_user(&desc.owner)?;
        let members = self.resolve_users(&desc.members)?;
        Channel::new(desc, owner, members)
            .map_err(|e| tracerr::new!(Error::Corrupt(e)))
    }
}

impl Database<Select<By<Option<Channel>, channel::Id>>> for Memory {
    type Ok = Option<Channel>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Channel>, channel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let Some(desc) = self.inner.channels.read().get(&id).cloned() else {
            return Ok(None);
        };
        self.populate_channel(desc).map(Some)
    }
}

impl
    Database<
        Select<By<read::channel::list::Page, read::channel::list::Selector>>,
    > for Memory
{
    type Ok = read::channel::list::Page;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::channel::list::Page, read::channel::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let selector = by.into_inner();
        let filter = selector.filter;

        let descs = self
            .inner
            .channels
            .read()
            .values()
            .cloned()
            .collect::<Vec<_>>();

        let mut channels = Vec::with_capacity(descs.len());
        for desc in descs {
            let channel = self.populate_channel(desc)?;

            let membership = filter.member.as_ref().is_none_or(|id| {
                channel.owner().id() == Some(id) || channel.members().has(id)
            });
            let matches = membership
                && filter
                    .owner
                    .as_ref()
                    .is_none_or(|id| channel.owner().id() == Some(id))
                && filter
                    .from
                    .is_none_or(|from| channel.date() >= from.coerce())
                && filter.to.is_none_or(|to| channel.date() <= to.coerce())
                && filter.title.as_ref().is_none_or(|term| {
                    Self::matches_term(channel.title().as_ref(), term)
                })
                && filter.tag.as_ref().is_none_or(|term| {
                    channel
                        .tags()
                        .iter()
                        .any(|tag| Self::matches_term(tag.as_ref(), term))
                });
            if matches {
                channels.push(channel);
            }
        }

        channels.sort_unstable_by(|a, b| b.date().cmp(&a.date()));

        Ok(selector.arguments.paginate(channels))
    }
}

impl Database<Insert<Channel>> for Memory {
    type Ok = channel::Id;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(channel): Insert<Channel>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = channel.id().cloned().unwrap_or_else(channel::Id::generate);
        let mut desc = channel.descriptor();
        desc.id = Some(id.to_string());
        drop(self.inner.channels.write().insert(id.clone(), desc));
        Ok(id)
    }
}

impl Database<Update<Channel>> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Update(channel): Update<Channel>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = channel.id().cloned().ok_or_else(|| {
            tracerr::new!(Error::Corrupt(validate::Error::violation(
                "id",
                Constraint::Required,
            )))
        })?;
        drop(self.inner.channels.write().insert(id, channel.descriptor()));
        Ok(())
    }
}

impl Database<Delete<By<Channel, channel::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Channel, channel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.inner.channels.write().remove(&by.into_inner()));
        Ok(())
    }
}
