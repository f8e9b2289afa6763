//! [`ChannelMessage`]-related [`Database`] implementations of the
//! [`Memory`] store.

use common::operations::{By, Delete, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{channel, ChannelMessage},
    infra::database::{memory::Memory, Database, Error},
    read,
};

impl
    Database<
        Select<
            By<
                read::channel_message::list::Page,
                read::channel_message::list::Selector,
            >,
        >,
    > for Memory
{
    type Ok = read::channel_message::list::Page;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                read::channel_message::list::Page,
                read::channel_message::list::Selector,
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let selector = by.into_inner();
        let channel_id = selector.filter.channel.to_string();

        let descs = self
            .inner
            .channel_messages
            .read()
            .values()
            .filter(|desc| desc.channel == channel_id)
            .cloned()
            .collect::<Vec<_>>();

        let mut messages = Vec::with_capacity(descs.len());
        for desc in descs {
            let author = self.resolve_user(&desc.author)?;
            messages.push(
                ChannelMessage::new(desc, author)
                    .map_err(|e| tracerr::new!(Error::Corrupt(e)))?,
            );
        }

        messages.sort_unstable_by(|a, b| a.date().cmp(&b.date()));

        Ok(selector.arguments.paginate(messages))
    }
}

impl Database<Insert<ChannelMessage>> for Memory {
    type Ok = channel::message::Id;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(message): Insert<ChannelMessage>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = message
            .id()
            .cloned()
            .unwrap_or_else(channel::message::Id::generate);
        let mut desc = message.descriptor();
        desc.id = Some(id.to_string());
        drop(self.inner.channel_messages.write().insert(id.clone(), desc));
        Ok(id)
    }
}

impl Database<Delete<By<ChannelMessage, channel::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<ChannelMessage, channel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let channel_id = by.into_inner().to_string();
        self.inner
            .channel_messages
            .write()
            .retain(|_, desc| desc.channel != channel_id);
        Ok(())
    }
}
