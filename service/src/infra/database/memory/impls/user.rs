//! [`User`]-related [`Database`] implementations of the [`Memory`] store.

use std::collections::HashMap;

use common::{
    operations::{By, Delete, Insert, Select, Update},
    validate::{self, Constraint},
};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::database::{memory::Memory, Database, Error},
    read,
};

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.inner
            .users
            .read()
            .get(&id)
            .cloned()
            .map(Self::populate_user)
            .transpose()
    }
}

impl<'l> Database<Select<By<Option<User>, &'l user::Email>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        self.inner
            .users
            .read()
            .values()
            .find(|desc| desc.email == email.as_ref())
            .cloned()
            .map(Self::populate_user)
            .transpose()
    }
}

impl Database<Select<By<HashMap<user::Id, User>, Vec<user::Id>>>> for Memory {
    type Ok = HashMap<user::Id, User>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<user::Id, User>, Vec<user::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        let users = self.inner.users.read();
        ids.into_iter()
            .filter_map(|id| {
                users.get(&id).cloned().map(|desc| {
                    Self::populate_user(desc).map(|user| (id, user))
                })
            })
            .collect()
    }
}

impl Database<Select<By<read::user::list::Page, read::user::list::Selector>>>
    for Memory
{
    type Ok = read::user::list::Page;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::user::list::Page, read::user::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let selector = by.into_inner();
        let filter = selector.filter;

        let mut descs = self
            .inner
            .users
            .read()
            .values()
            .filter(|desc| {
                filter.first_name.as_ref().is_none_or(|term| {
                    Self::matches_term(&desc.first_name, term)
                }) && filter.last_name.as_ref().is_none_or(|term| {
                    Self::matches_term(&desc.last_name, term)
                })
            })
            .cloned()
            .collect::<Vec<_>>();

        descs.sort_unstable_by(|a, b| {
            (a.last_name.as_str(), a.first_name.as_str())
                .cmp(&(b.last_name.as_str(), b.first_name.as_str()))
        });

        let users = descs
            .into_iter()
            .map(Self::populate_user)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(selector.arguments.paginate(users))
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = user::Id;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = user.id().cloned().unwrap_or_else(user::Id::generate);
        let mut desc = user.descriptor();
        desc.id = Some(id.to_string());
        drop(self.inner.users.write().insert(id.clone(), desc));
        Ok(id)
    }
}

impl Database<Update<User>> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = user.id().cloned().ok_or_else(|| {
            tracerr::new!(Error::Corrupt(validate::Error::violation(
                "id",
                Constraint::Required,
            )))
        })?;
        drop(self.inner.users.write().insert(id, user.descriptor()));
        Ok(())
    }
}

impl Database<Delete<By<User, user::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.inner.users.write().remove(&by.into_inner()));
        Ok(())
    }
}
