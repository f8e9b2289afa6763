//! [`Article`]-related [`Database`] implementations of the [`Memory`]
//! store.

use common::{
    operations::{By, Delete, Insert, Select, Update},
    validate::{self, Constraint},
};
use tracerr::Traced;

use crate::{
    domain::{article, Article},
    infra::database::{memory::Memory, Database, Error},
    read,
};

impl Database<Select<By<Option<Article>, article::Id>>> for Memory {
    type Ok = Option<Article>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Article>, article::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let Some(desc) = self.inner.articles.read().get(&id).cloned() else {
            return Ok(None);
        };

        let author = self.resolve_user(&desc.author)?;
        Article::new(desc, author)
            .map(Some)
            .map_err(|e| tracerr::new!(Error::Corrupt(e)))
    }
}

impl
    Database<
        Select<By<read::article::list::Page, read::article::list::Selector>>,
    > for Memory
{
    type Ok = read::article::list::Page;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::article::list::Page, read::article::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let selector = by.into_inner();
        let filter = selector.filter;

        let descs = self
            .inner
            .articles
            .read()
            .values()
            .cloned()
            .collect::<Vec<_>>();

        let mut articles = Vec::with_capacity(descs.len());
        for desc in descs {
            let author = self.resolve_user(&desc.author)?;
            let article = Article::new(desc, author)
                .map_err(|e| tracerr::new!(Error::Corrupt(e)))?;

            let matches = filter
                .author
                .as_ref()
                .is_none_or(|id| article.author().id() == Some(id))
                && filter
                    .from
                    .is_none_or(|from| article.date() >= from.coerce())
                && filter.to.is_none_or(|to| article.date() <= to.coerce())
                && filter.title.as_ref().is_none_or(|term| {
                    Self::matches_term(article.title().as_ref(), term)
                })
                && filter.tag.as_ref().is_none_or(|term| {
                    article
                        .tags()
                        .iter()
                        .any(|tag| Self::matches_term(tag.as_ref(), term))
                });
            if matches {
                articles.push(article);
            }
        }

        articles.sort_unstable_by(|a, b| b.date().cmp(&a.date()));

        Ok(selector.arguments.paginate(articles))
    }
}

impl Database<Insert<Article>> for Memory {
    type Ok = article::Id;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(article): Insert<Article>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = article.id().cloned().unwrap_or_else(article::Id::generate);
        let mut desc = article.descriptor();
        desc.id = Some(id.to_string());
        drop(self.inner.articles.write().insert(id.clone(), desc));
        Ok(id)
    }
}

impl Database<Update<Article>> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Update(article): Update<Article>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = article.id().cloned().ok_or_else(|| {
            tracerr::new!(Error::Corrupt(validate::Error::violation(
                "id",
                Constraint::Required,
            )))
        })?;
        drop(self.inner.articles.write().insert(id, article.descriptor()));
        Ok(())
    }
}

impl Database<Delete<By<Article, article::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Article, article::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.inner.articles.write().remove(&by.into_inner()));
        Ok(())
    }
}
