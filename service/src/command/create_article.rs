//! [`Command`] for creating a new [`Article`].

use common::{
    operations::Insert,
    validate::{self, Constraint},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{article, Article, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Article`].
#[derive(Clone, Debug)]
pub struct CreateArticle {
    /// [`User`] authoring the [`Article`].
    pub author: User,

    /// Title of the new [`Article`].
    pub title: String,

    /// Body text of the new [`Article`].
    pub text: String,

    /// Tags of the new [`Article`].
    pub tags: Vec<String>,
}

impl<Db> Command<CreateArticle> for Service<Db>
where
    Db: Database<
        Insert<Article>,
        Ok = article::Id,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Article;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateArticle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateArticle {
            author,
            title,
            text,
            tags,
        } = cmd;

        let author_id = author
            .id()
            .ok_or_else(|| {
                E::Validation(validate::Error::violation(
                    "author",
                    Constraint::Required,
                ))
            })
            .map_err(tracerr::wrap!())?
            .to_string();

        let mut article = Article::new(
            article::Descriptor {
                id: None,
                author: author_id,
                date: DateTime::now().to_rfc3339(),
                title,
                text,
                tags,
            },
            author,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        let id = self
            .database()
            .execute(Insert(article.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        article.assign_id(id).map_err(tracerr::from_and_wrap!(=> E))?;

        Ok(article)
    }
}

/// Error of [`CreateArticle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Provided descriptor failed its validation.
    #[display("`Article` validation failed: {_0}")]
    Validation(validate::Error),
}
