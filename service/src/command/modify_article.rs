//! [`Command`] for modifying an existing [`Article`].

use common::{operations::Update, validate};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::Article,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for modifying an existing [`Article`].
///
/// Only the provided fields are modified; every modification passes the
/// field's declared validator before anything is persisted.
#[derive(Clone, Debug)]
pub struct ModifyArticle {
    /// [`Article`] to modify.
    pub article: Article,

    /// New title, if changing.
    pub title: Option<String>,

    /// New body text, if changing.
    pub text: Option<String>,

    /// New tags, if changing.
    pub tags: Option<Vec<String>>,
}

impl<Db> Command<ModifyArticle> for Service<Db>
where
    Db: Database<Update<Article>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Article;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: ModifyArticle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ModifyArticle {
            mut article,
            title,
            text,
            tags,
        } = cmd;

        if let Some(title) = title {
            article.set_title(title).map_err(tracerr::from_and_wrap!(=> E))?;
        }
        if let Some(text) = text {
            article.set_text(text).map_err(tracerr::from_and_wrap!(=> E))?;
        }
        if let Some(tags) = tags {
            article.set_tags(tags).map_err(tracerr::from_and_wrap!(=> E))?;
        }

        self.database()
            .execute(Update(article.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(article)
    }
}

/// Error of [`ModifyArticle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Provided modification failed its validation.
    #[display("`Article` validation failed: {_0}")]
    Validation(validate::Error),
}
