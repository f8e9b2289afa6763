//! Router attached to the `/articles` URI.

use axum::{
    extract::{Path, Query},
    routing::get,
    Json, Router,
};
use common::{
    operations::{By, Delete},
    pagination,
    validate::{self, Constraint},
    DateTime,
};
use serde::{Deserialize, Serialize};
use service::{
    auth::filter,
    command::{self, Command as _, DatabaseCommand},
    domain::{article, user, Article},
    query::{self, Query as _},
    read,
};

use crate::{define_error, error::AsError, Context, Error};

use super::Pagination;

/// Builds the [`Router`] of the `/articles` endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:article", get(view).post(modify).delete(remove))
}

define_error! {
    enum ArticleError {
        #[code = "notFound"]
        #[status = NOT_FOUND]
        #[message = "Article not found"]
        NotFound,
    }
}

/// Query parameters of the articles list endpoint.
#[derive(Debug, Deserialize)]
struct ListQuery {
    /// Zero-based page number.
    page: Option<usize>,

    /// Page size.
    size: Option<usize>,

    /// ID of the authoring user to narrow to.
    author: Option<String>,

    /// Lower publication date bound, in RFC 3339 form.
    from: Option<String>,

    /// Upper publication date bound, in RFC 3339 form.
    to: Option<String>,

    /// Title term to search for.
    title: Option<String>,

    /// Tag term to search for.
    tag: Option<String>,
}

/// Body of the article creation endpoint.
#[derive(Debug, Deserialize)]
struct CreateBody {
    /// Article title.
    title: String,

    /// Article text.
    text: String,

    /// Article tags.
    #[serde(default)]
    tags: Vec<String>,
}

/// Body of the article modification endpoint.
#[derive(Debug, Default, Deserialize)]
struct ModifyBody {
    /// New article title.
    title: Option<String>,

    /// New article text.
    text: Option<String>,

    /// New article tags.
    tags: Option<Vec<String>>,
}

/// Identifying view of a freshly created article.
#[derive(Clone, Debug, Serialize)]
struct IdView {
    /// Article ID.
    id: String,
}

/// View of an article.
#[derive(Clone, Debug, Serialize)]
struct ArticleView {
    /// Article ID.
    id: String,

    /// Article author ID.
    author: String,

    /// Article creation date.
    date: String,

    /// Article title.
    title: String,

    /// Article tags.
    tags: Vec<String>,

    /// Article text.
    text: String,
}

impl ArticleView {
    /// Builds an [`ArticleView`] of the provided [`Article`].
    fn of(article: &Article) -> Self {
        Self {
            id: article.id().map(ToString::to_string).unwrap_or_default(),
            author: article
                .author()
                .id()
                .map(ToString::to_string)
                .unwrap_or_default(),
            date: article.date().to_rfc3339(),
            title: article.title().to_string(),
            tags: article.tags().iter().map(ToString::to_string).collect(),
            text: article.text().to_string(),
        }
    }
}

/// `GET /articles?page=:page&size=:size`
///
/// Returns a paginated articles list, narrowed by the optional criteria.
async fn list(
    ctx: Context,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ArticleView>>, Error> {
    let _ = ctx.current_session().await?;
    let arguments = Pagination {
        page: query.page,
        size: query.size,
    }
    .arguments()?;

    let author = query
        .author
        .map(|raw| {
            validate::field("author", Constraint::Format, raw, user::Id::new)
        })
        .transpose()
        .map_err(AsError::into_error)?;
    let from = parse_date("from", query.from)?;
    let to = parse_date("to", query.to)?;

    let page = ctx
        .service()
        .execute(query::articles::List::by(pagination::Selector {
            arguments,
            filter: read::article::list::Filter {
                author,
                from,
                to,
                title: query.title,
                tag: query.tag,
            },
        }))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(page.items.iter().map(ArticleView::of).collect()))
}

/// `POST /articles`
///
/// Creates a new article authored by the authenticated user.
///
/// Requires the `articles.create` right.
async fn create(
    ctx: Context,
    Json(body): Json<CreateBody>,
) -> Result<Json<IdView>, Error> {
    let session = ctx.current_session().await?;
    filter::require_right(&session, "articles.create")
        .map_err(AsError::into_error)?;

    let author = session
        .user()
        .cloned()
        .ok_or_else(|| filter::Forbidden.into_error())?;

    let article = ctx
        .service()
        .execute(command::CreateArticle {
            author,
            title: body.title,
            text: body.text,
            tags: body.tags,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(IdView {
        id: article.id().map(ToString::to_string).unwrap_or_default(),
    }))
}

/// `GET /articles/:article`
///
/// Returns info about an article.
async fn view(
    ctx: Context,
    Path(article): Path<String>,
) -> Result<Json<ArticleView>, Error> {
    let _ = ctx.current_session().await?;
    let id = parse_id(article)?;

    let article = ctx
        .service()
        .execute(query::article::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(ArticleError::NotFound))?;

    Ok(Json(ArticleView::of(&article)))
}

/// `POST /articles/:article`
///
/// Modifies an article.
///
/// Requires the `articles.modify` right to modify an article authored by
/// another user.
async fn modify(
    ctx: Context,
    Path(article): Path<String>,
    Json(body): Json<ModifyBody>,
) -> Result<(), Error> {
    let session = ctx.current_session().await?;
    let id = parse_id(article)?;

    let article = ctx
        .service()
        .execute(query::article::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(ArticleError::NotFound))?;

    let author = article
        .author()
        .id()
        .cloned()
        .ok_or_else(|| Error::internal(&"persisted author has no ID"))?;
    filter::require_owner_or_right(&session, "articles.modify", &author)
        .map_err(AsError::into_error)?;

    let _ = ctx
        .service()
        .execute(command::ModifyArticle {
            article,
            title: body.title,
            text: body.text,
            tags: body.tags,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(())
}

/// `DELETE /articles/:article`
///
/// Removes an article.
///
/// Requires the `articles.remove` right.
async fn remove(
    ctx: Context,
    Path(article): Path<String>,
) -> Result<(), Error> {
    let session = ctx.current_session().await?;
    let id = parse_id(article)?;

    filter::require_right(&session, "articles.remove")
        .map_err(AsError::into_error)?;

    ctx.service()
        .execute(DatabaseCommand::<Delete<By<Article, article::Id>>>::delete(
            id,
        ))
        .await
        .map_err(AsError::into_error)?;

    Ok(())
}

/// Parses the raw article ID path parameter.
fn parse_id(raw: String) -> Result<article::Id, Error> {
    validate::field("article", Constraint::Format, raw, article::Id::new)
        .map_err(AsError::into_error)
}

/// Parses an optional RFC 3339 date query parameter.
fn parse_date(
    field: &str,
    raw: Option<String>,
) -> Result<Option<DateTime>, Error> {
    raw.map(|raw| {
        validate::field(field, Constraint::Format, raw, |raw: String| {
            DateTime::from_rfc3339(&raw).ok()
        })
    })
    .transpose()
    .map_err(AsError::into_error)
}
