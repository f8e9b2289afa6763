//! Router attached to the `/sessions` URI.

use std::convert::Infallible;

use axum::{
    extract::{Path, Query},
    routing::get,
    Json, Router,
};
use common::validate::{self, Constraint};
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    auth::{filter, Token},
    command::{self, Command as _},
    domain::user,
};

use crate::{define_error, error::AsError, Context, Error};

use super::Pagination;

/// Builds the [`Router`] of the `/sessions` endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:token", get(view).delete(remove))
}

define_error! {
    enum SessionError {
        #[code = "notFound"]
        #[status = NOT_FOUND]
        #[message = "Unknown session"]
        NotFound,
    }
}

/// Body of the session creation endpoint.
#[derive(Debug, Deserialize)]
struct CreateBody {
    /// User email.
    email: String,

    /// User clear password.
    password: String,
}

/// View of a session exposing its token only.
#[derive(Clone, Debug, Serialize)]
struct TokenView {
    /// Session token.
    token: String,
}

/// Full view of a session.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView {
    /// Session token.
    token: String,

    /// Session creation date.
    creation_date: String,

    /// Session last access date.
    last_access_date: String,

    /// Session rights.
    rights: Vec<String>,

    /// Session extra data.
    data: DataView,
}

/// View of a session's data payload.
#[derive(Clone, Debug, Serialize)]
struct DataView {
    /// ID of the authenticated user, if any.
    user: Option<String>,
}

/// `GET /sessions?page=:page&size=:size`
///
/// Returns a paginated active sessions list.
///
/// Requires the `sessions.list` right.
async fn list(
    ctx: Context,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<TokenView>>, Error> {
    let session = ctx.current_session().await?;
    filter::require_right(&session, "sessions.list")
        .map_err(AsError::into_error)?;
    let arguments = pagination.arguments()?;

    let page = ctx.service().sessions().paginated_list(arguments);
    Ok(Json(
        page.items
            .into_iter()
            .map(|s| TokenView {
                token: s.token().to_string(),
            })
            .collect(),
    ))
}

/// `POST /sessions`
///
/// Creates a new session (user authentication). A request already carrying
/// a live session token gets that session's token back instead of a fresh
/// one.
async fn create(
    ctx: Context,
    Json(body): Json<CreateBody>,
) -> Result<Json<TokenView>, Error> {
    if let Ok(Some(session)) = ctx.try_current_session().await {
        return Ok(Json(TokenView {
            token: session.token().to_string(),
        }));
    }

    let email =
        validate::field("email", Constraint::Format, body.email, user::Email::new)
            .map_err(AsError::into_error)?;
    let password = validate::field(
        "password",
        Constraint::Format,
        body.password,
        user::Password::new,
    )
    .map_err(AsError::into_error)?;

    let session = ctx
        .service()
        .execute(command::CreateUserSession {
            email,
            password: SecretBox::new(Box::new(password)),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(TokenView {
        token: session.token().to_string(),
    }))
}

/// `GET /sessions/:token`
///
/// Returns info about a session.
///
/// Requires the `sessions.view` right to view info about a session not
/// owned.
async fn view(
    ctx: Context,
    Path(token): Path<String>,
) -> Result<Json<SessionView>, Error> {
    let session = ctx.current_session().await?;
    let token = parse_token(token)?;

    filter::require_token_or_right(&session, "sessions.view", &token)
        .map_err(AsError::into_error)?;

    let target = ctx
        .service()
        .sessions()
        .get(&token)
        .map_err(|_| Error::from(SessionError::NotFound))?;

    Ok(Json(SessionView {
        token: target.token().to_string(),
        creation_date: target.creation_date().to_rfc3339(),
        last_access_date: target.last_access_date().to_rfc3339(),
        rights: target.rights().tokens(),
        data: DataView {
            user: target
                .user()
                .and_then(user::User::id)
                .map(ToString::to_string),
        },
    }))
}

/// `DELETE /sessions/:token`
///
/// Removes a session.
///
/// Requires the `sessions.remove` right to remove a session not owned.
async fn remove(ctx: Context, Path(token): Path<String>) -> Result<(), Error> {
    let session = ctx.current_session().await?;
    let token = parse_token(token)?;

    filter::require_token_or_right(&session, "sessions.remove", &token)
        .map_err(AsError::into_error)?;

    let _ = ctx
        .service()
        .execute(command::RemoveUserSession { token })
        .await
        .map_err(|never: Infallible| -> Error { match never {} })?;

    Ok(())
}

/// Parses the raw token path parameter.
fn parse_token(raw: String) -> Result<Token, Error> {
    validate::field("token", Constraint::Format, raw, Token::new)
        .map_err(AsError::into_error)
}
