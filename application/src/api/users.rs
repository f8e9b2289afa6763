//! Router attached to the `/users` URI.

use axum::{
    extract::{Path, Query},
    routing::get,
    Json, Router,
};
use common::{
    operations::{By, Delete},
    pagination,
    validate::{self, Constraint},
};
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    auth::filter,
    command::{self, Command as _, DatabaseCommand},
    domain::{user, User},
    query::{self, Query as _},
    read,
};

use crate::{define_error, error::AsError, Context, Error};

use super::Pagination;

/// Builds the [`Router`] of the `/users` endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:user", get(view).post(modify).delete(remove))
}

define_error! {
    enum UserError {
        #[code = "notFound"]
        #[status = NOT_FOUND]
        #[message = "Unknown user"]
        NotFound,
    }
}

/// Query parameters of the users list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    /// Zero-based page number.
    page: Option<usize>,

    /// Page size.
    size: Option<usize>,

    /// First name term to search for.
    first_name: Option<String>,

    /// Last name term to search for.
    last_name: Option<String>,
}

/// Body of the user creation endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBody {
    /// User email.
    email: String,

    /// User clear password.
    password: String,

    /// User first name.
    first_name: String,

    /// User last name.
    last_name: String,

    /// User rights.
    #[serde(default)]
    rights: Vec<String>,
}

/// Body of the user modification endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModifyBody {
    /// New user email.
    email: Option<String>,

    /// New user clear password.
    password: Option<String>,

    /// New user first name.
    first_name: Option<String>,

    /// New user last name.
    last_name: Option<String>,

    /// New user rights.
    rights: Option<Vec<String>>,
}

/// Identifying view of a freshly created user.
#[derive(Clone, Debug, Serialize)]
struct IdView {
    /// User ID.
    id: String,
}

/// Short view of a user, as listed.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListedView {
    /// User ID.
    id: String,

    /// User email.
    email: String,

    /// User first name.
    first_name: String,

    /// User last name.
    last_name: String,
}

/// Full view of a user.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserView {
    /// User ID.
    id: String,

    /// User email.
    email: String,

    /// User first name.
    first_name: String,

    /// User last name.
    last_name: String,

    /// User rights.
    rights: Vec<String>,
}

impl UserView {
    /// Builds a [`UserView`] of the provided [`User`].
    fn of(user: &User) -> Self {
        Self {
            id: user.id().map(ToString::to_string).unwrap_or_default(),
            email: user.email().to_string(),
            first_name: user.first_name().to_string(),
            last_name: user.last_name().to_string(),
            rights: user.rights().tokens(),
        }
    }
}

/// `GET /users?page=:page&size=:size`
///
/// Returns a paginated users list, narrowed by the optional name terms.
///
/// Requires the `users.list` right.
async fn list(
    ctx: Context,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ListedView>>, Error> {
    let session = ctx.current_session().await?;
    filter::require_right(&session, "users.list")
        .map_err(AsError::into_error)?;
    let arguments = Pagination {
        page: query.page,
        size: query.size,
    }
    .arguments()?;

    let page = ctx
        .service()
        .execute(query::users::List::by(pagination::Selector {
            arguments,
            filter: read::user::list::Filter {
                first_name: query.first_name,
                last_name: query.last_name,
            },
        }))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(
        page.items
            .into_iter()
            .map(|user| ListedView {
                id: user.id().map(ToString::to_string).unwrap_or_default(),
                email: user.email().to_string(),
                first_name: user.first_name().to_string(),
                last_name: user.last_name().to_string(),
            })
            .collect(),
    ))
}

/// `POST /users`
///
/// Creates a new user.
///
/// Requires the `users.create` right.
async fn create(
    ctx: Context,
    Json(body): Json<CreateBody>,
) -> Result<Json<IdView>, Error> {
    let session = ctx.current_session().await?;
    filter::require_right(&session, "users.create")
        .map_err(AsError::into_error)?;

    let password = validate::field(
        "password",
        Constraint::Format,
        body.password,
        user::Password::new,
    )
    .map_err(AsError::into_error)?;

    let user = ctx
        .service()
        .execute(command::CreateUser {
            email: body.email,
            password: SecretBox::new(Box::new(password)),
            first_name: body.first_name,
            last_name: body.last_name,
            rights: body.rights,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(IdView {
        id: user.id().map(ToString::to_string).unwrap_or_default(),
    }))
}

/// `GET /users/:user`
///
/// Returns info about a user.
///
/// Requires the `users.view` right to view a user other than the
/// authenticated one.
async fn view(
    ctx: Context,
    Path(user): Path<String>,
) -> Result<Json<UserView>, Error> {
    let session = ctx.current_session().await?;
    let id = parse_id(user)?;

    filter::require_self_or_right(&session, "users.view", &id)
        .map_err(AsError::into_error)?;

    let user = ctx
        .service()
        .execute(query::user::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(UserError::NotFound))?;

    Ok(Json(UserView::of(&user)))
}

/// `POST /users/:user`
///
/// Modifies a user.
///
/// Requires the `users.modify` right to modify a user other than the
/// authenticated one.
async fn modify(
    ctx: Context,
    Path(user): Path<String>,
    Json(body): Json<ModifyBody>,
) -> Result<(), Error> {
    let session = ctx.current_session().await?;
    let id = parse_id(user)?;

    filter::require_self_or_right(&session, "users.modify", &id)
        .map_err(AsError::into_error)?;

    let user = ctx
        .service()
        .execute(query::user::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(UserError::NotFound))?;

    let password = body
        .password
        .map(|raw| {
            validate::field(
                "password",
                Constraint::Format,
                raw,
                user::Password::new,
            )
        })
        .transpose()
        .map_err(AsError::into_error)?
        .map(|p| SecretBox::new(Box::new(p)));

    let _ = ctx
        .service()
        .execute(command::ModifyUser {
            user,
            email: body.email,
            password,
            first_name: body.first_name,
            last_name: body.last_name,
            rights: body.rights,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(())
}

/// `DELETE /users/:user`
///
/// Removes a user.
///
/// Requires the `users.remove` right.
async fn remove(ctx: Context, Path(user): Path<String>) -> Result<(), Error> {
    let session = ctx.current_session().await?;
    let id = parse_id(user)?;

    filter::require_right(&session, "users.remove")
        .map_err(AsError::into_error)?;

    ctx.service()
        .execute(DatabaseCommand::<Delete<By<User, user::Id>>>::delete(id))
        .await
        .map_err(AsError::into_error)?;

    Ok(())
}

/// Parses the raw user ID path parameter.
fn parse_id(raw: String) -> Result<user::Id, Error> {
    validate::field("user", Constraint::Format, raw, user::Id::new)
        .map_err(AsError::into_error)
}
