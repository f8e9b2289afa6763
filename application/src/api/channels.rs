//! Router attached to the `/channels` URI.

use axum::{
    extract::{Path, Query},
    routing::get,
    Json, Router,
};
use common::{
    pagination,
    validate::{self, Constraint},
    DateTime,
};
use serde::{Deserialize, Serialize};
use service::{
    auth::filter,
    command::{self, Command as _},
    domain::{channel, user, Channel, ChannelMessage},
    query::{self, Query as _},
    read,
};

use crate::{define_error, error::AsError, Context, Error};

use super::Pagination;

/// Builds the [`Router`] of the `/channels` endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:channel", get(view).post(modify).delete(remove))
        .route("/:channel/messages", get(list_messages).post(create_message))
}

define_error! {
    enum ChannelError {
        #[code = "notFound"]
        #[status = NOT_FOUND]
        #[message = "Channel not found"]
        NotFound,
    }
}

/// Query parameters of the channels list endpoint.
#[derive(Debug, Deserialize)]
struct ListQuery {
    /// Zero-based page number.
    page: Option<usize>,

    /// Page size.
    size: Option<usize>,

    /// ID of the owning user to narrow to.
    owner: Option<String>,

    /// Lower creation date bound, in RFC 3339 form.
    from: Option<String>,

    /// Upper creation date bound, in RFC 3339 form.
    to: Option<String>,

    /// Title term to search for.
    title: Option<String>,

    /// Tag term to search for.
    tag: Option<String>,
}

/// Body of the channel creation endpoint.
#[derive(Debug, Deserialize)]
struct CreateBody {
    /// Channel title.
    title: String,

    /// Channel summary.
    summary: String,

    /// Channel tags.
    #[serde(default)]
    tags: Vec<String>,
}

/// Body of the channel modification endpoint.
#[derive(Debug, Default, Deserialize)]
struct ModifyBody {
    /// New channel title.
    title: Option<String>,

    /// New channel summary.
    summary: Option<String>,

    /// New channel tags.
    tags: Option<Vec<String>>,

    /// New channel member IDs.
    members: Option<Vec<String>>,
}

/// Body of the message creation endpoint.
#[derive(Debug, Deserialize)]
struct CreateMessageBody {
    /// Message text.
    text: String,
}

/// Identifying view of a freshly created resource.
#[derive(Clone, Debug, Serialize)]
struct IdView {
    /// Resource ID.
    id: String,
}

/// Short view of a channel, as listed.
#[derive(Clone, Debug, Serialize)]
struct ListedView {
    /// Channel ID.
    id: String,

    /// Channel owner ID.
    owner: String,

    /// Channel creation date.
    date: String,

    /// Channel title.
    title: String,

    /// Channel tags.
    tags: Vec<String>,
}

/// Full view of a channel.
#[derive(Clone, Debug, Serialize)]
struct ChannelView {
    /// Channel ID.
    id: String,

    /// Channel owner ID.
    owner: String,

    /// Channel creation date.
    date: String,

    /// Channel title.
    title: String,

    /// Channel summary.
    summary: String,

    /// Channel tags.
    tags: Vec<String>,

    /// Channel member IDs.
    members: Vec<String>,
}

/// View of a channel message.
#[derive(Clone, Debug, Serialize)]
struct MessageView {
    /// Message ID.
    id: String,

    /// Message author ID.
    author: String,

    /// Message creation date.
    date: String,

    /// Message text.
    text: String,
}

impl MessageView {
    /// Builds a [`MessageView`] of the provided [`ChannelMessage`].
    fn of(message: &ChannelMessage) -> Self {
        Self {
            id: message.id().map(ToString::to_string).unwrap_or_default(),
            author: message
                .author()
                .id()
                .map(ToString::to_string)
                .unwrap_or_default(),
            date: message.date().to_rfc3339(),
            text: message.text().to_string(),
        }
    }
}

/// `GET /channels?page=:page&size=:size`
///
/// Returns a paginated channels list, narrowed by the optional criteria.
///
/// Without the `channels.list` right, only the channels the authenticated
/// user owns or is a member of are listed.
async fn list(
    ctx: Context,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ListedView>>, Error> {
    let session = ctx.current_session().await?;
    let arguments = Pagination {
        page: query.page,
        size: query.size,
    }
    .arguments()?;

    let member = if session.rights().has("channels.list") {
        None
    } else {
        Some(
            session
                .user()
                .and_then(|u| u.id().cloned())
                .ok_or_else(|| filter::Forbidden.into_error())?,
        )
    };

    let owner = query
        .owner
        .map(|raw| {
            validate::field("owner", Constraint::Format, raw, user::Id::new)
        })
        .transpose()
        .map_err(AsError::into_error)?;
    let from = parse_date("from", query.from)?;
    let to = parse_date("to", query.to)?;

    let page = ctx
        .service()
        .execute(query::channels::List::by(pagination::Selector {
            arguments,
            filter: read::channel::list::Filter {
                owner,
                member,
                from,
                to,
                title: query.title,
                tag: query.tag,
            },
        }))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(
        page.items
            .iter()
            .map(|channel| ListedView {
                id: channel.id().map(ToString::to_string).unwrap_or_default(),
                owner: channel
                    .owner()
                    .id()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                date: channel.date().to_rfc3339(),
                title: channel.title().to_string(),
                tags: channel.tags().iter().map(ToString::to_string).collect(),
            })
            .collect(),
    ))
}

/// `POST /channels`
///
/// Creates a new channel owned by the authenticated user.
///
/// Requires the `channels.create` right.
async fn create(
    ctx: Context,
    Json(body): Json<CreateBody>,
) -> Result<Json<IdView>, Error> {
    let session = ctx.current_session().await?;
    filter::require_right(&session, "channels.create")
        .map_err(AsError::into_error)?;

    let owner = session
        .user()
        .cloned()
        .ok_or_else(|| filter::Forbidden.into_error())?;

    let channel = ctx
        .service()
        .execute(command::CreateChannel {
            owner,
            title: body.title,
            summary: body.summary,
            tags: body.tags,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(IdView {
        id: channel.id().map(ToString::to_string).unwrap_or_default(),
    }))
}

/// `GET /channels/:channel`
///
/// Returns info about a channel.
///
/// Requires the `channels.view` right to view a channel without the member
/// restriction.
async fn view(
    ctx: Context,
    Path(channel): Path<String>,
) -> Result<Json<ChannelView>, Error> {
    let session = ctx.current_session().await?;
    let channel = fetch(&ctx, channel).await?;

    filter::require_member_or_right(&session, "channels.view", &channel)
        .map_err(AsError::into_error)?;

    Ok(Json(ChannelView {
        id: channel.id().map(ToString::to_string).unwrap_or_default(),
        owner: channel
            .owner()
            .id()
            .map(ToString::to_string)
            .unwrap_or_default(),
        date: channel.date().to_rfc3339(),
        title: channel.title().to_string(),
        summary: channel.summary().to_string(),
        tags: channel.tags().iter().map(ToString::to_string).collect(),
        members: {
            let mut members = channel
                .members()
                .iter()
                .map(|(id, _)| id.to_string())
                .collect::<Vec<_>>();
            members.sort_unstable();
            members
        },
    }))
}

/// `POST /channels/:channel`
///
/// Modifies a channel.
///
/// Requires the `channels.modify` right to modify a channel owned by
/// another user.
async fn modify(
    ctx: Context,
    Path(channel): Path<String>,
    Json(body): Json<ModifyBody>,
) -> Result<(), Error> {
    let session = ctx.current_session().await?;
    let channel = fetch(&ctx, channel).await?;

    let owner = channel
        .owner()
        .id()
        .cloned()
        .ok_or_else(|| Error::internal(&"persisted owner has no ID"))?;
    filter::require_owner_or_right(&session, "channels.modify", &owner)
        .map_err(AsError::into_error)?;

    let members = body
        .members
        .map(|ids| {
            ids.into_iter()
                .map(|raw| {
                    validate::field(
                        "members",
                        Constraint::Format,
                        raw,
                        user::Id::new,
                    )
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()
        .map_err(AsError::into_error)?;

    let _ = ctx
        .service()
        .execute(command::ModifyChannel {
            channel,
            title: body.title,
            summary: body.summary,
            tags: body.tags,
            members,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(())
}

/// `DELETE /channels/:channel`
///
/// Removes a channel along with its messages.
///
/// Requires the `channels.remove` right.
async fn remove(
    ctx: Context,
    Path(channel): Path<String>,
) -> Result<(), Error> {
    let session = ctx.current_session().await?;
    let id = parse_id(channel)?;

    filter::require_right(&session, "channels.remove")
        .map_err(AsError::into_error)?;

    ctx.service()
        .execute(command::RemoveChannel { id })
        .await
        .map_err(AsError::into_error)?;

    Ok(())
}

/// `GET /channels/:channel/messages?page=:page&size=:size`
///
/// Returns a paginated messages list of a channel.
///
/// Requires the `channels.messages.list` right to read messages without
/// the member restriction.
async fn list_messages(
    ctx: Context,
    Path(channel): Path<String>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<MessageView>>, Error> {
    let session = ctx.current_session().await?;
    let arguments = pagination.arguments()?;
    let channel = fetch(&ctx, channel).await?;

    filter::require_member_or_right(
        &session,
        "channels.messages.list",
        &channel,
    )
    .map_err(AsError::into_error)?;

    let id = channel
        .id()
        .cloned()
        .ok_or_else(|| Error::internal(&"persisted channel has no ID"))?;
    let page = ctx
        .service()
        .execute(query::channel_messages::List::by(pagination::Selector {
            arguments,
            filter: read::channel_message::list::Filter { channel: id },
        }))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(page.items.iter().map(MessageView::of).collect()))
}

/// `POST /channels/:channel/messages`
///
/// Posts a new message into a channel, authored by the authenticated user.
///
/// Requires the `channels.messages.create` right to post without the
/// member restriction.
async fn create_message(
    ctx: Context,
    Path(channel): Path<String>,
    Json(body): Json<CreateMessageBody>,
) -> Result<Json<IdView>, Error> {
    let session = ctx.current_session().await?;
    let channel = fetch(&ctx, channel).await?;

    filter::require_member_or_right(
        &session,
        "channels.messages.create",
        &channel,
    )
    .map_err(AsError::into_error)?;

    let author = session
        .user()
        .cloned()
        .ok_or_else(|| filter::Forbidden.into_error())?;

    let message = ctx
        .service()
        .execute(command::CreateChannelMessage {
            channel,
            author,
            text: body.text,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(IdView {
        id: message.id().map(ToString::to_string).unwrap_or_default(),
    }))
}

/// Fetches the [`Channel`] addressed by the raw path parameter.
async fn fetch(ctx: &Context, raw: String) -> Result<Channel, Error> {
    let id = parse_id(raw)?;
    ctx.service()
        .execute(query::channel::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(ChannelError::NotFound))
}

/// Parses the raw channel ID path parameter.
fn parse_id(raw: String) -> Result<channel::Id, Error> {
    validate::field("channel", Constraint::Format, raw, channel::Id::new)
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
