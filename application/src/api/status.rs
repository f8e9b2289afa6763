//! Router attached to the `/status` URI.

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// Builds the [`Router`] of the `/status` endpoint.
pub fn router() -> Router {
    Router::new().route("/status", get(status))
}

/// Status of this node.
#[derive(Clone, Debug, Serialize)]
struct Status {
    /// Version number of this node.
    version: &'static str,
}

/// `GET /status`
///
/// Returns this node's status.
#[expect(clippy::unused_async, reason = "required by the router signature")]
async fn status() -> Json<Status> {
    Json(Status {
        version: env!("CARGO_PKG_VERSION"),
    })
}
