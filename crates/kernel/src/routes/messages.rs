//! Queued system messages.

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_sessions::Session;
use tracing::error;

use crate::messages::{self, SystemMessage};
use crate::state::AppState;

/// Return and clear the messages queued for this session.
///
/// GET /system/messages
async fn drain_messages(session: Session) -> Result<Json<Vec<SystemMessage>>, StatusCode> {
    messages::drain(&session).await.map(Json).map_err(|e| {
        error!(error = %e, "failed to drain system messages");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Create the messages router.
pub fn router() -> Router<AppState> {
    Router::new().route("/system/messages", get(drain_messages))
}
