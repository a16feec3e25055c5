//! Shared route helpers.

use axum::http::{HeaderMap, Uri, header};
use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;
use tracing::warn;
use uuid::Uuid;

use crate::auth::{SESSION_LAST_FORWARD_FROM, SESSION_USER_ID, local_referer};
use crate::messages::{self, MessageKind};

/// The logged-in user's ID, if any.
pub async fn current_user_id(session: &Session) -> Option<Uuid> {
    session.get(SESSION_USER_ID).await.ok().flatten()
}

/// Require an authenticated user, or redirect to login.
///
/// The requested URL is remembered so the login action can send the user
/// back to it.
pub async fn require_login(session: &Session, uri: &Uri) -> Result<Uuid, Response> {
    if let Some(id) = current_user_id(session).await {
        return Ok(id);
    }

    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    if let Err(e) = session.insert(SESSION_LAST_FORWARD_FROM, &target).await {
        warn!(error = %e, "failed to remember last_forward_from");
    }
    flash(
        session,
        MessageKind::Error,
        "You must be logged in to view that page.",
    )
    .await;

    Err(Redirect::to("/user/login").into_response())
}

/// Whether the request was made by `XMLHttpRequest`.
pub fn is_xhr(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
}

/// The raw `Referer` header.
pub fn referer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// The `Referer` header reduced to a local path, or `fallback`.
pub fn local_referer_or(headers: &HeaderMap, site_url: &str, fallback: &str) -> String {
    referer(headers)
        .and_then(|r| local_referer(&r, site_url))
        .unwrap_or_else(|| fallback.to_string())
}

/// Queue a message; a broken session is logged, not fatal.
pub async fn flash(session: &Session, kind: MessageKind, text: &str) {
    if let Err(e) = messages::push(session, kind, text).await {
        warn!(error = %e, "failed to queue message");
    }
}
