//! HTTP route handlers.

pub mod auth;
pub mod health;
pub mod helpers;
pub mod messages;
pub mod pages;

use axum::Router;

use crate::state::AppState;

/// All kernel routes, without middleware layers.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(pages::router())
        .merge(messages::router())
        .merge(health::router())
}
