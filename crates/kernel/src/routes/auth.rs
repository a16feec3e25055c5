//! Authentication routes (login, logout).

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{error, info};

use super::helpers::{current_user_id, flash, is_xhr, local_referer_or, referer};
use crate::auth::{LoginRequest, PASSWORD_RESET_PATH, SESSION_HASH_MISSING, do_login};
use crate::messages::MessageKind;
use crate::state::AppState;

/// JSON login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub forward: String,
    pub message: String,
    /// The message was queued in the session instead of returned.
    pub messages_deferred: bool,
}

/// Error response for authentication failures.
#[derive(Debug, Serialize)]
pub struct AuthError {
    pub error: String,
}

/// Form-based login request. Checkboxes arrive only when ticked.
#[derive(Debug, Deserialize)]
pub struct LoginFormRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub persistent: Option<String>,
    #[serde(default)]
    pub return_to_referer: Option<String>,
}

impl From<LoginFormRequest> for LoginRequest {
    fn from(form: LoginFormRequest) -> Self {
        Self {
            username: form.username,
            password: form.password,
            persistent: form.persistent.is_some(),
            return_to_referer: form.return_to_referer.is_some(),
            referer: None,
        }
    }
}

/// Login form handler.
///
/// GET /user/login
async fn login_form() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html><head><title>Log in</title></head>
<body>
<h1>Log in</h1>
<form method="post" action="/user/login">
<p><label>Username or email<br><input type="text" name="username" required></label></p>
<p><label>Password<br><input type="password" name="password" required></label></p>
<p><label><input type="checkbox" name="persistent" value="1"> Remember me</label></p>
<p><button type="submit">Log in</button></p>
</form>
</body></html>"#,
    )
}

/// Form-based login handler.
///
/// POST /user/login (form data)
/// - 303 to the forward URL on success (`/` when empty)
/// - On failure the error is queued and the user goes back where they came from
async fn login_form_submit(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<LoginFormRequest>,
) -> Response {
    let mut request = LoginRequest::from(form);
    request.referer = referer(&headers);

    match do_login(&state, &session, &request).await {
        Ok(outcome) => {
            flash(&session, MessageKind::Success, &outcome.message).await;
            let forward = if outcome.forward.is_empty() {
                "/"
            } else {
                outcome.forward.as_str()
            };
            Redirect::to(forward).into_response()
        }
        Err(e) => {
            flash(&session, MessageKind::Error, &e.to_string()).await;
            let back = local_referer_or(&headers, state.site_url(), "/user/login");
            Redirect::to(&back).into_response()
        }
    }
}

/// JSON login handler.
///
/// POST /user/login/json
/// - Maps typed `LoginError` variants to HTTP status codes
/// - XHR callers get the success message queued for the next page
async fn login(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Json(mut request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<AuthError>)> {
    request.referer = referer(&headers);

    match do_login(&state, &session, &request).await {
        Ok(outcome) => {
            let deferred = is_xhr(&headers) && !outcome.message.is_empty();
            let message = if deferred {
                flash(&session, MessageKind::Success, &outcome.message).await;
                String::new()
            } else {
                outcome.message
            };

            Ok(Json(LoginResponse {
                forward: outcome.forward,
                message,
                messages_deferred: deferred,
            }))
        }
        Err(e) => Err((
            e.status_code(),
            Json(AuthError {
                error: e.to_string(),
            }),
        )),
    }
}

/// Logout response.
#[derive(Debug, Serialize)]
struct LogoutResponse {
    message: &'static str,
}

/// Logout handler.
///
/// GET /user/logout
async fn logout(
    session: Session,
) -> Result<Json<LogoutResponse>, (StatusCode, Json<AuthError>)> {
    let user_id = current_user_id(&session).await;

    session.delete().await.map_err(|e| {
        error!(error = %e, "failed to delete session");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(AuthError {
                error: "Internal server error".to_string(),
            }),
        )
    })?;

    if let Some(user_id) = user_id {
        info!(%user_id, "user logged out");
    }

    Ok(Json(LogoutResponse {
        message: "You have been logged out.",
    }))
}

/// Landing page for accounts sent to the reset flow.
#[derive(Debug, Serialize)]
struct PasswordResetResponse {
    /// The name typed at login, when the login action sent the user here.
    username: Option<String>,
    message: &'static str,
}

/// Password reset landing.
///
/// GET /user/password-reset
///
/// Sending the reset link itself is left to the mail layer; this only picks
/// up the username stashed by the login action.
async fn password_reset(session: Session) -> Json<PasswordResetResponse> {
    let username = session
        .get::<String>(SESSION_HASH_MISSING)
        .await
        .ok()
        .flatten();

    Json(PasswordResetResponse {
        username,
        message: "Your account has no password yet. Request a reset link to set one.",
    })
}

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/login", get(login_form).post(login_form_submit))
        .route("/user/login/json", post(login))
        .route("/user/logout", get(logout))
        .route(PASSWORD_RESET_PATH, get(password_reset))
}
