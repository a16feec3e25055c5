//! The login action.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, Session};
use tracing::{error, info, warn};
use url::Url;
use uuid::Uuid;

use super::AuthFailure;
use crate::models::User;
use crate::session::REMEMBER_ME_SESSION_EXPIRY_DAYS;
use crate::state::AppState;
use crate::tap::TAP_LOGIN_FORWARD;

/// Session key for storing the authenticated user ID.
pub const SESSION_USER_ID: &str = "user_id";

/// Session key for the URL a guest was bounced from to the login page.
pub const SESSION_LAST_FORWARD_FROM: &str = "last_forward_from";

/// Session key holding the username of an account that has no password hash.
pub const SESSION_HASH_MISSING: &str = "forgotpassword:hash_missing";

/// Where accounts without a password hash are sent.
pub const PASSWORD_RESET_PATH: &str = "/user/password-reset";

const LOGGED_IN_MESSAGE: &str = "You have been logged in.";

/// Where the forward URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardSource {
    LastForwardFrom,
    ReturnToReferer,
}

/// Login request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Keep the session alive for 30 days.
    #[serde(default)]
    pub persistent: bool,
    /// Return to the page the login form was submitted from.
    #[serde(default)]
    pub return_to_referer: bool,
    /// The request's `Referer` header, filled in by the handler.
    #[serde(skip)]
    pub referer: Option<String>,
}

/// Result of a successful login action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub forward: String,
    pub message: String,
    /// The logged-in user; `None` when sent to the password reset flow.
    #[serde(skip)]
    pub user_id: Option<Uuid>,
}

/// Typed login error for explicit status code mapping.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Username and password are required.")]
    EmptyCredentials,

    /// The authenticator's failure message.
    #[error("{0}")]
    Failed(String),

    #[error("Unable to load your user account.")]
    UnknownUser,

    /// The account may not log in (for example, it is disabled).
    #[error("{0}")]
    Refused(String),

    #[error("Internal server error")]
    Internal,
}

impl LoginError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LoginError::EmptyCredentials => StatusCode::BAD_REQUEST,
            LoginError::Failed(_) | LoginError::UnknownUser => StatusCode::UNAUTHORIZED,
            LoginError::Refused(_) => StatusCode::FORBIDDEN,
            LoginError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn internal(context: &'static str) -> impl FnOnce(tower_sessions::session::Error) -> LoginError {
    move |e| {
        error!(error = %e, "{context}");
        LoginError::Internal
    }
}

/// Reduce a referer to a local path and query.
///
/// Relative referers resolve against `site_url`; absolute ones must share its
/// origin. Anything else yields `None`.
pub fn local_referer(referer: &str, site_url: &str) -> Option<String> {
    let referer = referer.trim();
    if referer.is_empty() {
        return None;
    }

    let base = Url::parse(site_url).ok()?;
    let url = base.join(referer).ok()?;
    if url.origin() != base.origin() {
        return None;
    }

    let mut local = url.path().to_string();
    if let Some(query) = url.query() {
        local.push('?');
        local.push_str(query);
    }
    Some(local)
}

/// Pick the URL to send the user to after logging in.
///
/// The page the user was bounced from wins over the referer; with neither the
/// result is `""` (the front page).
pub async fn forward_target(
    session: &Session,
    request: &LoginRequest,
    site_url: &str,
) -> Result<(String, Option<ForwardSource>), LoginError> {
    let last: Option<String> = session
        .get(SESSION_LAST_FORWARD_FROM)
        .await
        .map_err(internal("failed to read last_forward_from from session"))?;

    if let Some(last) = last.filter(|l| !l.is_empty()) {
        return Ok((last, Some(ForwardSource::LastForwardFrom)));
    }

    if request.return_to_referer
        && let Some(referer) = request.referer.as_deref()
    {
        match local_referer(referer, site_url) {
            Some(local) => return Ok((local, Some(ForwardSource::ReturnToReferer))),
            None => warn!(referer, "ignoring off-site referer"),
        }
    }

    Ok((String::new(), None))
}

/// Perform the login action.
pub async fn do_login(
    state: &AppState,
    session: &Session,
    request: &LoginRequest,
) -> Result<LoginOutcome, LoginError> {
    let (forward, source) = forward_target(session, request, state.site_url()).await?;

    let input_username = request.username.trim();
    if input_username.is_empty() || request.password.is_empty() {
        return Err(LoginError::EmptyCredentials);
    }

    let username = resolve_username(state, input_username).await?;

    if let Err(failure) = state
        .authenticator()
        .authenticate(&username, &request.password)
        .await
    {
        return handle_auth_failure(state, session, &username, input_username, failure).await;
    }

    let user = match state.store().find_user_by_name(&username).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(LoginError::UnknownUser),
        Err(e) => {
            error!(error = %e, "failed to load user after authentication");
            return Err(LoginError::Internal);
        }
    };

    establish_session(state, session, &user, request.persistent).await?;

    session
        .remove::<String>(SESSION_LAST_FORWARD_FROM)
        .await
        .map_err(internal("failed to clear last_forward_from"))?;

    let params = json!({
        "user": { "id": user.id, "name": user.name },
        "source": source,
    });
    let forward = match state
        .taps()
        .alter(TAP_LOGIN_FORWARD, &params, Value::String(forward.clone()))
    {
        Value::String(altered) => altered,
        other => {
            warn!(value = %other, "login:forward tap returned a non-string; ignoring");
            forward
        }
    };

    info!(user_id = %user.id, "user logged in");
    Ok(LoginOutcome {
        forward,
        message: LOGGED_IN_MESSAGE.to_string(),
        user_id: Some(user.id),
    })
}

/// Map an email address to the username of the first account using it.
async fn resolve_username(state: &AppState, input: &str) -> Result<String, LoginError> {
    if !input.contains('@') {
        return Ok(input.to_string());
    }

    match state.store().find_users_by_mail(input).await {
        Ok(users) => Ok(users
            .into_iter()
            .next()
            .map(|u| u.name)
            .unwrap_or_else(|| input.to_string())),
        Err(e) => {
            error!(error = %e, "failed to look up user by email");
            Err(LoginError::Internal)
        }
    }
}

/// Accounts without a stored hash go to the password reset flow instead of
/// seeing an error.
async fn handle_auth_failure(
    state: &AppState,
    session: &Session,
    username: &str,
    input_username: &str,
    failure: AuthFailure,
) -> Result<LoginOutcome, LoginError> {
    let failure = match failure {
        AuthFailure::Backend(e) => {
            error!(error = %e, "authenticator failed");
            return Err(LoginError::Internal);
        }
        failure => failure,
    };

    let user = match state.store().find_user_by_name(username).await {
        Ok(user) => user,
        Err(e) => {
            error!(error = %e, "failed to load user after failed login");
            return Err(LoginError::Internal);
        }
    };

    if let Some(user) = user.filter(|u| !u.has_password_hash()) {
        session
            .insert(SESSION_HASH_MISSING, input_username)
            .await
            .map_err(internal("failed to store hash_missing in session"))?;

        info!(user_id = %user.id, "account has no password; sending to reset");
        return Ok(LoginOutcome {
            forward: PASSWORD_RESET_PATH.to_string(),
            message: String::new(),
            user_id: None,
        });
    }

    match failure {
        AuthFailure::Refused(reason) => Err(LoginError::Refused(reason)),
        failure => Err(LoginError::Failed(failure.to_string())),
    }
}

/// Initialize session state for an authenticated user.
async fn establish_session(
    state: &AppState,
    session: &Session,
    user: &User,
    persistent: bool,
) -> Result<(), LoginError> {
    if !user.is_active() {
        info!(user_id = %user.id, "login refused for disabled account");
        return Err(LoginError::Refused(
            "This account has been disabled.".to_string(),
        ));
    }

    session
        .cycle_id()
        .await
        .map_err(internal("failed to cycle session id"))?;

    session
        .insert(SESSION_USER_ID, user.id)
        .await
        .map_err(internal("failed to insert user_id into session"))?;

    if persistent {
        session.set_expiry(Some(Expiry::OnInactivity(Duration::days(
            REMEMBER_ME_SESSION_EXPIRY_DAYS,
        ))));
    }

    if let Err(e) = state.store().touch_login(user.id).await {
        warn!(error = %e, user_id = %user.id, "failed to update login timestamp");
    }

    Ok(())
}
