//! Login handoff.
//!
//! Credential checking sits behind [`Authenticator`]; [`login::do_login`]
//! drives the rest of the flow (forward URL, session, `login:forward` tap).

pub mod login;
mod password;

use async_trait::async_trait;
use thiserror::Error;

pub use login::{
    ForwardSource, LoginError, LoginOutcome, LoginRequest, PASSWORD_RESET_PATH,
    SESSION_HASH_MISSING, SESSION_LAST_FORWARD_FROM, SESSION_USER_ID, do_login, local_referer,
};
pub use password::PasswordAuthenticator;

/// Why a set of credentials was not accepted.
#[derive(Debug, Error)]
pub enum AuthFailure {
    /// Unknown user or wrong password. Deliberately indistinguishable.
    #[error("Invalid username or password")]
    BadLogin,

    /// Credentials were understood but refused, with a user-facing reason.
    #[error("{0}")]
    Refused(String),

    #[error("authentication backend failed")]
    Backend(#[from] anyhow::Error),
}

/// Checks a username/password pair.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> Result<(), AuthFailure>;
}
