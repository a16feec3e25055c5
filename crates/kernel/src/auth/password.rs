//! Argon2 password authentication against stored user hashes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{AuthFailure, Authenticator};
use crate::content_store::ContentStore;

/// Authenticates against the `pass` hash of the user record.
pub struct PasswordAuthenticator {
    store: Arc<dyn ContentStore>,
}

impl PasswordAuthenticator {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Authenticator for PasswordAuthenticator {
    async fn authenticate(&self, username: &str, password: &str) -> Result<(), AuthFailure> {
        let Some(user) = self.store.find_user_by_name(username).await? else {
            debug!(username, "login attempt for unknown user");
            return Err(AuthFailure::BadLogin);
        };

        if !user.verify_password(password) {
            debug!(user_id = %user.id, "password mismatch");
            return Err(AuthFailure::BadLogin);
        }

        Ok(())
    }
}
