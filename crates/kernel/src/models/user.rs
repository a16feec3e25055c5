//! User model and lookups used by the login flow.

use anyhow::{Context, Result};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Status value of an active account.
pub const STATUS_ACTIVE: i16 = 1;

/// User record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Argon2 PHC string. `None` when the account never had a password set
    /// (for example, accounts created through an external provider).
    #[serde(skip_serializing)]
    pub pass: Option<String>,
    pub mail: String,
    pub status: i16,
    pub language: Option<String>,
    pub created: DateTime<Utc>,
    pub login: Option<DateTime<Utc>>,
}

impl User {
    /// Check if this user is active.
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }

    /// Whether the account has a stored credential hash at all.
    pub fn has_password_hash(&self) -> bool {
        self.pass.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Verify a password against the stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        let Some(pass) = self.pass.as_deref().filter(|p| !p.is_empty()) else {
            return false;
        };

        let Ok(parsed_hash) = PasswordHash::new(pass) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Find a user by username.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
            .context("failed to fetch user by name")?;

        Ok(user)
    }

    /// List users registered with an email address, oldest account first.
    ///
    /// Email is not unique, so several accounts may share one address.
    pub async fn list_by_mail(pool: &PgPool, mail: &str) -> Result<Vec<Self>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE lower(mail) = lower($1) ORDER BY created, id",
        )
        .bind(mail)
        .fetch_all(pool)
        .await
        .context("failed to fetch users by mail")?;

        Ok(users)
    }

    /// Update the user's last login time.
    pub async fn touch_login(pool: &PgPool, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET login = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to update login time")?;

        Ok(())
    }
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String> {
    use argon2::PasswordHasher;
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
