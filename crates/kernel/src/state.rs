//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::auth::{Authenticator, PasswordAuthenticator};
use crate::config::Config;
use crate::content_store::{ContentStore, PgContentStore};
use crate::db;
use crate::tap::TapRegistry;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap. Nothing in it changes after
/// startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Users, containers, pages and revisions.
    store: Arc<dyn ContentStore>,

    /// Credential check used by the login action.
    authenticator: Arc<dyn Authenticator>,

    /// Alter taps, registered before the router starts.
    taps: TapRegistry,

    /// Public site URL.
    site_url: String,
}

impl AppState {
    /// Connect to PostgreSQL, apply migrations and wire the default
    /// collaborators.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;
        info!("database migrations applied");

        let store: Arc<dyn ContentStore> = Arc::new(PgContentStore::new(pool));
        let authenticator = Arc::new(PasswordAuthenticator::new(store.clone()));

        Ok(Self::from_parts(
            store,
            authenticator,
            TapRegistry::new(),
            config.site_url.clone(),
        ))
    }

    /// Assemble state from already-built collaborators.
    pub fn from_parts(
        store: Arc<dyn ContentStore>,
        authenticator: Arc<dyn Authenticator>,
        taps: TapRegistry,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                authenticator,
                taps,
                site_url: site_url.into(),
            }),
        }
    }

    pub fn store(&self) -> &dyn ContentStore {
        self.inner.store.as_ref()
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.inner.authenticator.as_ref()
    }

    pub fn taps(&self) -> &TapRegistry {
        &self.inner.taps
    }

    pub fn site_url(&self) -> &str {
        &self.inner.site_url
    }

    /// Check if the content store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.inner.store.ping().await
    }
}
