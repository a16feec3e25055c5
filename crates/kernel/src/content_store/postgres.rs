//! PostgreSQL content store.
//!
//! Thin pass-through to the model query functions.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::ContentStore;
use crate::db;
use crate::models::{Container, Page, PageDraft, PageQuery, PageRevision, User};

/// Content store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    /// Create a new store over a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn find_container(&self, id: Uuid) -> Result<Option<Container>> {
        Container::find_by_id(&self.pool, id).await
    }

    async fn find_pages(&self, query: &PageQuery) -> Result<Vec<Page>> {
        Page::find(&self.pool, query).await
    }

    async fn find_page(&self, id: Uuid) -> Result<Option<Page>> {
        Page::find_by_id(&self.pool, id).await
    }

    async fn find_revision(&self, id: Uuid) -> Result<Option<PageRevision>> {
        PageRevision::find_by_id(&self.pool, id).await
    }

    async fn save_page(&self, draft: &PageDraft) -> Result<Page> {
        Page::save(&self.pool, draft).await
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>> {
        User::find_by_name(&self.pool, name).await
    }

    async fn find_users_by_mail(&self, mail: &str) -> Result<Vec<User>> {
        User::list_by_mail(&self.pool, mail).await
    }

    async fn touch_login(&self, user_id: Uuid) -> Result<()> {
        User::touch_login(&self.pool, user_id).await
    }

    async fn ping(&self) -> bool {
        db::check_health(&self.pool).await
    }
}
