//! Content store abstraction layer.
//!
//! Every read and write of users, containers, pages and revisions made by the
//! login flow and the pages library goes through [`ContentStore`]. The
//! production implementation is [`PgContentStore`]; tests swap in an
//! in-memory store without touching any call site.

mod postgres;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

pub use postgres::PgContentStore;

use crate::models::{Container, Page, PageDraft, PageQuery, PageRevision, User};

/// Entity store used by the kernel.
///
/// Result ordering of [`ContentStore::find_pages`] is store-defined; callers
/// must not rely on it beyond "stable for one call".
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Resolve a container (user or group) by ID.
    async fn find_container(&self, id: Uuid) -> Result<Option<Container>>;

    /// Find content nodes matching a query. Unbounded.
    async fn find_pages(&self, query: &PageQuery) -> Result<Vec<Page>>;

    /// Load a single content node of any kind.
    async fn find_page(&self, id: Uuid) -> Result<Option<Page>>;

    /// Load a stored revision.
    async fn find_revision(&self, id: Uuid) -> Result<Option<PageRevision>>;

    /// Create or update a page, recording a revision of its description.
    async fn save_page(&self, draft: &PageDraft) -> Result<Page>;

    /// Find a user by exact username.
    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>>;

    /// Find all users registered with an email address.
    async fn find_users_by_mail(&self, mail: &str) -> Result<Vec<User>>;

    /// Record a successful login.
    async fn touch_login(&self, user_id: Uuid) -> Result<()>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> bool;
}
