//! Folio test utilities.
//!
//! Helpers for integration testing: an in-memory content store, fixture
//! builders for pages and users, and assertion utilities.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use folio_kernel::auth::{AuthFailure, Authenticator};
use folio_kernel::content_store::ContentStore;
use folio_kernel::models::user::{STATUS_ACTIVE, hash_password};
use folio_kernel::models::{
    AccessLevel, Container, ContainerKind, NodeKind, Page, PageDraft, PageQuery, PageRevision,
    User,
};

/// Create a test page with default values.
pub fn test_page(container_id: Uuid, title: &str) -> TestPage {
    let now = Utc::now().timestamp();
    TestPage {
        page: Page {
            id: Uuid::now_v7(),
            kind: NodeKind::Page,
            container_id,
            parent_id: None,
            owner_id: container_id,
            title: title.to_string(),
            description: String::new(),
            tags: Vec::new(),
            access: AccessLevel::Public,
            write_access: AccessLevel::Private,
            created: now,
            changed: now,
        },
    }
}

/// A page builder for creating test fixtures.
#[derive(Debug, Clone)]
pub struct TestPage {
    pub page: Page,
}

impl TestPage {
    /// Set a custom ID.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.page.id = id;
        self
    }

    /// Place the page under a parent.
    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.page.parent_id = Some(parent_id);
        self
    }

    /// Make this a non-page node of the given kind.
    pub fn with_kind(mut self, kind: &str) -> Self {
        self.page.kind = NodeKind::from(kind.to_string());
        self
    }

    /// Set the body.
    pub fn with_description(mut self, description: &str) -> Self {
        self.page.description = description.to_string();
        self
    }

    /// Set tags.
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.page.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Set read access.
    pub fn with_access(mut self, access: AccessLevel) -> Self {
        self.page.access = access;
        self
    }

    pub fn build(self) -> Page {
        self.page
    }
}

/// Create an active test user with a hashed password.
pub fn test_user(name: &str, password: &str) -> TestUser {
    TestUser {
        id: Uuid::now_v7(),
        name: name.to_string(),
        mail: format!("{name}@example.com"),
        password: Some(password.to_string()),
        status: STATUS_ACTIVE,
    }
}

/// A user builder.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub name: String,
    pub mail: String,
    pub password: Option<String>,
    pub status: i16,
}

impl TestUser {
    /// Set a custom ID.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Set the email address.
    pub fn with_mail(mut self, mail: &str) -> Self {
        self.mail = mail.to_string();
        self
    }

    /// Remove the stored password hash.
    pub fn without_password(mut self) -> Self {
        self.password = None;
        self
    }

    /// Mark the account as disabled.
    pub fn disabled(mut self) -> Self {
        self.status = 0;
        self
    }

    /// Build the user, hashing the password.
    pub fn build(self) -> User {
        User {
            id: self.id,
            name: self.name,
            pass: self
                .password
                .map(|p| hash_password(&p).expect("failed to hash test password")),
            mail: self.mail,
            status: self.status,
            language: None,
            created: Utc::now(),
            login: None,
        }
    }
}

#[derive(Default)]
struct MemoryData {
    containers: HashMap<Uuid, Container>,
    /// Insertion order is the store order.
    pages: Vec<Page>,
    revisions: Vec<PageRevision>,
    users: Vec<User>,
    logins: HashMap<Uuid, usize>,
}

/// In-memory [`ContentStore`].
///
/// Query results come back in insertion order, like the `created` ordering
/// of the PostgreSQL store.
#[derive(Default)]
pub struct MemoryContentStore {
    data: RwLock<MemoryData>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a container and return its ID.
    pub fn add_container(&self, kind: ContainerKind) -> Uuid {
        let id = Uuid::now_v7();
        self.data
            .write()
            .containers
            .insert(id, Container { id, kind });
        id
    }

    /// Store a page as-is, returning it.
    pub fn add_page(&self, page: impl Into<Page>) -> Page {
        let page = page.into();
        self.data.write().pages.push(page.clone());
        page
    }

    /// Store a revision of `page_id`.
    pub fn add_revision(&self, page_id: Uuid, description: &str) -> PageRevision {
        let revision = PageRevision {
            id: Uuid::now_v7(),
            page_id,
            author_id: Uuid::nil(),
            description: description.to_string(),
            created: Utc::now().timestamp(),
        };
        self.data.write().revisions.push(revision.clone());
        revision
    }

    /// Store a user; the user also becomes a container.
    pub fn add_user(&self, user: impl Into<User>) -> User {
        let user = user.into();
        let mut data = self.data.write();
        data.containers.insert(
            user.id,
            Container {
                id: user.id,
                kind: ContainerKind::User,
            },
        );
        data.users.push(user.clone());
        user
    }

    /// Current state of a stored page.
    pub fn page(&self, id: Uuid) -> Option<Page> {
        self.data
            .read()
            .pages
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Revisions recorded for a page, oldest first.
    pub fn revisions_of(&self, page_id: Uuid) -> Vec<PageRevision> {
        self.data
            .read()
            .revisions
            .iter()
            .filter(|r| r.page_id == page_id)
            .cloned()
            .collect()
    }

    /// How many logins were recorded for a user.
    pub fn login_count(&self, user_id: Uuid) -> usize {
        self.data
            .read()
            .logins
            .get(&user_id)
            .copied()
            .unwrap_or(0)
    }
}

impl From<TestPage> for Page {
    fn from(page: TestPage) -> Self {
        page.build()
    }
}

impl From<TestUser> for User {
    fn from(user: TestUser) -> Self {
        user.build()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn find_container(&self, id: Uuid) -> Result<Option<Container>> {
        Ok(self.data.read().containers.get(&id).copied())
    }

    async fn find_pages(&self, query: &PageQuery) -> Result<Vec<Page>> {
        Ok(self
            .data
            .read()
            .pages
            .iter()
            .filter(|p| query.matches(p))
            .cloned()
            .collect())
    }

    async fn find_page(&self, id: Uuid) -> Result<Option<Page>> {
        Ok(self.data.read().pages.iter().find(|p| p.id == id).cloned())
    }

    async fn find_revision(&self, id: Uuid) -> Result<Option<PageRevision>> {
        Ok(self.data.read().revisions.iter().find(|r| r.id == id).cloned())
    }

    async fn save_page(&self, draft: &PageDraft) -> Result<Page> {
        let now = Utc::now().timestamp();
        let mut data = self.data.write();

        let page = match draft.id {
            Some(id) => {
                let Some(page) = data.pages.iter_mut().find(|p| p.id == id) else {
                    bail!("page {id} not found");
                };
                page.container_id = draft.container_id;
                page.parent_id = draft.parent_id;
                page.title = draft.title.clone();
                page.description = draft.description.clone();
                page.tags = draft.tags.clone();
                page.access = draft.access;
                page.write_access = draft.write_access;
                page.changed = now;
                page.clone()
            }
            None => {
                let page = Page {
                    id: Uuid::now_v7(),
                    kind: NodeKind::Page,
                    container_id: draft.container_id,
                    parent_id: draft.parent_id,
                    owner_id: draft.author_id,
                    title: draft.title.clone(),
                    description: draft.description.clone(),
                    tags: draft.tags.clone(),
                    access: draft.access,
                    write_access: draft.write_access,
                    created: now,
                    changed: now,
                };
                data.pages.push(page.clone());
                page
            }
        };

        data.revisions.push(PageRevision {
            id: Uuid::now_v7(),
            page_id: page.id,
            author_id: draft.author_id,
            description: page.description.clone(),
            created: now,
        });

        Ok(page)
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>> {
        Ok(self.data.read().users.iter().find(|u| u.name == name).cloned())
    }

    async fn find_users_by_mail(&self, mail: &str) -> Result<Vec<User>> {
        Ok(self
            .data
            .read()
            .users
            .iter()
            .filter(|u| u.mail.eq_ignore_ascii_case(mail))
            .cloned()
            .collect())
    }

    async fn touch_login(&self, user_id: Uuid) -> Result<()> {
        *self.data.write().logins.entry(user_id).or_default() += 1;
        Ok(())
    }

    async fn ping(&self) -> bool {
        true
    }
}

/// What a [`StubAuthenticator`] answers.
#[derive(Debug, Clone)]
pub enum StubVerdict {
    Accept,
    BadLogin,
    Refused(String),
    Backend(String),
}

/// [`Authenticator`] with a fixed answer that counts how often it is asked.
pub struct StubAuthenticator {
    verdict: StubVerdict,
    calls: AtomicUsize,
}

impl StubAuthenticator {
    pub fn new(verdict: StubVerdict) -> Self {
        Self {
            verdict,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `authenticate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authenticator for StubAuthenticator {
    async fn authenticate(&self, _username: &str, _password: &str) -> Result<(), AuthFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.verdict {
            StubVerdict::Accept => Ok(()),
            StubVerdict::BadLogin => Err(AuthFailure::BadLogin),
            StubVerdict::Refused(reason) => Err(AuthFailure::Refused(reason.clone())),
            StubVerdict::Backend(message) => {
                Err(AuthFailure::Backend(anyhow::anyhow!("{message}")))
            }
        }
    }
}

/// Assertion helpers for JSON content.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a JSON value equals expected.
    pub fn json_eq(actual: &Value, expected: &Value) {
        assert_eq!(
            actual,
            expected,
            "JSON mismatch:\nactual: {}\nexpected: {}",
            serde_json::to_string_pretty(actual).unwrap(),
            serde_json::to_string_pretty(expected).unwrap()
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }
}
