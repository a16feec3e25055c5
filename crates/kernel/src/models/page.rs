//! Page model: hierarchical content nodes owned by a container.
//!
//! Pages live in the generic `content_node` table. The parent link is an
//! explicit nullable column; a `NULL` parent means the page sits directly
//! under its container.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Content node discriminant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Hierarchical wiki-style page.
    Page,
    /// Any other node stored by another subsystem.
    Other(String),
}

impl NodeKind {
    /// Machine name stored in the `kind` column.
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Page => "page",
            NodeKind::Other(name) => name,
        }
    }
}

impl From<String> for NodeKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "page" => NodeKind::Page,
            _ => NodeKind::Other(value),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of entity that can own pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    User,
    Group,
}

/// A resolved container (user profile or group workspace).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: Uuid,
    pub kind: ContainerKind,
}

/// Read/write access level of a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Use the site's default access level.
    #[default]
    Default,
    Private,
    LoggedIn,
    Public,
}

impl AccessLevel {
    /// Numeric value stored in the database.
    pub fn as_i16(self) -> i16 {
        match self {
            AccessLevel::Default => -1,
            AccessLevel::Private => 0,
            AccessLevel::LoggedIn => 1,
            AccessLevel::Public => 2,
        }
    }

    /// Parse a stored numeric value.
    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            -1 => Some(AccessLevel::Default),
            0 => Some(AccessLevel::Private),
            1 => Some(AccessLevel::LoggedIn),
            2 => Some(AccessLevel::Public),
            _ => None,
        }
    }
}

impl FromStr for AccessLevel {
    type Err = String;

    /// Accepts both the numeric form values and the snake_case names.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<i16>() {
            return AccessLevel::from_i16(n).ok_or_else(|| format!("unknown access level {n}"));
        }
        match s {
            "default" => Ok(AccessLevel::Default),
            "private" => Ok(AccessLevel::Private),
            "logged_in" => Ok(AccessLevel::LoggedIn),
            "public" => Ok(AccessLevel::Public),
            other => Err(format!("unknown access level '{other}'")),
        }
    }
}

/// A page (content node).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Node discriminant; always [`NodeKind::Page`] for pages proper.
    pub kind: NodeKind,

    /// Owning container (user or group).
    pub container_id: Uuid,

    /// Parent page, `None` for top-level pages.
    pub parent_id: Option<Uuid>,

    /// User who created the page.
    pub owner_id: Uuid,

    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub access: AccessLevel,
    pub write_access: AccessLevel,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last changed.
    pub changed: i64,
}

impl Page {
    /// Whether this node is a page proper.
    pub fn is_page(&self) -> bool {
        self.kind == NodeKind::Page
    }

    /// Title shown in navigation and breadcrumbs.
    pub fn display_name(&self) -> &str {
        &self.title
    }

    /// Canonical URL of the page.
    pub fn url(&self) -> String {
        page_url(self.id)
    }
}

/// Canonical URL for a page ID.
pub fn page_url(id: Uuid) -> String {
    format!("/pages/view/{id}")
}

/// Stored snapshot of a page body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PageRevision {
    pub id: Uuid,

    /// Page this revision belongs to.
    #[sqlx(rename = "node_id")]
    pub page_id: Uuid,

    pub author_id: Uuid,

    /// Description (body) at this revision.
    pub description: String,

    /// Unix timestamp when this revision was created.
    pub created: i64,
}

/// Input for creating or updating a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageDraft {
    /// `None` creates a new page.
    pub id: Option<Uuid>,
    pub container_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author_id: Uuid,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub access: AccessLevel,
    pub write_access: AccessLevel,
}

/// Parent constraint for page queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentFilter {
    /// Any parent.
    Any,
    /// Top-level nodes only (`parent_id IS NULL`).
    Root,
    /// Direct children of the given node.
    Of(Uuid),
}

/// Query over content nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub kind: NodeKind,
    pub container_id: Option<Uuid>,
    pub parent: ParentFilter,
}

impl PageQuery {
    /// Pages directly under a container.
    pub fn top_level(container_id: Uuid) -> Self {
        Self {
            kind: NodeKind::Page,
            container_id: Some(container_id),
            parent: ParentFilter::Root,
        }
    }

    /// Direct children of a page, regardless of container.
    pub fn children_of(parent_id: Uuid) -> Self {
        Self {
            kind: NodeKind::Page,
            container_id: None,
            parent: ParentFilter::Of(parent_id),
        }
    }

    /// Whether a page satisfies this query.
    pub fn matches(&self, page: &Page) -> bool {
        if page.kind != self.kind {
            return false;
        }
        if self.container_id.is_some_and(|c| c != page.container_id) {
            return false;
        }
        match self.parent {
            ParentFilter::Any => true,
            ParentFilter::Root => page.parent_id.is_none(),
            ParentFilter::Of(parent) => page.parent_id == Some(parent),
        }
    }
}

/// Raw `content_node` row.
#[derive(Debug, sqlx::FromRow)]
struct PageRow {
    id: Uuid,
    kind: String,
    container_id: Uuid,
    parent_id: Option<Uuid>,
    owner_id: Uuid,
    title: String,
    description: String,
    tags: Vec<String>,
    access: i16,
    write_access: i16,
    created: i64,
    changed: i64,
}

impl TryFrom<PageRow> for Page {
    type Error = anyhow::Error;

    fn try_from(row: PageRow) -> Result<Self> {
        let Some(access) = AccessLevel::from_i16(row.access) else {
            bail!("content node {} has invalid access {}", row.id, row.access);
        };
        let Some(write_access) = AccessLevel::from_i16(row.write_access) else {
            bail!(
                "content node {} has invalid write access {}",
                row.id,
                row.write_access
            );
        };

        Ok(Page {
            id: row.id,
            kind: NodeKind::from(row.kind),
            container_id: row.container_id,
            parent_id: row.parent_id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            tags: row.tags,
            access,
            write_access,
            created: row.created,
            changed: row.changed,
        })
    }
}

const PAGE_COLUMNS: &str = "id, kind, container_id, parent_id, owner_id, title, description, \
                            tags, access, write_access, created, changed";

impl Page {
    /// Find a content node by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM content_node WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch content node by id")?;

        row.map(Page::try_from).transpose()
    }

    /// Find content nodes matching a query, in creation order.
    pub async fn find(pool: &PgPool, query: &PageQuery) -> Result<Vec<Self>> {
        // $1 kind, $2 container (nullable), $3 parent mode, $4 parent id
        let (parent_mode, parent_id) = match query.parent {
            ParentFilter::Any => ("any", None),
            ParentFilter::Root => ("root", None),
            ParentFilter::Of(id) => ("of", Some(id)),
        };

        let rows = sqlx::query_as::<_, PageRow>(&format!(
            r#"
            SELECT {PAGE_COLUMNS}
            FROM content_node
            WHERE kind = $1
              AND ($2::uuid IS NULL OR container_id = $2)
              AND (
                    $3 = 'any'
                 OR ($3 = 'root' AND parent_id IS NULL)
                 OR ($3 = 'of' AND parent_id = $4)
              )
            ORDER BY created, id
            "#
        ))
        .bind(query.kind.as_str())
        .bind(query.container_id)
        .bind(parent_mode)
        .bind(parent_id)
        .fetch_all(pool)
        .await
        .context("failed to query content nodes")?;

        rows.into_iter().map(Page::try_from).collect()
    }

    /// Insert or update a page and record a revision of its description.
    pub async fn save(pool: &PgPool, draft: &PageDraft) -> Result<Self> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = pool.begin().await.context("failed to begin transaction")?;

        let row = match draft.id {
            Some(id) => sqlx::query_as::<_, PageRow>(&format!(
                r#"
                UPDATE content_node
                SET container_id = $2, parent_id = $3, title = $4, description = $5,
                    tags = $6, access = $7, write_access = $8, changed = $9
                WHERE id = $1 AND kind = 'page'
                RETURNING {PAGE_COLUMNS}
                "#
            ))
            .bind(id)
            .bind(draft.container_id)
            .bind(draft.parent_id)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(&draft.tags)
            .bind(draft.access.as_i16())
            .bind(draft.write_access.as_i16())
            .bind(now)
            .fetch_optional(&mut *tx)
            .await
            .context("failed to update page")?
            .with_context(|| format!("page {id} does not exist"))?,
            None => sqlx::query_as::<_, PageRow>(&format!(
                r#"
                INSERT INTO content_node
                    (id, kind, container_id, parent_id, owner_id, title, description,
                     tags, access, write_access, created, changed)
                VALUES ($1, 'page', $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
                RETURNING {PAGE_COLUMNS}
                "#
            ))
            .bind(Uuid::now_v7())
            .bind(draft.container_id)
            .bind(draft.parent_id)
            .bind(draft.author_id)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(&draft.tags)
            .bind(draft.access.as_i16())
            .bind(draft.write_access.as_i16())
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .context("failed to create page")?,
        };

        sqlx::query(
            r#"
            INSERT INTO content_node_revision (id, node_id, author_id, description, created)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(row.id)
        .bind(draft.author_id)
        .bind(&draft.description)
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("failed to record page revision")?;

        tx.commit().await.context("failed to commit transaction")?;

        Page::try_from(row)
    }
}

impl PageRevision {
    /// Find a revision by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let revision = sqlx::query_as::<_, PageRevision>(
            "SELECT id, node_id, author_id, description, created FROM content_node_revision WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch page revision")?;

        Ok(revision)
    }
}

impl Container {
    /// Resolve an ID to a user or group container.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let kind: Option<String> = sqlx::query_scalar(
            r#"
            SELECT 'user' FROM users WHERE id = $1
            UNION ALL
            SELECT 'group' FROM user_groups WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to resolve container")?;

        Ok(kind.map(|k| Container {
            id,
            kind: if k == "group" {
                ContainerKind::Group
            } else {
                ContainerKind::User
            },
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn page(parent_id: Option<Uuid>, container_id: Uuid) -> Page {
        Page {
            id: Uuid::now_v7(),
            kind: NodeKind::Page,
            container_id,
            parent_id,
            owner_id: Uuid::nil(),
            title: "Handbook".to_string(),
            description: String::new(),
            tags: vec![],
            access: AccessLevel::Public,
            write_access: AccessLevel::Private,
            created: 1000,
            changed: 1000,
        }
    }

    #[test]
    fn node_kind_from_column() {
        assert_eq!(NodeKind::from("page".to_string()), NodeKind::Page);
        assert_eq!(
            NodeKind::from("blog".to_string()),
            NodeKind::Other("blog".to_string())
        );
        assert_eq!(NodeKind::Other("blog".to_string()).as_str(), "blog");
    }

    #[test]
    fn access_level_parsing() {
        assert_eq!("2".parse::<AccessLevel>(), Ok(AccessLevel::Public));
        assert_eq!("-1".parse::<AccessLevel>(), Ok(AccessLevel::Default));
        assert_eq!("logged_in".parse::<AccessLevel>(), Ok(AccessLevel::LoggedIn));
        assert!("7".parse::<AccessLevel>().is_err());
        assert!("friends".parse::<AccessLevel>().is_err());

        for level in [
            AccessLevel::Default,
            AccessLevel::Private,
            AccessLevel::LoggedIn,
            AccessLevel::Public,
        ] {
            assert_eq!(AccessLevel::from_i16(level.as_i16()), Some(level));
        }
    }

    #[test]
    fn page_url_uses_id() {
        let p = page(None, Uuid::nil());
        assert_eq!(p.url(), format!("/pages/view/{}", p.id));
        assert_eq!(p.parent_id, None);
        assert!(p.is_page());
    }

    #[test]
    fn query_matching() {
        let container = Uuid::now_v7();
        let top = page(None, container);
        let child = page(Some(top.id), container);

        assert!(PageQuery::top_level(container).matches(&top));
        assert!(!PageQuery::top_level(container).matches(&child));
        assert!(!PageQuery::top_level(Uuid::now_v7()).matches(&top));

        assert!(PageQuery::children_of(top.id).matches(&child));
        assert!(!PageQuery::children_of(top.id).matches(&top));

        let mut blog = child.clone();
        blog.kind = NodeKind::Other("blog".to_string());
        assert!(!PageQuery::children_of(top.id).matches(&blog));
    }

    #[test]
    fn row_with_bad_access_is_rejected() {
        let row = PageRow {
            id: Uuid::nil(),
            kind: "page".to_string(),
            container_id: Uuid::nil(),
            parent_id: None,
            owner_id: Uuid::nil(),
            title: "x".to_string(),
            description: String::new(),
            tags: vec![],
            access: 9,
            write_access: 0,
            created: 0,
            changed: 0,
        };
        assert!(Page::try_from(row).is_err());
    }
}
