//! Page submissions.

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::content_store::ContentStore;
use crate::models::{AccessLevel, Page, PageDraft};

/// Reasons a page submission is rejected.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("A page needs a title.")]
    MissingTitle,

    #[error("The page you are editing no longer exists.")]
    PageNotFound,

    #[error("Pages must belong to a user or a group.")]
    InvalidContainer,

    #[error("The selected parent page does not exist.")]
    ParentNotFound,

    #[error("A page cannot be moved under itself or one of its subpages.")]
    ParentCycle,

    #[error("Invalid value for {0}.")]
    InvalidField(&'static str),

    #[error("failed to save page")]
    Store(#[from] anyhow::Error),
}

/// Validate a submitted page form and persist it.
///
/// `values` are the raw submitted fields: `id` (empty when adding), `title`,
/// `description`, `tags` (comma-separated), `access`, `write_access`,
/// `container_id`, `parent_id` (empty or `0` for a top-level page).
pub async fn save_page(
    store: &dyn ContentStore,
    author_id: Uuid,
    values: &BTreeMap<String, String>,
) -> Result<Page, SaveError> {
    let field = |name: &str| values.get(name).map(|v| v.trim()).unwrap_or_default();

    let existing = match parse_id(field("id"), "id")? {
        Some(id) => Some(
            store
                .find_page(id)
                .await?
                .filter(Page::is_page)
                .ok_or(SaveError::PageNotFound)?,
        ),
        None => None,
    };

    let title = field("title");
    if title.is_empty() {
        return Err(SaveError::MissingTitle);
    }

    let container_id = match parse_id(field("container_id"), "container_id")? {
        Some(id) => id,
        None => existing
            .as_ref()
            .map(|p| p.container_id)
            .ok_or(SaveError::InvalidContainer)?,
    };
    if store.find_container(container_id).await?.is_none() {
        return Err(SaveError::InvalidContainer);
    }

    let parent_id = parse_id(field("parent_id"), "parent_id")?;
    if let Some(parent_id) = parent_id {
        let parent = store
            .find_page(parent_id)
            .await?
            .filter(Page::is_page)
            .ok_or(SaveError::ParentNotFound)?;

        if let Some(ref page) = existing
            && would_create_cycle(store, page.id, &parent).await?
        {
            return Err(SaveError::ParentCycle);
        }
    }

    let draft = PageDraft {
        id: existing.as_ref().map(|p| p.id),
        container_id,
        parent_id,
        author_id,
        title: title.to_string(),
        description: values.get("description").cloned().unwrap_or_default(),
        tags: parse_tags(field("tags")),
        access: parse_access(field("access"), "access")?,
        write_access: parse_access(field("write_access"), "write_access")?,
    };

    let page = store.save_page(&draft).await?;
    info!(page = %page.id, author = %author_id, created = existing.is_none(), "page saved");

    Ok(page)
}

/// Whether making `new_parent` the parent of `page_id` would put the page
/// inside its own subtree.
pub async fn would_create_cycle(
    store: &dyn ContentStore,
    page_id: Uuid,
    new_parent: &Page,
) -> anyhow::Result<bool> {
    if new_parent.id == page_id {
        return Ok(true);
    }

    let mut seen = HashSet::from([new_parent.id]);
    let mut next = new_parent.parent_id;
    while let Some(ancestor_id) = next {
        if ancestor_id == page_id {
            return Ok(true);
        }
        if !seen.insert(ancestor_id) {
            warn!(page = %ancestor_id, "existing page ancestry loops");
            return Ok(true);
        }
        next = store
            .find_page(ancestor_id)
            .await?
            .and_then(|ancestor| ancestor.parent_id);
    }

    Ok(false)
}

fn parse_id(raw: &str, name: &'static str) -> Result<Option<Uuid>, SaveError> {
    if raw.is_empty() || raw == "0" {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| SaveError::InvalidField(name))
}

fn parse_access(raw: &str, name: &'static str) -> Result<AccessLevel, SaveError> {
    if raw.is_empty() {
        return Ok(AccessLevel::Default);
    }
    raw.parse().map_err(|_| SaveError::InvalidField(name))
}

fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_split_and_trimmed() {
        assert_eq!(parse_tags(" rust,  docs ,,wiki"), ["rust", "docs", "wiki"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn ids_accept_empty_and_zero_as_none() {
        assert!(matches!(parse_id("", "id"), Ok(None)));
        assert!(matches!(parse_id("0", "id"), Ok(None)));
        assert!(matches!(
            parse_id("not-a-uuid", "parent_id"),
            Err(SaveError::InvalidField("parent_id"))
        ));
        let id = Uuid::now_v7();
        assert!(matches!(parse_id(&id.to_string(), "id"), Ok(Some(parsed)) if parsed == id));
    }

    #[test]
    fn access_defaults_when_missing() {
        assert!(matches!(parse_access("", "access"), Ok(AccessLevel::Default)));
        assert!(matches!(parse_access("public", "access"), Ok(AccessLevel::Public)));
        assert!(matches!(
            parse_access("friends", "write_access"),
            Err(SaveError::InvalidField("write_access"))
        ));
    }
}
