//! Navigation tree over a container's pages.

use std::collections::HashSet;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::content_store::ContentStore;
use crate::models::{Page, PageQuery};

/// One page in the flattened navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    /// Parent page; absent for top-level pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    /// 0 for top-level pages, parent depth + 1 otherwise.
    pub depth: u32,
}

impl TreeEntry {
    fn new(page: &Page, parent_id: Option<Uuid>, depth: u32) -> Self {
        Self {
            id: page.id,
            title: page.display_name().to_string(),
            url: page.url(),
            parent_id,
            depth,
        }
    }
}

/// Build the depth-annotated navigation tree of every page in a container.
///
/// Each top-level page is emitted followed by its whole subtree. Children are
/// emitted in store order as their parent is expanded; expansion uses a
/// stack, so the most recently emitted sibling's subtree is expanded first.
///
/// Returns an empty tree when `container_id` is not a known container.
/// A page reached a second time (cyclic or multiply-linked data) is skipped.
pub async fn navigation_tree(store: &dyn ContentStore, container_id: Uuid) -> Result<Vec<TreeEntry>> {
    let Some(container) = store.find_container(container_id).await? else {
        debug!(container = %container_id, "not a container; empty navigation tree");
        return Ok(Vec::new());
    };

    let top_pages = store.find_pages(&PageQuery::top_level(container.id)).await?;

    let mut tree = Vec::new();
    let mut visited = HashSet::new();

    for page in top_pages {
        if !page.is_page() || !visited.insert(page.id) {
            continue;
        }

        tree.push(TreeEntry::new(&page, None, 0));

        let mut stack = vec![(page, 0u32)];
        while let Some((parent, depth)) = stack.pop() {
            let children = store.find_pages(&PageQuery::children_of(parent.id)).await?;

            for child in children {
                if !child.is_page() {
                    continue;
                }
                if !visited.insert(child.id) {
                    warn!(
                        page = %child.id,
                        parent = %parent.id,
                        "page reached twice while building navigation tree; skipping"
                    );
                    continue;
                }

                tree.push(TreeEntry::new(&child, Some(parent.id), depth + 1));
                stack.push((child, depth + 1));
            }
        }
    }

    debug!(container = %container.id, pages = tree.len(), "navigation tree built");
    Ok(tree)
}
