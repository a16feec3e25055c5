//! Ancestor breadcrumbs for a page.

use std::collections::HashSet;

use anyhow::Result;
use tracing::warn;

use crate::content_store::ContentStore;
use crate::menu::{Breadcrumb, Breadcrumbs};
use crate::models::Page;

/// Breadcrumbs for the ancestors of `page`, top-level ancestor first.
///
/// The page itself is not part of the trail. The walk stops at the first
/// missing parent or at a parent that is not a page.
pub async fn parent_breadcrumbs(store: &dyn ContentStore, page: &Page) -> Result<Vec<Breadcrumb>> {
    let mut crumbs = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(page.clone());

    while let Some(node) = current.take().filter(Page::is_page) {
        if !seen.insert(node.id) {
            warn!(page = %page.id, looped_at = %node.id, "page ancestry loops; truncating breadcrumbs");
            break;
        }

        crumbs.push(Breadcrumb::new(node.display_name(), node.url()));

        current = match node.parent_id {
            Some(parent_id) => store.find_page(parent_id).await?,
            None => None,
        };
    }

    // Drop the page itself, then order outermost first.
    if !crumbs.is_empty() {
        crumbs.remove(0);
    }
    crumbs.reverse();

    Ok(crumbs)
}

/// Push the ancestor breadcrumbs of `page` onto `trail`.
pub async fn prepare_parent_breadcrumbs(
    store: &dyn ContentStore,
    page: &Page,
    trail: &mut Breadcrumbs,
) -> Result<()> {
    for crumb in parent_breadcrumbs(store, page).await? {
        trail.push(crumb.text, crumb.href);
    }

    Ok(())
}
