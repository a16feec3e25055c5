//! Page navigation menu.

use anyhow::Result;
use uuid::Uuid;

use super::tree::navigation_tree;
use crate::content_store::ContentStore;
use crate::menu::{MenuItem, MenuRegistry};
use crate::models::Page;

/// Menu the page tree is registered into.
pub const PAGES_NAV_MENU: &str = "pages_nav";

/// Register a container's page tree as the `pages_nav` menu.
///
/// `selected` marks the page currently being viewed. Nothing is registered
/// when the container has no pages.
pub async fn register_navigation_tree(
    store: &dyn ContentStore,
    menus: &mut MenuRegistry,
    container_id: Uuid,
    selected: Option<&Page>,
) -> Result<()> {
    let tree = navigation_tree(store, container_id).await?;

    for entry in tree {
        let is_selected = selected.is_some_and(|page| page.is_page() && page.id == entry.id);
        menus.register(
            PAGES_NAV_MENU,
            MenuItem {
                name: entry.id.to_string(),
                text: entry.title,
                href: entry.url,
                parent_name: entry.parent_id.map(|id| id.to_string()),
                selected: is_selected,
            },
        );
    }

    Ok(())
}
