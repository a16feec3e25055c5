//! CLI command implementations for pages.
//!
//! These run against the content store only, without starting the server.

use anyhow::Result;
use uuid::Uuid;

use super::tree::{TreeEntry, navigation_tree};
use crate::content_store::ContentStore;

/// Print the navigation tree of a container.
pub async fn cmd_pages_tree(store: &dyn ContentStore, container_id: Uuid) -> Result<()> {
    let tree = navigation_tree(store, container_id).await?;

    if tree.is_empty() {
        println!("No pages found for {container_id}.");
        return Ok(());
    }

    for line in render_tree(&tree) {
        println!("{line}");
    }

    Ok(())
}

/// One line per entry, indented two spaces per level.
pub fn render_tree(tree: &[TreeEntry]) -> Vec<String> {
    tree.iter()
        .map(|entry| {
            format!(
                "{}{}  {}",
                "  ".repeat(entry.depth as usize),
                entry.title,
                entry.url
            )
        })
        .collect()
}
