//! Menu registry - collects navigation items for named menus.
//!
//! A registry is built per request: components register items into named
//! menus (e.g. `"pages_nav"`), then the response renders them. Items form a
//! tree through `parent_name`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A navigation item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Unique name within its menu.
    pub name: String,
    /// Link text.
    pub text: String,
    /// Link target.
    pub href: String,
    /// Name of the parent item, `None` for top-level items.
    #[serde(default)]
    pub parent_name: Option<String>,
    /// Whether this item represents the current page.
    #[serde(default)]
    pub selected: bool,
}

/// One named menu with its parent/child index.
#[derive(Debug, Default, Clone)]
pub struct Menu {
    /// Items in registration order.
    items: Vec<MenuItem>,
    /// Item name -> position in `items`.
    index: HashMap<String, usize>,
    /// Parent name -> child names, in registration order.
    children: HashMap<String, Vec<String>>,
}

impl Menu {
    fn insert(&mut self, item: MenuItem) {
        if let Some(&pos) = self.index.get(&item.name) {
            warn!(item = %item.name, "menu item registered twice; replacing");
            let old_parent = self.items[pos].parent_name.clone();
            if let Some(parent) = old_parent
                && let Some(siblings) = self.children.get_mut(&parent)
            {
                siblings.retain(|n| n != &item.name);
            }
            if let Some(ref parent) = item.parent_name {
                self.children
                    .entry(parent.clone())
                    .or_default()
                    .push(item.name.clone());
            }
            self.items[pos] = item;
            return;
        }

        // Track parent-child relationships
        if let Some(ref parent) = item.parent_name {
            self.children
                .entry(parent.clone())
                .or_default()
                .push(item.name.clone());
        }

        self.index.insert(item.name.clone(), self.items.len());
        self.items.push(item);
    }

    /// All items in registration order.
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Get an item by name.
    pub fn get(&self, name: &str) -> Option<&MenuItem> {
        self.index.get(name).map(|&pos| &self.items[pos])
    }

    /// Child items of a parent, in registration order.
    pub fn children_of(&self, parent: &str) -> Vec<&MenuItem> {
        self.children
            .get(parent)
            .map(|names| names.iter().filter_map(|n| self.get(n)).collect())
            .unwrap_or_default()
    }

    /// Top-level items (no parent, or a parent that was never registered).
    pub fn roots(&self) -> Vec<&MenuItem> {
        self.items
            .iter()
            .filter(|item| {
                item.parent_name
                    .as_deref()
                    .is_none_or(|parent| !self.index.contains_key(parent))
            })
            .collect()
    }

    /// The selected item, if any.
    pub fn selected(&self) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.selected)
    }

    /// Ancestors of the selected item, top-level first, excluding the
    /// selected item itself. Used to expand the branch leading to it.
    pub fn selected_trail(&self) -> Vec<&MenuItem> {
        let mut trail = Vec::new();
        let Some(selected) = self.selected() else {
            return trail;
        };

        let mut parent = selected.parent_name.as_deref();
        while let Some(name) = parent {
            let Some(item) = self.get(name) else {
                break;
            };
            if trail.iter().any(|seen: &&MenuItem| seen.name == item.name) {
                warn!(item = %item.name, "menu parent chain loops");
                break;
            }
            trail.push(item);
            parent = item.parent_name.as_deref();
        }

        trail.reverse();
        trail
    }
}

/// Registry of named menus.
#[derive(Debug, Default, Clone)]
pub struct MenuRegistry {
    menus: HashMap<String, Menu>,
}

impl MenuRegistry {
    /// Create an empty menu registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item into a menu, creating the menu on first use.
    pub fn register(&mut self, menu_id: &str, item: MenuItem) {
        debug!(menu = %menu_id, item = %item.name, "registering menu item");
        self.menus.entry(menu_id.to_string()).or_default().insert(item);
    }

    /// Get a menu by name.
    pub fn menu(&self, menu_id: &str) -> Option<&Menu> {
        self.menus.get(menu_id)
    }

    /// Items of a menu, empty if the menu was never registered.
    pub fn items(&self, menu_id: &str) -> &[MenuItem] {
        self.menus.get(menu_id).map(Menu::items).unwrap_or(&[])
    }
}
