//! Menu system for navigation.
//!
//! Provides:
//! - Named menus of items linked into trees by `parent_name`
//! - Selected-item tracking for highlighting the current page
//! - Breadcrumb trails

mod breadcrumb;
mod registry;

pub use breadcrumb::{Breadcrumb, Breadcrumbs};
pub use registry::{Menu, MenuItem, MenuRegistry};
