//! Hierarchical pages: navigation tree, breadcrumbs, add/edit form values
//! and saving.

pub mod breadcrumbs;
pub mod cli;
pub mod form;
pub mod navigation;
pub mod save;
pub mod tree;

pub use breadcrumbs::{parent_breadcrumbs, prepare_parent_breadcrumbs};
pub use form::{PAGE_FORM, PageFormValues, prepare_form_vars};
pub use navigation::{PAGES_NAV_MENU, register_navigation_tree};
pub use save::{SaveError, save_page, would_create_cycle};
pub use tree::{TreeEntry, navigation_tree};
