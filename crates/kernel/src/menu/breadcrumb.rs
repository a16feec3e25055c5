//! Breadcrumb trail for the current request.

use serde::{Deserialize, Serialize};

/// A single breadcrumb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub text: String,
    /// Link target; the last crumb is often unlinked.
    pub href: Option<String>,
}

impl Breadcrumb {
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: Some(href.into()),
        }
    }
}

/// Ordered breadcrumb trail, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Breadcrumbs {
    crumbs: Vec<Breadcrumb>,
}

impl Breadcrumbs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a crumb.
    pub fn push(&mut self, text: impl Into<String>, href: Option<String>) {
        self.crumbs.push(Breadcrumb {
            text: text.into(),
            href,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Breadcrumb> {
        self.crumbs.iter()
    }
}
