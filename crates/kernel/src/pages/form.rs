//! Add/edit form values for pages.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::form::StickyForms;
use crate::models::{AccessLevel, Page, PageRevision};

/// Sticky form name used by the page add/edit form.
pub const PAGE_FORM: &str = "page";

/// Values used to populate the page add/edit form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageFormValues {
    pub title: String,
    pub description: String,
    pub access: AccessLevel,
    pub write_access: AccessLevel,
    /// Comma-separated tags.
    pub tags: String,
    pub container_id: Option<Uuid>,
    /// ID of the page being edited, `None` when adding.
    pub id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    /// The page being edited.
    #[serde(skip)]
    pub page: Option<Page>,
    /// Submitted values for known fields that could not be parsed, shown
    /// back to the user as typed.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub invalid: BTreeMap<String, Value>,
    /// Sticky values that do not correspond to a known field.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PageFormValues {
    /// Defaults for a new page.
    pub fn defaults(page_owner: Option<Uuid>, parent_id: Option<Uuid>) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            access: AccessLevel::Default,
            write_access: AccessLevel::Default,
            tags: String::new(),
            container_id: page_owner,
            id: None,
            parent_id,
            page: None,
            invalid: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    fn apply_page(&mut self, page: &Page) {
        self.title = page.title.clone();
        self.description = page.description.clone();
        self.access = page.access;
        self.write_access = page.write_access;
        self.tags = page.tags.join(", ");
        self.container_id = Some(page.container_id);
        self.id = Some(page.id);
        self.parent_id = page.parent_id;
        self.page = Some(page.clone());
    }

    /// Apply one submitted value. Values that cannot be parsed into their
    /// field go to `invalid`, unknown keys to `extra`.
    fn apply_sticky(&mut self, key: &str, value: Value) {
        let applied = match key {
            "title" => set(&mut self.title, text(&value)),
            "description" => set(&mut self.description, text(&value)),
            "tags" => set(&mut self.tags, tags(&value)),
            "access" => set(&mut self.access, access(&value)),
            "write_access" => set(&mut self.write_access, access(&value)),
            "container_id" => set(&mut self.container_id, optional_id(&value)),
            "id" => set(&mut self.id, optional_id(&value)),
            "parent_id" => set(&mut self.parent_id, optional_id(&value)),
            // Would collide with the serialized field names.
            "invalid" | "page" => false,
            _ => {
                self.extra.insert(key.to_string(), value);
                return;
            }
        };

        if !applied {
            self.invalid.insert(key.to_string(), value);
        }
    }
}

/// Prepare the add/edit form values.
///
/// Starts from the defaults, then applies in order: the fields of the page
/// being edited, the sticky values of a previous failed submission (which
/// are consumed from `sticky`), and the description of `revision` when it
/// belongs to `page`.
pub fn prepare_form_vars(
    page: Option<&Page>,
    parent_id: Option<Uuid>,
    revision: Option<&PageRevision>,
    page_owner: Option<Uuid>,
    sticky: &mut StickyForms,
) -> PageFormValues {
    let mut values = PageFormValues::defaults(page_owner, parent_id);

    let page = page.filter(|p| p.is_page());
    if let Some(page) = page {
        values.apply_page(page);
    }

    if let Some(submitted) = sticky.take(PAGE_FORM) {
        debug!(fields = submitted.len(), "restoring sticky page form values");
        for (key, value) in submitted {
            values.apply_sticky(&key, value);
        }
    }

    if let (Some(revision), Some(page)) = (revision, page)
        && revision.page_id == page.id
    {
        values.description = revision.description.clone();
    }

    values
}

fn set<T>(slot: &mut T, parsed: Option<T>) -> bool {
    match parsed {
        Some(value) => {
            *slot = value;
            true
        }
        None => false,
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => Some(String::new()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn tags(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => text(other),
    }
}

fn access(value: &Value) -> Option<AccessLevel> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n
            .as_i64()
            .and_then(|n| i16::try_from(n).ok())
            .and_then(AccessLevel::from_i16),
        _ => None,
    }
}

/// Parse an ID field; empty, `0` and null mean "none".
fn optional_id(value: &Value) -> Option<Option<Uuid>> {
    match value {
        Value::Null => Some(None),
        Value::Number(n) if n.as_i64() == Some(0) => Some(None),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s == "0" {
                Some(None)
            } else {
                s.parse().ok().map(Some)
            }
        }
        _ => None,
    }
}
