//! Sticky form values.
//!
//! When a submission fails validation, the handler keeps the submitted
//! values so the form can be re-rendered with them after the redirect. The
//! state is an explicit value: handlers load it from the session, pass it to
//! whoever hydrates the form (which consumes it), then write it back.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_sessions::Session;

/// Session key holding pending sticky forms.
pub const SESSION_STICKY_FORMS: &str = "sticky_forms";

/// Submitted values of one form.
pub type StickyValues = BTreeMap<String, Value>;

/// Sticky values keyed by form name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StickyForms {
    forms: HashMap<String, StickyValues>,
}

impl StickyForms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep submitted values for `form`, replacing any earlier ones.
    pub fn make_sticky(&mut self, form: &str, values: StickyValues) {
        self.forms.insert(form.to_string(), values);
    }

    /// Whether `form` has pending values.
    pub fn is_sticky(&self, form: &str) -> bool {
        self.forms.contains_key(form)
    }

    /// Remove and return the values of `form`.
    pub fn take(&mut self, form: &str) -> Option<StickyValues> {
        self.forms.remove(form)
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Load pending sticky forms from the session.
    pub async fn load(session: &Session) -> Result<Self> {
        let forms = session
            .get::<StickyForms>(SESSION_STICKY_FORMS)
            .await
            .context("failed to read sticky forms from session")?;

        Ok(forms.unwrap_or_default())
    }

    /// Write the sticky forms back, removing the key when nothing is pending.
    pub async fn save(&self, session: &Session) -> Result<()> {
        if self.is_empty() {
            session
                .remove::<StickyForms>(SESSION_STICKY_FORMS)
                .await
                .context("failed to clear sticky forms")?;
        } else {
            session
                .insert(SESSION_STICKY_FORMS, self)
                .await
                .context("failed to store sticky forms")?;
        }

        Ok(())
    }
}
