//! Form state shared between submissions and re-rendered forms.

pub mod sticky;

pub use sticky::{SESSION_STICKY_FORMS, StickyForms, StickyValues};
