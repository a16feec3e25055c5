//! Database models.

pub mod page;
pub mod user;

pub use page::{
    AccessLevel, Container, ContainerKind, NodeKind, Page, PageDraft, PageQuery, PageRevision,
    ParentFilter, page_url,
};
pub use user::User;
