//! Folio CMS kernel library.
//!
//! Login action, hierarchical pages and the HTTP surface around them. The
//! `folio` binary is the main entry point; the library is exposed for
//! integration testing.

pub mod auth;
pub mod config;
pub mod content_store;
pub mod db;
pub mod error;
pub mod form;
pub mod menu;
pub mod messages;
pub mod models;
pub mod pages;
pub mod routes;
pub mod session;
pub mod state;
pub mod tap;

pub use config::Config;
pub use state::AppState;
