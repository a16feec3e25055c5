//! Tap system for extension points.
//!
//! Taps are named extension points other components can implement. When an
//! alter tap is invoked, every handler is called in weight order (lower =
//! higher priority) and each may transform the running value.

mod registry;

pub use registry::{AlterTap, TapHandler, TapRegistry};

/// Alter tap over the URL a user is sent to after logging in.
///
/// Params: `{"user": {"id", "name"}, "source": "last_forward_from" | "return_to_referer" | null}`.
/// Value: the forward URL as a JSON string.
pub const TAP_LOGIN_FORWARD: &str = "login:forward";
