//! Tap registry - indexes which handlers implement which taps.
//!
//! The registry maps tap names to an ordered list of handlers. Handlers are
//! sorted by weight (lower = higher priority, called first); handlers with the
//! same weight keep their registration order.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

/// An alter tap: receives the tap parameters and the running value, returns
/// the value to hand to the next handler.
pub trait AlterTap: Send + Sync {
    fn alter(&self, params: &Value, value: Value) -> Value;
}

impl<F> AlterTap for F
where
    F: Fn(&Value, Value) -> Value + Send + Sync,
{
    fn alter(&self, params: &Value, value: Value) -> Value {
        self(params, value)
    }
}

/// A registered tap handler with owner and priority.
#[derive(Clone)]
pub struct TapHandler {
    /// Name of the component that registered the handler.
    pub plugin: String,
    /// Weight for ordering (lower = higher priority).
    pub weight: i32,
    handler: Arc<dyn AlterTap>,
}

impl fmt::Debug for TapHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapHandler")
            .field("plugin", &self.plugin)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

/// Registry mapping tap names to ordered handlers.
///
/// Built once at startup, then shared read-only.
#[derive(Debug, Default)]
pub struct TapRegistry {
    handlers: HashMap<String, Vec<TapHandler>>,
}

impl TapRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alter handler for a tap.
    pub fn register(
        &mut self,
        tap_name: &str,
        plugin: &str,
        weight: i32,
        handler: impl AlterTap + 'static,
    ) {
        let list = self.handlers.entry(tap_name.to_string()).or_default();
        list.push(TapHandler {
            plugin: plugin.to_string(),
            weight,
            handler: Arc::new(handler),
        });
        // Stable sort keeps registration order within one weight.
        list.sort_by_key(|h| h.weight);
    }

    /// Get handlers for a tap, in weight order.
    ///
    /// Returns an empty slice if nothing implements the tap.
    pub fn get_handlers(&self, tap_name: &str) -> &[TapHandler] {
        self.handlers
            .get(tap_name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Run every handler of an alter tap over `value`.
    ///
    /// Each handler receives the value produced by the previous one; the
    /// final value is returned. With no handlers, `value` is returned as is.
    pub fn alter(&self, tap_name: &str, params: &Value, value: Value) -> Value {
        let handlers = self.get_handlers(tap_name);
        if handlers.is_empty() {
            debug!(tap = %tap_name, "no handlers registered for tap");
            return value;
        }

        let result = handlers.iter().fold(value, |current, handler| {
            let next = handler.handler.alter(params, current);
            debug!(tap = %tap_name, plugin = %handler.plugin, "tap handler applied");
            next
        });

        debug!(tap = %tap_name, handlers = handlers.len(), "alter complete");
        result
    }
}
