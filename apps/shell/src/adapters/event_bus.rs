//! Log-backed event bus adapter.
//!
//! Implements the EventBus trait by writing each event as a structured
//! tracing record. Stands in for a frontend bridge in headless runs.

use storefront_events::EventBus;

/// EventBus implementation that logs events via `tracing`.
pub struct LogEventBus;

impl EventBus for LogEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        tracing::info!(target: "storefront::events", topic, payload = %payload, "event");
    }
}
