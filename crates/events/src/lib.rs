//! Shared event contracts for the storefront shell.
//!
//! Defines the payloads published when the gate resolves a new decision,
//! when a query settles, and when the shell mounts a screen. Producers and
//! consumers share these types so field names cannot drift apart.
//!
//! Also provides the `EventBus` trait for decoupled event emission.

mod bus;

pub use bus::{EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, NullEventBus};

use serde::{Deserialize, Serialize};
use storefront_gate::{GateChange, GateDecision};

/// Event emitted when the gate decision changes.
///
/// Producers: gate watcher (via shell wiring)
/// Consumers: screen host, logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionChangedEvent {
    /// New decision.
    pub decision: GateDecision,
    /// Decision it replaced, absent on the first evaluation.
    #[serde(default)]
    pub previous: Option<GateDecision>,
    /// Store-status query lifecycle at evaluation time.
    pub status_query: String,
    /// Catalog query lifecycle at evaluation time.
    pub catalog_query: String,
    /// Timestamp in milliseconds.
    #[serde(default)]
    pub timestamp_ms: i64,
}

impl From<&GateChange> for DecisionChangedEvent {
    fn from(change: &GateChange) -> Self {
        Self {
            decision: change.decision,
            previous: change.previous,
            status_query: change.status_query.clone(),
            catalog_query: change.catalog_query.clone(),
            timestamp_ms: change.timestamp_ms,
        }
    }
}

/// Event emitted when a query finishes a fetch cycle.
///
/// Producers: query runner
/// Consumers: logs, diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySettledEvent {
    /// Query name ("store_status", "catalog").
    pub query: String,
    /// Lifecycle label after settling ("ready" or "failed").
    pub state: String,
    /// Attempts used, including retries.
    pub attempts: u32,
    /// Error message when the query failed.
    #[serde(default)]
    pub error: Option<String>,
    /// Timestamp in milliseconds.
    #[serde(default)]
    pub timestamp_ms: i64,
}

/// Event emitted when the shell swaps the mounted screen.
///
/// Producers: screen host
/// Consumers: frontend, logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenMountedEvent {
    /// Screen identifier.
    pub screen: String,
    /// Decision that selected it.
    pub decision: GateDecision,
    /// Number of mounts so far in this session.
    pub mount_count: u64,
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// Gate decision changed.
    pub const DECISION_CHANGED: &str = "gate:decision_changed";
    /// Query settled.
    pub const QUERY_SETTLED: &str = "query:settled";
    /// Screen mounted.
    pub const SCREEN_MOUNTED: &str = "screen:mounted";
}

/// Serialize an event and emit it on the bus.
///
/// Serialization failures are logged and the event is dropped.
pub fn publish<T: Serialize>(bus: &dyn EventBus, topic: &str, event: &T) {
    match serde_json::to_value(event) {
        Ok(payload) => bus.emit(topic, payload),
        Err(e) => tracing::error!(topic, "failed to serialize event: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_changed_from_gate_change() {
        let change = GateChange {
            previous: Some(GateDecision::Loading),
            decision: GateDecision::Closed,
            status_query: "ready".into(),
            catalog_query: "pending".into(),
            seq: 2,
            timestamp_ms: 1_700_000_000_000,
        };
        let event = DecisionChangedEvent::from(&change);
        assert_eq!(event.decision, GateDecision::Closed);
        assert_eq!(event.previous, Some(GateDecision::Loading));
        assert_eq!(event.catalog_query, "pending");
    }

    #[test]
    fn test_decision_changed_deserialize_minimal() {
        let json = r#"{"decision": "maintenance", "status_query": "ready", "catalog_query": "ready"}"#;
        let event: DecisionChangedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.decision, GateDecision::Maintenance);
        assert_eq!(event.previous, None);
        assert_eq!(event.timestamp_ms, 0);
    }

    #[test]
    fn test_publish_serializes_payload() {
        let bus = InMemoryEventBus::new();
        let event = ScreenMountedEvent {
            screen: "closed".into(),
            decision: GateDecision::Closed,
            mount_count: 1,
        };
        publish(&bus, event_names::SCREEN_MOUNTED, &event);

        let emitted = bus.events_for(event_names::SCREEN_MOUNTED);
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].payload["decision"], "closed");
        assert_eq!(emitted[0].payload["mount_count"], 1);
    }
}
