//! Event bus abstraction for decoupled event emission.
//!
//! The gate, the query runner and the screen host publish through this
//! trait, so none of them knows whether events end up in a log, a test
//! buffer or a frontend bridge.

use std::sync::{Arc, Mutex, MutexGuard};

/// Sink for shell events.
pub trait EventBus: Send + Sync {
    /// Emit an event with a JSON payload.
    ///
    /// # Arguments
    /// * `topic` - Event name (see `event_names`)
    /// * `payload` - JSON payload to emit
    fn emit(&self, topic: &str, payload: serde_json::Value);
}

/// Type alias for shared event bus reference.
pub type EventBusRef = Arc<dyn EventBus>;

/// A captured event from InMemoryEventBus.
#[derive(Debug, Clone)]
pub struct EmittedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

/// Event bus that keeps every event in memory, for tests and diagnostics.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<EmittedEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking emitter must not hide the events captured before it.
    fn guard(&self) -> MutexGuard<'_, Vec<EmittedEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All captured events, oldest first.
    pub fn events(&self) -> Vec<EmittedEvent> {
        self.guard().clone()
    }

    /// Captured events for one topic.
    pub fn events_for(&self, topic: &str) -> Vec<EmittedEvent> {
        self.guard()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    /// Most recent payload for a topic.
    pub fn last_for(&self, topic: &str) -> Option<serde_json::Value> {
        self.guard()
            .iter()
            .rev()
            .find(|e| e.topic == topic)
            .map(|e| e.payload.clone())
    }

    pub fn clear(&self) {
        self.guard().clear();
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        self.guard().push(EmittedEvent {
            topic: topic.to_string(),
            payload,
        });
    }
}

/// No-op event bus that discards all events.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_in_memory_bus_filters_by_topic() {
        let bus = InMemoryEventBus::new();

        bus.emit("gate:decision_changed", json!({"decision": "loading"}));
        bus.emit("screen:mounted", json!({"screen": "loading"}));
        bus.emit("gate:decision_changed", json!({"decision": "ready"}));

        assert_eq!(bus.len(), 3);
        assert_eq!(bus.events_for("gate:decision_changed").len(), 2);
        assert_eq!(bus.events_for("query:settled").len(), 0);
        assert_eq!(
            bus.last_for("gate:decision_changed"),
            Some(json!({"decision": "ready"}))
        );
        assert_eq!(bus.last_for("query:settled"), None);
    }

    #[test]
    fn test_in_memory_bus_clear() {
        let bus = InMemoryEventBus::new();
        bus.emit("screen:mounted", json!({}));
        assert!(!bus.is_empty());

        bus.clear();
        assert!(bus.is_empty());
    }

    #[test]
    fn test_in_memory_bus_survives_poisoning() {
        let bus = Arc::new(InMemoryEventBus::new());
        bus.emit("a", json!(1));

        let poisoner = Arc::clone(&bus);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.events.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        bus.emit("b", json!(2));
        assert_eq!(bus.len(), 2);
    }
}
