//! Query lifecycle as an explicit tagged state.

use serde::{Deserialize, Serialize};

/// Snapshot of an asynchronous query.
///
/// The `is_loading` / `is_error` / `data` flags consumed by the gate are
/// views over this tag, so contradictory combinations cannot be built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum QueryState<T> {
    /// No result delivered yet.
    Pending,

    /// Last fetch succeeded.
    Ready(T),

    /// Last fetch failed; carries the error message.
    Failed(String),
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        QueryState::Pending
    }
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Pending)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryState::Failed(_))
    }

    pub fn is_settled(&self) -> bool {
        !self.is_loading()
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            QueryState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Short lifecycle label for logs and events.
    pub fn label(&self) -> &'static str {
        match self {
            QueryState::Pending => "pending",
            QueryState::Ready(_) => "ready",
            QueryState::Failed(_) => "failed",
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for QueryState<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => QueryState::Ready(data),
            Err(e) => QueryState::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_follow_tag() {
        let pending: QueryState<u32> = QueryState::Pending;
        assert!(pending.is_loading());
        assert!(!pending.is_error());
        assert_eq!(pending.data(), None);

        let ready = QueryState::Ready(7u32);
        assert!(!ready.is_loading());
        assert!(!ready.is_error());
        assert_eq!(ready.data(), Some(&7));

        let failed: QueryState<u32> = QueryState::Failed("boom".into());
        assert!(!failed.is_loading());
        assert!(failed.is_error());
        assert_eq!(failed.error(), Some("boom"));
    }

    #[test]
    fn test_from_result() {
        let ok: QueryState<u8> = Ok::<u8, String>(1).into();
        assert_eq!(ok, QueryState::Ready(1));

        let err: QueryState<u8> = Err::<u8, String>("timeout".into()).into();
        assert_eq!(err, QueryState::Failed("timeout".into()));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(QueryState::Ready(3)).unwrap();
        assert_eq!(json, serde_json::json!({"state": "ready", "value": 3}));

        let json = serde_json::to_value(QueryState::<u8>::Pending).unwrap();
        assert_eq!(json, serde_json::json!({"state": "pending"}));
    }
}
