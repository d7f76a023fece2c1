//! Change notifications produced by the gate watcher.

use crate::decision::GateDecision;
use serde::{Deserialize, Serialize};

/// Emitted when the resolved decision differs from the previous evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateChange {
    /// Decision before this evaluation (`None` on the first one).
    pub previous: Option<GateDecision>,

    /// Newly resolved decision.
    pub decision: GateDecision,

    /// Lifecycle label of the store-status query ("pending", "ready", "failed").
    pub status_query: String,

    /// Lifecycle label of the catalog query.
    pub catalog_query: String,

    /// Evaluation counter, starting at 1.
    pub seq: u64,

    /// Timestamp
    pub timestamp_ms: i64,
}
