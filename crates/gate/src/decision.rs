//! Gate decision and resolution logic.
//!
//! Pure domain logic - no I/O, no async.

use crate::query::QueryState;
use crate::status::{leading_status, CatalogTree, StoreStatus, StoreStatusRecord};
use serde::{Deserialize, Serialize};

/// Which top-level screen the shell should mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GateDecision {
    /// Upstream data is still being fetched.
    #[default]
    Loading,

    /// Store reported maintenance.
    Maintenance,

    /// Store reported it is switched off.
    Closed,

    /// Mount the real application.
    Ready,
}

impl GateDecision {
    pub fn label(&self) -> &'static str {
        match self {
            GateDecision::Loading => "Loading",
            GateDecision::Maintenance => "Maintenance",
            GateDecision::Closed => "Closed",
            GateDecision::Ready => "Ready",
        }
    }
}

impl std::fmt::Display for GateDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Predicate deciding when pending sources hold the gate in `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadingRule {
    /// Block only while every required source is pending.
    ///
    /// If just one source is still pending the gate falls through to the
    /// status rules, possibly with no status data at all.
    #[default]
    BothPending,

    /// Block while any required source is pending.
    AnyPending,
}

impl LoadingRule {
    pub fn blocks(&self, status_loading: bool, catalog_loading: bool) -> bool {
        match self {
            LoadingRule::BothPending => status_loading && catalog_loading,
            LoadingRule::AnyPending => status_loading || catalog_loading,
        }
    }
}

/// Flag-level snapshot of both queries at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateInputs {
    /// Status of the first store-status record, if any was delivered.
    pub store_status: Option<StoreStatus>,
    pub is_loading_store_status: bool,
    pub category_loading: bool,
    pub is_error_store_status: bool,
}

impl GateInputs {
    pub fn new(
        store_status: Option<StoreStatus>,
        is_loading_store_status: bool,
        category_loading: bool,
        is_error_store_status: bool,
    ) -> Self {
        Self {
            store_status,
            is_loading_store_status,
            category_loading,
            is_error_store_status,
        }
    }

    /// Read the flags off the two query snapshots.
    ///
    /// Catalog errors are not looked at.
    pub fn from_queries(
        status: &QueryState<Vec<StoreStatusRecord>>,
        catalog: &QueryState<CatalogTree>,
    ) -> Self {
        Self {
            store_status: status.data().and_then(|records| leading_status(records)),
            is_loading_store_status: status.is_loading(),
            category_loading: catalog.is_loading(),
            is_error_store_status: status.is_error(),
        }
    }
}

/// Resolve the screen decision from a query snapshot.
///
/// Priority:
/// 1. Loading (if the loading rule blocks)
/// 2. Ready (if the status query failed - fail open)
/// 3. Maintenance (first record says maintenance)
/// 4. Closed (first record says off)
/// 5. Ready (fallback, including missing or unknown status)
pub fn resolve_decision(inputs: &GateInputs, rule: LoadingRule) -> GateDecision {
    if rule.blocks(inputs.is_loading_store_status, inputs.category_loading) {
        return GateDecision::Loading;
    }

    // A failed status check must not block shoppers
    if inputs.is_error_store_status {
        return GateDecision::Ready;
    }

    match inputs.store_status {
        Some(StoreStatus::Maintenance) => GateDecision::Maintenance,
        Some(StoreStatus::Off) => GateDecision::Closed,
        _ => GateDecision::Ready,
    }
}

/// Stateless gate bound to a loading rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvailabilityGate {
    rule: LoadingRule,
}

impl AvailabilityGate {
    pub fn new(rule: LoadingRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> LoadingRule {
        self.rule
    }

    pub fn evaluate(
        &self,
        status: &QueryState<Vec<StoreStatusRecord>>,
        catalog: &QueryState<CatalogTree>,
    ) -> GateDecision {
        resolve_decision(&GateInputs::from_queries(status, catalog), self.rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(
        status: Option<StoreStatus>,
        status_loading: bool,
        catalog_loading: bool,
        status_error: bool,
    ) -> GateInputs {
        GateInputs::new(status, status_loading, catalog_loading, status_error)
    }

    #[test]
    fn test_both_loading_wins_over_everything() {
        for status in [
            None,
            Some(StoreStatus::Open),
            Some(StoreStatus::Maintenance),
            Some(StoreStatus::Off),
        ] {
            for error in [false, true] {
                let decision =
                    resolve_decision(&inputs(status, true, true, error), LoadingRule::BothPending);
                assert_eq!(decision, GateDecision::Loading);
            }
        }
    }

    #[test]
    fn test_status_error_fails_open() {
        let decision = resolve_decision(
            &inputs(Some(StoreStatus::Maintenance), false, false, true),
            LoadingRule::BothPending,
        );
        assert_eq!(decision, GateDecision::Ready);

        // Error with only the catalog loading is still not "both loading"
        let decision = resolve_decision(
            &inputs(Some(StoreStatus::Off), false, true, true),
            LoadingRule::BothPending,
        );
        assert_eq!(decision, GateDecision::Ready);
    }

    #[test]
    fn test_maintenance() {
        let decision = resolve_decision(
            &inputs(Some(StoreStatus::Maintenance), false, false, false),
            LoadingRule::BothPending,
        );
        assert_eq!(decision, GateDecision::Maintenance);
    }

    #[test]
    fn test_off_is_closed() {
        let decision = resolve_decision(
            &inputs(Some(StoreStatus::Off), false, false, false),
            LoadingRule::BothPending,
        );
        assert_eq!(decision, GateDecision::Closed);
    }

    #[test]
    fn test_open_and_unknown_are_ready() {
        for status in [Some(StoreStatus::Open), Some(StoreStatus::Unknown), None] {
            let decision =
                resolve_decision(&inputs(status, false, false, false), LoadingRule::BothPending);
            assert_eq!(decision, GateDecision::Ready);
        }
    }

    #[test]
    fn test_single_source_loading_falls_through_to_ready() {
        // Only the catalog is loading and no status has arrived: rule 1 needs
        // both flags, so the gate lands on the fallback.
        let decision = resolve_decision(&inputs(None, false, true, false), LoadingRule::BothPending);
        assert_eq!(decision, GateDecision::Ready);

        let decision = resolve_decision(&inputs(None, true, false, false), LoadingRule::BothPending);
        assert_eq!(decision, GateDecision::Ready);
    }

    #[test]
    fn test_any_pending_rule_blocks_on_single_source() {
        let decision = resolve_decision(&inputs(None, false, true, false), LoadingRule::AnyPending);
        assert_eq!(decision, GateDecision::Loading);

        let decision = resolve_decision(&inputs(None, true, false, true), LoadingRule::AnyPending);
        assert_eq!(decision, GateDecision::Loading);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let snapshot = inputs(Some(StoreStatus::Maintenance), false, true, false);
        let first = resolve_decision(&snapshot, LoadingRule::BothPending);
        let second = resolve_decision(&snapshot, LoadingRule::BothPending);
        assert_eq!(first, second);
    }

    #[test]
    fn test_gate_reads_query_snapshots() {
        let gate = AvailabilityGate::default();
        let catalog = QueryState::Ready(CatalogTree::default());

        let status = QueryState::Ready(vec![StoreStatusRecord::new(StoreStatus::Off)]);
        assert_eq!(gate.evaluate(&status, &catalog), GateDecision::Closed);

        let status = QueryState::Ready(Vec::new());
        assert_eq!(gate.evaluate(&status, &catalog), GateDecision::Ready);

        let status = QueryState::Failed("502".into());
        assert_eq!(gate.evaluate(&status, &QueryState::Failed("x".into())), GateDecision::Ready);

        assert_eq!(
            gate.evaluate(&QueryState::Pending, &QueryState::Pending),
            GateDecision::Loading
        );
    }

    #[test]
    fn test_decision_serializes_lowercase() {
        let json = serde_json::to_string(&GateDecision::Maintenance).unwrap();
        assert_eq!(json, "\"maintenance\"");
        let rule: LoadingRule = serde_json::from_str("\"any_pending\"").unwrap();
        assert_eq!(rule, LoadingRule::AnyPending);
    }
}
