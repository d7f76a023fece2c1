//! Gate watcher - background task that re-resolves the decision whenever
//! either query publishes a new snapshot.

use crate::decision::{AvailabilityGate, GateDecision, LoadingRule};
use crate::query::QueryState;
use crate::state::GateChange;
use crate::status::{CatalogTree, StoreStatusRecord};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Receiver of store-status query snapshots.
pub type StatusReceiver = watch::Receiver<QueryState<Vec<StoreStatusRecord>>>;

/// Receiver of catalog query snapshots.
pub type CatalogReceiver = watch::Receiver<QueryState<CatalogTree>>;

/// Callback type for decision changes.
pub type GateCallback = Arc<dyn Fn(GateChange) + Send + Sync + 'static>;

/// Subscribes to both query streams and pushes the resolved decision.
pub struct GateWatcher {
    gate: AvailabilityGate,
    status_rx: StatusReceiver,
    catalog_rx: CatalogReceiver,
    decision_tx: watch::Sender<GateDecision>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl GateWatcher {
    /// Create a watcher. The initial decision is resolved from whatever the
    /// receivers currently hold.
    pub fn new(rule: LoadingRule, status_rx: StatusReceiver, catalog_rx: CatalogReceiver) -> Self {
        let gate = AvailabilityGate::new(rule);
        let initial = gate.evaluate(&status_rx.borrow(), &catalog_rx.borrow());
        let (decision_tx, _) = watch::channel(initial);

        Self {
            gate,
            status_rx,
            catalog_rx,
            decision_tx,
            cancel: CancellationToken::new(),
            handle: None,
        }
    }

    /// Subscribe to decisions. Always holds the latest evaluation.
    pub fn subscribe(&self) -> watch::Receiver<GateDecision> {
        self.decision_tx.subscribe()
    }

    /// Latest resolved decision.
    pub fn current(&self) -> GateDecision {
        *self.decision_tx.borrow()
    }

    pub fn rule(&self) -> LoadingRule {
        self.gate.rule()
    }

    /// Start watching. Must be called inside a tokio runtime.
    ///
    /// `callback` fires only when the decision changes; the first evaluation
    /// always counts as a change.
    pub fn start(&mut self, callback: GateCallback) {
        if self.is_running() {
            tracing::warn!("GateWatcher already running");
            return;
        }

        self.cancel = CancellationToken::new();

        let gate = self.gate;
        let mut status_rx = self.status_rx.clone();
        let mut catalog_rx = self.catalog_rx.clone();
        let decision_tx = self.decision_tx.clone();
        let cancel = self.cancel.clone();

        let handle = tokio::spawn(async move {
            tracing::info!(rule = ?gate.rule(), "GateWatcher started");

            let mut seq: u64 = 0;
            let mut last: Option<GateDecision> = None;
            let mut status_open = true;
            let mut catalog_open = true;

            loop {
                let (decision, status_label, catalog_label) = {
                    let status = status_rx.borrow_and_update();
                    let catalog = catalog_rx.borrow_and_update();
                    (
                        gate.evaluate(&status, &catalog),
                        status.label(),
                        catalog.label(),
                    )
                };
                seq += 1;

                tracing::debug!(
                    seq,
                    decision = %decision,
                    status_query = status_label,
                    catalog_query = catalog_label,
                    "gate evaluated"
                );

                decision_tx.send_replace(decision);

                if last != Some(decision) {
                    tracing::info!(
                        previous = ?last,
                        decision = %decision,
                        "gate decision changed"
                    );
                    callback(GateChange {
                        previous: last,
                        decision,
                        status_query: status_label.to_string(),
                        catalog_query: catalog_label.to_string(),
                        seq,
                        timestamp_ms: chrono::Utc::now().timestamp_millis(),
                    });
                    last = Some(decision);
                }

                if !status_open && !catalog_open {
                    tracing::debug!("both query streams closed");
                    break;
                }

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    res = status_rx.changed(), if status_open => {
                        if res.is_err() {
                            status_open = false;
                        }
                    }
                    res = catalog_rx.changed(), if catalog_open => {
                        if res.is_err() {
                            catalog_open = false;
                        }
                    }
                }
            }

            tracing::info!(evaluations = seq, "GateWatcher stopped");
        });

        self.handle = Some(handle);
    }

    /// Signal the watcher task to stop. Does not wait for it.
    pub fn stop(&mut self) {
        self.cancel.cancel();
    }

    /// Stop the watcher and wait for the task to finish.
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("GateWatcher task ended abnormally: {}", e);
            }
        }
    }

    /// Check if the watcher task is alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for GateWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
