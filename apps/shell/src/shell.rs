//! Wiring: queries -> gate watcher -> screen host.

use std::sync::Arc;

use storefront_events::{event_names, publish, DecisionChangedEvent, EventBusRef};
use storefront_gate::{
    CatalogSource, CatalogTree, GateCallback, GateChange, GateDecision, GateWatcher,
    StoreStatusRecord, StoreStatusSource,
};
use storefront_queries::{
    HttpCatalogSource, HttpStoreStatusSource, QueryHandle, QueryRunner, CATALOG_QUERY,
    STORE_STATUS_QUERY,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;
use crate::screens::ScreenHost;

/// A running shell.
pub struct Shell {
    status: QueryHandle<Vec<StoreStatusRecord>>,
    catalog: QueryHandle<CatalogTree>,
    watcher: GateWatcher,
    decisions: watch::Receiver<GateDecision>,
    host_cancel: CancellationToken,
    host: JoinHandle<ScreenHost>,
}

impl Shell {
    /// Start against the HTTP endpoints named in the config.
    pub fn start(ctx: &AppContext) -> Self {
        let status = HttpStoreStatusSource::new(
            ctx.http.clone(),
            &ctx.config.api_base_url,
            &ctx.config.status_path,
        );
        let catalog = HttpCatalogSource::new(
            ctx.http.clone(),
            &ctx.config.api_base_url,
            &ctx.config.catalog_path,
        );
        tracing::info!(
            status_url = status.url(),
            catalog_url = catalog.url(),
            "starting storefront shell"
        );
        Self::start_with_sources(ctx, Arc::new(status), Arc::new(catalog))
    }

    /// Start against arbitrary sources. Must be called inside a tokio runtime.
    pub fn start_with_sources(
        ctx: &AppContext,
        status_source: Arc<dyn StoreStatusSource>,
        catalog_source: Arc<dyn CatalogSource>,
    ) -> Self {
        let query_config = ctx.config.query_config();

        // Both queries start together; neither waits on the other.
        let status = QueryRunner::new(STORE_STATUS_QUERY, query_config.clone())
            .with_events(ctx.events.clone())
            .spawn_status(status_source);
        let catalog = QueryRunner::new(CATALOG_QUERY, query_config)
            .with_events(ctx.events.clone())
            .spawn_catalog(catalog_source);

        let mut watcher = GateWatcher::new(
            ctx.config.loading_rule,
            status.subscribe(),
            catalog.subscribe(),
        );
        watcher.start(decision_publisher(ctx.events.clone()));

        let decisions = watcher.subscribe();
        let host_cancel = CancellationToken::new();
        let host = tokio::spawn(
            ScreenHost::new(ctx.events.clone()).run(watcher.subscribe(), host_cancel.clone()),
        );

        Self {
            status,
            catalog,
            watcher,
            decisions,
            host_cancel,
            host,
        }
    }

    /// Latest gate decision.
    pub fn decision(&self) -> GateDecision {
        self.watcher.current()
    }

    /// Subscribe to gate decisions.
    pub fn decisions(&self) -> watch::Receiver<GateDecision> {
        self.decisions.clone()
    }

    /// Re-run the store-status query (e.g. to leave the maintenance screen).
    pub fn refetch_status(&self) {
        self.status.refetch();
    }

    /// Stop every task and return the screen host's final state.
    pub async fn shutdown(mut self) -> Option<ScreenHost> {
        self.status.stop();
        self.catalog.stop();
        self.watcher.shutdown().await;
        self.host_cancel.cancel();

        match self.host.await {
            Ok(host) => Some(host),
            Err(e) => {
                tracing::warn!("screen host ended abnormally: {}", e);
                None
            }
        }
    }
}

fn decision_publisher(events: EventBusRef) -> GateCallback {
    Arc::new(move |change: GateChange| {
        publish(
            events.as_ref(),
            event_names::DECISION_CHANGED,
            &DecisionChangedEvent::from(&change),
        );
    })
}
