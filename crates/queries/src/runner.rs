//! Query runner - owns one fetch loop and publishes lifecycle snapshots.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use storefront_events::{event_names, publish, EventBusRef, NullEventBus, QuerySettledEvent};
use storefront_gate::{
    CatalogSource, CatalogTree, QueryState, SourceResult, StoreStatusRecord, StoreStatusSource,
};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default number of extra attempts after a failed fetch.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Query names used in logs and events.
pub const STORE_STATUS_QUERY: &str = "store_status";
pub const CATALOG_QUERY: &str = "catalog";

/// Retry and refetch policy for a query.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Extra attempts after the first failure before publishing `Failed`.
    pub retries: u32,
    /// Pause between attempts.
    pub retry_delay: Duration,
    /// Refetch on a fixed interval once settled. `None` disables polling.
    pub refetch_interval: Option<Duration>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            refetch_interval: None,
        }
    }
}

/// Builder for a background query task.
pub struct QueryRunner {
    name: String,
    config: QueryConfig,
    events: EventBusRef,
}

impl QueryRunner {
    pub fn new(name: impl Into<String>, config: QueryConfig) -> Self {
        Self {
            name: name.into(),
            config,
            events: Arc::new(NullEventBus),
        }
    }

    /// Publish `query:settled` events on this bus.
    pub fn with_events(mut self, events: EventBusRef) -> Self {
        self.events = events;
        self
    }

    /// Spawn the fetch loop. Must be called inside a tokio runtime.
    ///
    /// The query starts `Pending`. A refetch never moves a settled query
    /// back to `Pending`; only the settled outcome is published.
    pub fn spawn<T, F, Fut>(self, fetch: F) -> QueryHandle<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = SourceResult<T>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(QueryState::Pending);
        let refetch = Arc::new(Notify::new());
        let cancel = CancellationToken::new();

        let Self {
            name,
            config,
            events,
        } = self;
        let task_refetch = Arc::clone(&refetch);
        let task_cancel = cancel.clone();
        let task_name = name.clone();

        let handle = tokio::spawn(async move {
            let name = task_name;
            info!(query = %name, "query started");

            loop {
                let (state, attempts) = tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    outcome = fetch_with_retry(&name, &fetch, &config) => outcome,
                };

                publish(
                    events.as_ref(),
                    event_names::QUERY_SETTLED,
                    &QuerySettledEvent {
                        query: name.clone(),
                        state: state.label().to_string(),
                        attempts,
                        error: state.error().map(str::to_string),
                        timestamp_ms: chrono::Utc::now().timestamp_millis(),
                    },
                );
                debug!(query = %name, state = state.label(), attempts, "query settled");
                tx.send_replace(state);

                let interval = config.refetch_interval;
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    _ = task_refetch.notified() => {
                        debug!(query = %name, "refetch requested");
                    }
                    _ = sleep_opt(interval) => {
                        debug!(query = %name, "refetch interval elapsed");
                    }
                }
            }

            info!(query = %name, "query stopped");
        });

        QueryHandle {
            name,
            rx,
            refetch,
            cancel,
            handle,
        }
    }

    /// Spawn the store-status query over a source.
    pub fn spawn_status(
        self,
        source: Arc<dyn StoreStatusSource>,
    ) -> QueryHandle<Vec<StoreStatusRecord>> {
        self.spawn(move || {
            let source = Arc::clone(&source);
            async move { source.fetch_status().await }
        })
    }

    /// Spawn the catalog query over a source.
    pub fn spawn_catalog(self, source: Arc<dyn CatalogSource>) -> QueryHandle<CatalogTree> {
        self.spawn(move || {
            let source = Arc::clone(&source);
            async move { source.fetch_catalog().await }
        })
    }
}

async fn fetch_with_retry<T, F, Fut>(
    name: &str,
    fetch: &F,
    config: &QueryConfig,
) -> (QueryState<T>, u32)
where
    F: Fn() -> Fut,
    Fut: Future<Output = SourceResult<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match fetch().await {
            Ok(data) => return (QueryState::Ready(data), attempt),
            Err(e) if attempt > config.retries => {
                warn!(query = name, attempt, "query failed: {}", e);
                return (QueryState::Failed(e.to_string()), attempt);
            }
            Err(e) => {
                warn!(query = name, attempt, "fetch failed, retrying: {}", e);
                tokio::time::sleep(config.retry_delay).await;
            }
        }
    }
}

async fn sleep_opt(interval: Option<Duration>) {
    match interval {
        Some(d) => tokio::time::sleep(d).await,
        None => std::future::pending().await,
    }
}

/// Handle to a running query.
pub struct QueryHandle<T> {
    name: String,
    rx: watch::Receiver<QueryState<T>>,
    refetch: Arc<Notify>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl<T: Clone> QueryHandle<T> {
    /// Snapshot of the current lifecycle state.
    pub fn current(&self) -> QueryState<T> {
        self.rx.borrow().clone()
    }
}

impl<T> QueryHandle<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subscribe to lifecycle snapshots.
    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.rx.clone()
    }

    /// Ask for a new fetch. Coalesces with a fetch already queued.
    pub fn refetch(&self) {
        self.refetch.notify_one();
    }

    /// Stop the fetch loop. In-flight results are discarded.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl<T> Drop for QueryHandle<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use storefront_gate::SourceError;

    fn flaky(
        failures: u32,
    ) -> (
        Arc<AtomicU32>,
        impl Fn() -> std::future::Ready<SourceResult<u32>>,
    ) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let fetch = move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if n <= failures {
                Err(SourceError::Request {
                    url: "http://api/flaky".into(),
                    message: format!("attempt {n}"),
                })
            } else {
                Ok(n)
            })
        };
        (calls, fetch)
    }

    fn fast_config(retries: u32) -> QueryConfig {
        QueryConfig {
            retries,
            retry_delay: Duration::from_millis(5),
            refetch_interval: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_with_retry_recovers() {
        let (calls, fetch) = flaky(2);
        let (state, attempts) = fetch_with_retry("test", &fetch, &fast_config(3)).await;
        assert_eq!(state, QueryState::Ready(3));
        assert_eq!(attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fetch_with_retry_gives_up() {
        let (calls, fetch) = flaky(10);
        let (state, attempts) = fetch_with_retry("test", &fetch, &fast_config(1)).await;
        assert!(state.is_error());
        assert_eq!(state.error(), Some("request to 'http://api/flaky' failed: attempt 2"));
        assert_eq!(attempts, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_retries_fails_on_first_error() {
        let (_calls, fetch) = flaky(1);
        let (state, attempts) = fetch_with_retry("test", &fetch, &fast_config(0)).await;
        assert!(state.is_error());
        assert_eq!(attempts, 1);
    }
}
