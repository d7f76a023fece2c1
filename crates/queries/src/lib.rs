//! Upstream queries for the storefront shell.
//!
//! Each query runs as its own tokio task and publishes `QueryState`
//! snapshots over a `watch` channel, which the gate watcher subscribes to.
//! The two queries never wait on each other.

mod http;
mod runner;

pub use http::{join_url, parse_status_body, HttpCatalogSource, HttpStoreStatusSource};
pub use runner::{
    QueryConfig, QueryHandle, QueryRunner, CATALOG_QUERY, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY,
    STORE_STATUS_QUERY,
};
