//! Source traits for the two upstream queries.
//!
//! These traits abstract the transport, allowing the gate and the query
//! runner to be exercised without a network.

use crate::error::SourceResult;
use crate::status::{CatalogTree, StoreStatus, StoreStatusRecord};
use async_trait::async_trait;

/// Source of the store operating status.
#[async_trait]
pub trait StoreStatusSource: Send + Sync {
    /// Fetch the status payload. Only the first record matters to the gate.
    async fn fetch_status(&self) -> SourceResult<Vec<StoreStatusRecord>>;
}

/// Source of the category catalog tree.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the category tree.
    async fn fetch_catalog(&self) -> SourceResult<CatalogTree>;
}

/// Null implementation for testing or offline runs: open store, empty catalog.
pub struct NullSource;

#[async_trait]
impl StoreStatusSource for NullSource {
    async fn fetch_status(&self) -> SourceResult<Vec<StoreStatusRecord>> {
        Ok(vec![StoreStatusRecord::new(StoreStatus::Open)])
    }
}

#[async_trait]
impl CatalogSource for NullSource {
    async fn fetch_catalog(&self) -> SourceResult<CatalogTree> {
        Ok(CatalogTree::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_source_reports_open_store() {
        let records = NullSource.fetch_status().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, StoreStatus::Open);

        let catalog = NullSource.fetch_catalog().await.unwrap();
        assert_eq!(catalog.node_count(), 0);
    }
}
