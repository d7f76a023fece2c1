//! Store availability gate for the storefront shell.
//!
//! This crate decides which top-level screen the shell mounts, based on two
//! independently fetched queries:
//! - Store status (open / maintenance / off)
//! - Category catalog (only its loading state matters here)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  decision.rs - GateDecision, LoadingRule, resolution (pure) │
//! │  query.rs    - QueryState lifecycle                         │
//! │  status.rs   - Store status and catalog payloads            │
//! │  provider.rs - Traits for the upstream sources              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Application Layer                          │
//! │  watcher.rs - Subscribes to both queries, pushes decisions  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use storefront_gate::{GateWatcher, LoadingRule};
//! use std::sync::Arc;
//!
//! let mut watcher = GateWatcher::new(LoadingRule::default(), status_rx, catalog_rx);
//! watcher.start(Arc::new(|change| {
//!     println!("Screen: {}", change.decision);
//! }));
//! ```

mod decision;
mod error;
mod provider;
mod query;
mod state;
mod status;
mod watcher;

// Re-export main types
pub use decision::{resolve_decision, AvailabilityGate, GateDecision, GateInputs, LoadingRule};
pub use error::{SourceError, SourceResult};
pub use provider::{CatalogSource, NullSource, StoreStatusSource};
pub use query::QueryState;
pub use state::GateChange;
pub use status::{leading_status, CatalogTree, CategoryNode, StoreStatus, StoreStatusRecord};
pub use watcher::{CatalogReceiver, GateCallback, GateWatcher, StatusReceiver};
