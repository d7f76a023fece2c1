//! Errors reported by query sources.

use thiserror::Error;

/// Result type for source fetches.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors a store-status or catalog source can return.
///
/// The gate never sees these directly; they reach it as a failed query.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport failure (connection refused, timeout, ...).
    #[error("request to '{url}' failed: {message}")]
    Request { url: String, message: String },

    /// Server answered with a non-success status code.
    #[error("'{url}' returned HTTP {status}")]
    Http { url: String, status: u16 },

    /// Body did not match the expected payload shape.
    #[error("unexpected payload from '{url}': {message}")]
    Decode { url: String, message: String },
}
