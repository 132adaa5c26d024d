//! Transport module for fetching crawl targets
//!
//! This module defines the capability contract the crawl engine depends on,
//! plus the HTTP implementation used by the command line.
//!
//! A transport performs exactly one fetch per descriptor with no implicit
//! retries. Non-2xx statuses are returned as ordinary responses; only
//! transport-level faults are errors.

mod http;

pub use http::{build_http_client, HttpTransport};

use crate::unit::{FetchOutcome, ResourceDescriptor};
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a transport when a fetch cannot complete
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },

    #[error("Invalid transport configuration: {0}")]
    Config(String),
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Capability contract for fetching one resource
///
/// Implementations must be shareable across the scheduler's fetch tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches a single resource and normalizes the response
    ///
    /// # Arguments
    ///
    /// * `descriptor` - The resource to fetch
    ///
    /// # Returns
    ///
    /// * `Ok(FetchOutcome)` - The resource responded (any status code)
    /// * `Err(TransportError)` - The fetch failed at the transport level
    async fn fetch(&self, descriptor: &ResourceDescriptor) -> TransportResult<FetchOutcome>;
}
