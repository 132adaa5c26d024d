//! Reporter trait and error types
//!
//! This module defines the lifecycle every report renderer implements.

use crate::crawler::CrawlEntry;
use thiserror::Error;

/// Errors that can occur during report rendering
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reporter was not started")]
    NotStarted,
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Trait for report renderers
///
/// The runner calls `start` once before the first entry, `report` once per
/// emitted entry in emission order, and `stop` once after the stream is
/// exhausted. The calls bound the reporter's own resources, such as an open
/// output file.
pub trait Reporter: Send {
    /// Prepares the reporter before any entry is reported
    fn start(&mut self) -> ReportResult<()>;

    /// Records one emitted entry
    ///
    /// # Arguments
    ///
    /// * `entry` - The subject and its results
    fn report(&mut self, entry: &CrawlEntry) -> ReportResult<()>;

    /// Finishes the report and releases its resources
    fn stop(&mut self) -> ReportResult<()>;
}
