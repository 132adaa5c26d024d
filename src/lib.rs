//! crawl-probe: concurrent crawl-and-test engine
//!
//! This crate fetches a fixed set of URLs with bounded concurrency, runs
//! registered tests against every fetched unit and against the complete unit
//! set, and streams the results to report renderers.

pub mod checks;
pub mod config;
pub mod crawler;
pub mod output;
pub mod testing;
pub mod transport;
pub mod unit;

use thiserror::Error;

/// Main error type for crawl-probe operations
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] transport::TransportError),

    #[error("Report error: {0}")]
    Report(#[from] output::ReportError),

    #[error("Crawl setup failed: {0}")]
    Setup(String),

    /// At least one test failed. Raised only after every reporter stopped.
    #[error("Analysis failed: {0}")]
    FailedAnalysis(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read crawl file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in crawl file: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawl-probe operations
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlEntry, CrawlStream, Crawler, Subject};
pub use testing::{TestContext, TestResult, TestResultMap};
pub use transport::{HttpTransport, Transport};
pub use unit::{CrawlerUnit, FetchOutcome, ResourceDescriptor};
