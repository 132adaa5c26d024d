//! Crawler module for the concurrent crawl-and-test engine
//!
//! This module contains the core crawling logic, including:
//! - Bounded-concurrency fetch scheduling over a fixed resource set
//! - Running per-unit tests as each fetch completes
//! - Running cross-unit tests once every unit is available
//! - Streaming results to consumers with backpressure

mod scheduler;
mod stream;

pub use scheduler::Crawler;
pub use stream::{CrawlEntry, CrawlStream, Subject};

use crate::testing::TestContext;
use crate::transport::Transport;
use crate::unit::ResourceDescriptor;
use crate::Result;
use std::sync::Arc;

/// Starts a crawl of `resources` with at most `concurrency` fetches in flight
///
/// This is the main entry point for running tests against a resource set.
/// Setup problems (invalid concurrency, malformed or duplicate URLs, no
/// async runtime) are returned immediately and no stream is opened.
///
/// # Arguments
///
/// * `context` - The registered tests
/// * `transport` - The fetch capability
/// * `resources` - The resources to crawl
/// * `concurrency` - Maximum number of fetches in flight
///
/// # Returns
///
/// * `Ok(CrawlStream)` - The lazy result sequence
/// * `Err(ProbeError)` - Setup failed
pub fn crawl(
    context: Arc<TestContext>,
    transport: Arc<dyn Transport>,
    resources: Vec<ResourceDescriptor>,
    concurrency: usize,
) -> Result<CrawlStream> {
    Crawler::new(context, transport).crawl(resources, concurrency)
}
