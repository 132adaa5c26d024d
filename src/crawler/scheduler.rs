//! Scheduler for the crawl work queue
//!
//! This module handles:
//! - Seeding the work queue from the resource set
//! - Keeping at most `concurrency` fetch tasks in flight
//! - Running per-unit tests as each fetch completes
//! - Buffering units for cross-unit tests
//! - Cooperative cancellation when the consumer stops draining
//!
//! The work queue and the in-flight set are owned by a single producer task
//! and never touched by fetch tasks, so no locking is needed.

use crate::config::validate_resources;
use crate::crawler::stream::{CrawlEntry, CrawlStream};
use crate::testing::{TestContext, TestResultMap};
use crate::transport::Transport;
use crate::unit::{CrawlerUnit, FetchOutcome, ResourceDescriptor};
use crate::{ProbeError, Result};
use futures::FutureExt;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

/// Runs crawls over a resource set with a fixed transport and test registry
#[derive(Clone)]
pub struct Crawler {
    context: Arc<TestContext>,
    transport: Arc<dyn Transport>,
}

impl Crawler {
    /// Creates a new crawler
    ///
    /// # Arguments
    ///
    /// * `context` - The registered tests
    /// * `transport` - The fetch capability
    pub fn new(context: Arc<TestContext>, transport: Arc<dyn Transport>) -> Self {
        Self { context, transport }
    }

    /// Starts a crawl and returns its result stream
    ///
    /// Must be called from within a Tokio runtime. The crawl starts
    /// immediately; entries are buffered up to `concurrency` deep before the
    /// scheduler waits for the consumer.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlStream)` - The lazy result sequence
    /// * `Err(ProbeError::Setup)` - The crawl could not be set up
    pub fn crawl(
        &self,
        resources: Vec<ResourceDescriptor>,
        concurrency: usize,
    ) -> Result<CrawlStream> {
        if concurrency < 1 {
            return Err(ProbeError::Setup(format!(
                "concurrency must be at least 1, got {}",
                concurrency
            )));
        }

        validate_resources(&resources).map_err(|e| ProbeError::Setup(e.to_string()))?;

        let runtime = Handle::try_current()
            .map_err(|e| ProbeError::Setup(format!("No async runtime available: {}", e)))?;

        let (sender, receiver) = mpsc::channel(concurrency);
        let (demand_sender, demand) = watch::channel(0);
        let scheduler = Scheduler {
            context: self.context.clone(),
            transport: self.transport.clone(),
            queue: VecDeque::from(resources),
            concurrency,
            sender,
            demand,
        };

        let producer = runtime.spawn(scheduler.run());
        Ok(CrawlStream::new(receiver, producer, demand_sender))
    }
}

/// Producer side of a single crawl
struct Scheduler {
    context: Arc<TestContext>,
    transport: Arc<dyn Transport>,
    queue: VecDeque<ResourceDescriptor>,
    concurrency: usize,
    sender: mpsc::Sender<CrawlEntry>,
    /// Number of entries the consumer had received when it last found the
    /// channel empty
    demand: watch::Receiver<usize>,
}

impl Scheduler {
    /// Runs the crawl loop until the queue is drained or the consumer leaves
    ///
    /// This method:
    /// 1. Fills free slots from the work queue
    /// 2. Waits for the next fetch task to complete
    /// 3. Emits its entry and buffers its unit
    /// 4. Runs cross-unit tests once every unit is in and the consumer asks
    ///    for more, unless cancelled
    async fn run(mut self) {
        let total = self.queue.len();
        let start_time = Instant::now();
        let mut in_flight = JoinSet::new();
        let mut units: Vec<CrawlerUnit> = Vec::with_capacity(total);
        let mut emitted = 0;
        let mut cancelled = false;
        let mut incomplete = false;

        tracing::info!(
            "Starting crawl of {} resources (concurrency {})",
            total,
            self.concurrency
        );

        loop {
            while !cancelled && in_flight.len() < self.concurrency {
                if self.sender.is_closed() {
                    cancelled = true;
                    break;
                }

                let Some(descriptor) = self.queue.pop_front() else {
                    break;
                };

                tracing::debug!("Scheduling fetch: {}", descriptor.url);
                in_flight.spawn(test_resource(
                    descriptor,
                    self.transport.clone(),
                    self.context.clone(),
                ));
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            let (unit, results) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tracing::error!("Fetch task failed: {}", e);
                    incomplete = true;
                    continue;
                }
            };

            if !cancelled {
                let entry = CrawlEntry::resource(unit.url(), results);
                if self.sender.send(entry).await.is_err() {
                    tracing::info!(
                        "Consumer stopped reading, waiting for {} in-flight fetches",
                        in_flight.len()
                    );
                    cancelled = true;
                } else {
                    emitted += 1;
                }
            }

            units.push(unit);
        }

        if cancelled {
            tracing::info!(
                "Crawl stopped early after {} of {} resources, skipping cross-unit tests",
                units.len(),
                total
            );
            return;
        }

        if incomplete {
            tracing::warn!(
                "{} of {} units missing, skipping cross-unit tests",
                total - units.len(),
                total
            );
        } else if self.context.has_cross_unit_handlers() {
            if !self.wait_for_demand(emitted).await {
                tracing::info!("Consumer stopped before the cross-unit results, skipping them");
                return;
            }

            let results = self.context.test_units(&units);
            if !results.is_empty() && self.sender.send(CrawlEntry::all_units(results)).await.is_err() {
                tracing::debug!("Consumer left before the cross-unit results were read");
            }
        }

        tracing::info!(
            "Crawl completed: {} resources in {:?}",
            units.len(),
            start_time.elapsed()
        );
    }

    /// Waits until the consumer has read every per-unit entry and polled
    /// again, returning false if it stopped reading first
    async fn wait_for_demand(&mut self, emitted: usize) -> bool {
        tokio::select! {
            demanded = self.demand.wait_for(|received| *received >= emitted) => demanded.is_ok(),
            _ = self.sender.closed() => false,
        }
    }
}

/// Fetches one resource and runs the per-unit tests against it
///
/// Transport faults (and transport panics) are recorded as a failed outcome
/// so the unit still reaches the handlers.
async fn test_resource(
    descriptor: ResourceDescriptor,
    transport: Arc<dyn Transport>,
    context: Arc<TestContext>,
) -> (CrawlerUnit, TestResultMap) {
    let started = Instant::now();

    let response = match AssertUnwindSafe(transport.fetch(&descriptor))
        .catch_unwind()
        .await
    {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            tracing::warn!("Fetch failed for {}: {}", descriptor.url, e);
            FetchOutcome::failed(e.to_string())
        }
        Err(_) => {
            tracing::error!("Transport panicked while fetching {}", descriptor.url);
            FetchOutcome::failed("transport panicked")
        }
    };

    let unit = CrawlerUnit::new(descriptor, response);
    let results = context.test_unit(&unit);

    tracing::debug!(
        "Tested {} in {:?}: {} results, {} failed",
        unit.url(),
        started.elapsed(),
        results.len(),
        results.failures().count()
    );

    (unit, results)
}
