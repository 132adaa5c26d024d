//! Lazy result sequence handed to consumers
//!
//! The scheduler pushes entries into a bounded channel; `CrawlStream` is the
//! receiving half. Dropping or closing the stream is the cancellation signal:
//! the scheduler lets in-flight fetches finish, schedules nothing new, and
//! skips cross-unit handlers.
//!
//! Cross-unit handlers only run once the consumer asks for the entry after
//! the last per-unit one. The stream publishes how many entries it had
//! received each time a poll finds the channel empty.

use crate::testing::TestResultMap;
use futures::{Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// What an emitted entry reports on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    /// Per-unit results for the resource at this URL
    Resource(String),

    /// Cross-unit results for the whole crawl
    AllUnits,
}

impl Subject {
    /// Returns the URL for per-unit entries
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Resource(url) => Some(url),
            Self::AllUnits => None,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource(url) => write!(f, "{}", url),
            Self::AllUnits => write!(f, "(all units)"),
        }
    }
}

/// One `(identifier, results)` pair emitted by a crawl
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlEntry {
    /// The resource (or the whole crawl) the results belong to
    pub subject: Subject,

    /// Results keyed by handler description
    pub results: TestResultMap,
}

impl CrawlEntry {
    /// Creates a per-unit entry
    pub fn resource(url: impl Into<String>, results: TestResultMap) -> Self {
        Self {
            subject: Subject::Resource(url.into()),
            results,
        }
    }

    /// Creates the synthetic cross-unit entry
    pub fn all_units(results: TestResultMap) -> Self {
        Self {
            subject: Subject::AllUnits,
            results,
        }
    }

    /// Returns true if any result in this entry failed
    pub fn has_failure(&self) -> bool {
        self.results.has_failure()
    }
}

/// Single-pass, consumer-driven sequence of crawl entries
///
/// Per-unit entries arrive in fetch-completion order; the cross-unit entry,
/// if any, is always last.
pub struct CrawlStream {
    receiver: mpsc::Receiver<CrawlEntry>,
    producer: Option<JoinHandle<()>>,
    demand: Option<watch::Sender<usize>>,
    received: usize,
}

impl CrawlStream {
    pub(crate) fn new(
        receiver: mpsc::Receiver<CrawlEntry>,
        producer: JoinHandle<()>,
        demand: watch::Sender<usize>,
    ) -> Self {
        Self {
            receiver,
            producer: Some(producer),
            demand: Some(demand),
            received: 0,
        }
    }

    /// Builds a stream over pre-computed entries
    ///
    /// Useful for driving reporters without a live crawl.
    pub fn from_entries(entries: Vec<CrawlEntry>) -> Self {
        let (sender, receiver) = mpsc::channel(entries.len().max(1));
        for entry in entries {
            // Capacity covers every entry, so this cannot fail
            let _ = sender.try_send(entry);
        }
        Self {
            receiver,
            producer: None,
            demand: None,
            received: 0,
        }
    }

    /// Waits for the next entry, or `None` once the crawl has finished
    pub async fn next_entry(&mut self) -> Option<CrawlEntry> {
        self.next().await
    }

    /// Stops the crawl early and waits for in-flight fetches to finish
    ///
    /// Entries already buffered are discarded and cross-unit handlers do not
    /// run.
    pub async fn cancel(mut self) {
        self.receiver.close();
        while self.receiver.recv().await.is_some() {}
        if let Some(producer) = self.producer.take() {
            if let Err(e) = producer.await {
                tracing::error!("Crawl scheduler task failed: {}", e);
            }
        }
    }
}

impl Stream for CrawlStream {
    type Item = CrawlEntry;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.receiver.poll_recv(cx) {
            Poll::Ready(Some(entry)) => {
                this.received += 1;
                Poll::Ready(Some(entry))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => {
                if let Some(demand) = &this.demand {
                    demand.send_replace(this.received);
                }
                Poll::Pending
            }
        }
    }
}

impl fmt::Debug for CrawlStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlStream")
            .field("live", &self.producer.is_some())
            .finish()
    }
}
