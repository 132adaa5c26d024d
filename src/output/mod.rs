//! Output module for rendering crawl results
//!
//! This module handles:
//! - The reporter lifecycle (`start`, `report`, `stop`)
//! - Console, JSON, and JUnit renderers
//! - Driving reporters over a crawl stream and raising analysis failures

mod console;
mod json;
mod junit;
pub mod stats;
mod traits;

pub use console::{format_entry, format_summary, ConsoleReporter};
pub use json::JsonReporter;
pub use junit::{format_junit, JUnitReporter};
pub use stats::RunSummary;
pub use traits::{ReportError, ReportResult, Reporter};

use crate::crawler::CrawlStream;
use crate::{ProbeError, Result};

/// Drains a crawl stream through every reporter
///
/// Reporters are started once, receive every entry in emission order, and
/// are stopped once the stream is exhausted. Only after all reporters have
/// stopped is an analysis failure raised, so output is never cut short by
/// failing tests.
///
/// If a reporter fails, the crawl is cancelled (in-flight fetches finish,
/// nothing new is scheduled), every reporter that was started is still
/// stopped, and the first error is returned.
///
/// # Arguments
///
/// * `stream` - The crawl's result sequence
/// * `reporters` - The renderers to drive
///
/// # Returns
///
/// * `Ok(RunSummary)` - Every test passed
/// * `Err(ProbeError::FailedAnalysis)` - At least one test failed
/// * `Err(ProbeError::Report)` - A reporter failed
pub async fn report_crawl(
    mut stream: CrawlStream,
    reporters: &mut [Box<dyn Reporter>],
) -> Result<RunSummary> {
    let mut summary = RunSummary::new();

    let failed_start = reporters
        .iter_mut()
        .enumerate()
        .find_map(|(index, reporter)| reporter.start().err().map(|e| (index, e)));

    if let Some((started, e)) = failed_start {
        tracing::error!("Reporter failed to start: {}", e);
        stream.cancel().await;
        stop_all(&mut reporters[..started]);
        return Err(e.into());
    }

    while let Some(entry) = stream.next_entry().await {
        summary.record(&entry);

        let failed_report = reporters
            .iter_mut()
            .find_map(|reporter| reporter.report(&entry).err());

        if let Some(e) = failed_report {
            tracing::error!("Reporter failed on {}: {}", entry.subject, e);
            stream.cancel().await;
            stop_all(reporters);
            return Err(e.into());
        }
    }

    if let Some(e) = stop_all(reporters) {
        return Err(e.into());
    }

    if summary.has_failure() {
        return Err(ProbeError::FailedAnalysis(format!(
            "Testing reported {} failures across {} subjects",
            summary.failed, summary.failing_subjects
        )));
    }

    Ok(summary)
}

/// Stops every reporter, returning the first error
///
/// A failing `stop` does not prevent the remaining reporters from stopping.
fn stop_all(reporters: &mut [Box<dyn Reporter>]) -> Option<ReportError> {
    let mut first = None;
    for reporter in reporters.iter_mut() {
        if let Err(e) = reporter.stop() {
            tracing::error!("Reporter failed to stop: {}", e);
            if first.is_none() {
                first = Some(e);
            }
        }
    }
    first
}
