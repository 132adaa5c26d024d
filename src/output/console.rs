//! Console report rendering
//!
//! Prints one line per entry as it arrives, followed by the failing tests of
//! that entry, and a summary line once the crawl is over.

use crate::crawler::CrawlEntry;
use crate::output::stats::RunSummary;
use crate::output::traits::{ReportResult, Reporter};
use std::io::{self, Write};

/// Writes human-readable results to a terminal or any writer
pub struct ConsoleReporter {
    out: Box<dyn Write + Send>,
    summary: RunSummary,
}

impl ConsoleReporter {
    /// Creates a reporter that prints to stdout
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Creates a reporter that prints to the given writer
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            summary: RunSummary::new(),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn start(&mut self) -> ReportResult<()> {
        self.summary = RunSummary::new();
        writeln!(self.out, "Crawling...")?;
        Ok(())
    }

    fn report(&mut self, entry: &CrawlEntry) -> ReportResult<()> {
        self.summary.record(entry);
        writeln!(self.out, "{}", format_entry(entry))?;
        Ok(())
    }

    fn stop(&mut self) -> ReportResult<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", format_summary(&self.summary))?;
        self.out.flush()?;
        Ok(())
    }
}

/// Formats one entry: a status line plus one line per failure
pub fn format_entry(entry: &CrawlEntry) -> String {
    let marker = if entry.has_failure() { "✗" } else { "✓" };
    let failed = entry.results.failures().count();

    let mut text = format!(
        "{} {} ({} passed, {} failed)",
        marker,
        entry.subject,
        entry.results.len() - failed,
        failed
    );

    for (description, message) in entry.results.failures() {
        text.push_str(&format!("\n    - {}: {}", description, message));
    }

    text
}

/// Formats the final summary line
pub fn format_summary(summary: &RunSummary) -> String {
    format!(
        "{} units, {} tests: {} passed, {} failed ({:.1}% pass rate)",
        summary.units,
        summary.tests,
        summary.passed,
        summary.failed,
        summary.pass_rate()
    )
}
