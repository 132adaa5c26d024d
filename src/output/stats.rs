//! Aggregate counts over a crawl's emitted entries

use crate::crawler::{CrawlEntry, Subject};
use serde::Serialize;

/// Summary of a crawl's results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Number of per-unit entries seen
    pub units: u64,

    /// Number of test results recorded (per-unit and cross-unit)
    pub tests: u64,

    /// Number of passing results
    pub passed: u64,

    /// Number of failing results
    pub failed: u64,

    /// Number of entries with at least one failure
    pub failing_subjects: u64,
}

impl RunSummary {
    /// Creates a new empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one emitted entry to the counts
    pub fn record(&mut self, entry: &CrawlEntry) {
        if matches!(entry.subject, Subject::Resource(_)) {
            self.units += 1;
        }

        for (_, result) in entry.results.iter() {
            self.tests += 1;
            if result.is_fail() {
                self.failed += 1;
            } else {
                self.passed += 1;
            }
        }

        if entry.has_failure() {
            self.failing_subjects += 1;
        }
    }

    /// Returns true if any result failed
    pub fn has_failure(&self) -> bool {
        self.failed > 0
    }

    /// Returns the pass rate as a percentage
    pub fn pass_rate(&self) -> f64 {
        if self.tests == 0 {
            return 0.0;
        }
        (self.passed as f64 / self.tests as f64) * 100.0
    }
}
