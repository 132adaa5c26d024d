//! JSON report rendering
//!
//! Buffers every entry and writes a single JSON document when the crawl
//! stops. The file is created on `start` so an unwritable path fails before
//! any fetch result is lost.

use crate::crawler::{CrawlEntry, Subject};
use crate::output::stats::RunSummary;
use crate::output::traits::{ReportError, ReportResult, Reporter};
use crate::testing::{EachResultMap, TestResultMap};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Shape of the written document
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config_hash: Option<&'a str>,
    summary: &'a RunSummary,
    results: &'a EachResultMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    all_units: Option<&'a TestResultMap>,
}

/// Writes all results to a JSON file
pub struct JsonReporter {
    path: PathBuf,
    config_hash: Option<String>,
    file: Option<File>,
    results: EachResultMap,
    all_units: Option<TestResultMap>,
    summary: RunSummary,
}

impl JsonReporter {
    /// Creates a reporter writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config_hash: None,
            file: None,
            results: EachResultMap::new(),
            all_units: None,
            summary: RunSummary::new(),
        }
    }

    /// Embeds the crawl file hash in the report
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }
}

impl Reporter for JsonReporter {
    fn start(&mut self) -> ReportResult<()> {
        self.file = Some(File::create(&self.path)?);
        self.results.clear();
        self.all_units = None;
        self.summary = RunSummary::new();
        Ok(())
    }

    fn report(&mut self, entry: &CrawlEntry) -> ReportResult<()> {
        self.summary.record(entry);
        match &entry.subject {
            Subject::Resource(url) => {
                self.results.insert(url.clone(), entry.results.clone());
            }
            Subject::AllUnits => self.all_units = Some(entry.results.clone()),
        }
        Ok(())
    }

    fn stop(&mut self) -> ReportResult<()> {
        let file = self.file.take().ok_or(ReportError::NotStarted)?;

        let report = JsonReport {
            generated_at: Utc::now(),
            config_hash: self.config_hash.as_deref(),
            summary: &self.summary,
            results: &self.results,
            all_units: self.all_units.as_ref(),
        };

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &report)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::info!("JSON report written to {}", self.path.display());
        Ok(())
    }
}
