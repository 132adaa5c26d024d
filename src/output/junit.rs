//! JUnit XML report rendering
//!
//! Each entry becomes a `<testsuite>` named after its subject, and each
//! handler result a `<testcase>` named after its description. The document is
//! written when the crawl stops.

use crate::crawler::CrawlEntry;
use crate::output::traits::{ReportError, ReportResult, Reporter};
use chrono::Utc;
use quick_xml::escape::escape;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Writes all results to a JUnit XML file
pub struct JUnitReporter {
    path: PathBuf,
    file: Option<File>,
    entries: Vec<CrawlEntry>,
}

impl JUnitReporter {
    /// Creates a reporter writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
            entries: Vec::new(),
        }
    }
}

impl Reporter for JUnitReporter {
    fn start(&mut self) -> ReportResult<()> {
        self.file = Some(File::create(&self.path)?);
        self.entries.clear();
        Ok(())
    }

    fn report(&mut self, entry: &CrawlEntry) -> ReportResult<()> {
        self.entries.push(entry.clone());
        Ok(())
    }

    fn stop(&mut self) -> ReportResult<()> {
        let file = self.file.take().ok_or(ReportError::NotStarted)?;
        let xml = format_junit(&self.entries, &Utc::now().to_rfc3339());

        let mut writer = BufWriter::new(file);
        writer.write_all(xml.as_bytes())?;
        writer.flush()?;

        tracing::info!("JUnit report written to {}", self.path.display());
        Ok(())
    }
}

/// Formats entries as a JUnit XML document
pub fn format_junit(entries: &[CrawlEntry], timestamp: &str) -> String {
    let tests: usize = entries.iter().map(|e| e.results.len()).sum();
    let failures: usize = entries.iter().map(|e| e.results.failures().count()).sum();

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<testsuites name=\"crawl-probe\" tests=\"{}\" failures=\"{}\" timestamp=\"{}\">\n",
        tests,
        failures,
        escape_xml(timestamp)
    ));

    for entry in entries {
        let subject = escape_xml(&entry.subject.to_string());
        xml.push_str(&format!(
            "  <testsuite name=\"{}\" tests=\"{}\" failures=\"{}\">\n",
            subject,
            entry.results.len(),
            entry.results.failures().count()
        ));

        for (description, result) in entry.results.iter() {
            let name = escape_xml(description);
            match result.message() {
                None => xml.push_str(&format!(
                    "    <testcase name=\"{}\" classname=\"{}\"/>\n",
                    name, subject
                )),
                Some(message) => {
                    let message = escape_xml(message);
                    xml.push_str(&format!(
                        "    <testcase name=\"{}\" classname=\"{}\">\n",
                        name, subject
                    ));
                    xml.push_str(&format!(
                        "      <failure message=\"{}\">{}</failure>\n",
                        message, message
                    ));
                    xml.push_str("    </testcase>\n");
                }
            }
        }

        xml.push_str("  </testsuite>\n");
    }

    xml.push_str("</testsuites>\n");
    xml
}

/// Escapes text for use in XML attributes and content
///
/// Characters XML 1.0 cannot represent at all (most C0 controls, such as the
/// ANSI escapes in some transport errors) are replaced with U+FFFD.
fn escape_xml(text: &str) -> String {
    let valid: String = text
        .chars()
        .map(|c| if is_xml_char(c) { c } else { char::REPLACEMENT_CHARACTER })
        .collect();
    escape(valid.as_str()).into_owned()
}

/// Returns true if `c` is allowed in an XML 1.0 document
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestResult, TestResultMap};
    use tempfile::tempdir;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
        assert_eq!(escape_xml("plain"), "plain");
    }

    #[test]
    fn test_escape_xml_replaces_control_characters() {
        assert_eq!(
            escape_xml("connect error: \u{1b}[31mrefused\u{1b}[0m\u{0}"),
            "connect error: \u{FFFD}[31mrefused\u{FFFD}[0m\u{FFFD}"
        );
        assert_eq!(escape_xml("tab\tand\nnewline"), "tab\tand\nnewline");
    }

    #[test]
    fn test_failure_message_with_control_character_is_well_formed() {
        let mut results = TestResultMap::new();
        results.insert("reachable", TestResult::fail("fetch failed: \u{1b}[1mtimeout & <reset>"));

        let xml = format_junit(
            &[CrawlEntry::resource("https://example.com/", results)],
            "2026-01-01T00:00:00+00:00",
        );

        assert!(!xml.contains('\u{1b}'));
        assert!(xml.contains(
            "<failure message=\"fetch failed: \u{FFFD}[1mtimeout &amp; &lt;reset&gt;\">"
        ));

        let mut reader = quick_xml::Reader::from_str(&xml);
        loop {
            match reader.read_event() {
                Ok(quick_xml::events::Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("report is not well-formed: {}", e),
            }
        }
    }

    #[test]
    fn test_format_junit() {
        let mut results = TestResultMap::new();
        results.insert("check-200", TestResult::fail("expected 200, got <404>"));
        results.insert("fast", TestResult::Pass);

        let xml = format_junit(
            &[CrawlEntry::resource("https://example.com/?a=1&b=2", results)],
            "2026-01-01T00:00:00+00:00",
        );

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(xml.contains("<testsuites name=\"crawl-probe\" tests=\"2\" failures=\"1\""));
        assert!(xml.contains(
            "<testsuite name=\"https://example.com/?a=1&amp;b=2\" tests=\"2\" failures=\"1\">"
        ));
        assert!(xml.contains("<failure message=\"expected 200, got &lt;404&gt;\">"));
        assert!(xml.contains(
            "<testcase name=\"fast\" classname=\"https://example.com/?a=1&amp;b=2\"/>"
        ));
        assert!(xml.ends_with("</testsuites>\n"));
    }

    #[test]
    fn test_reporter_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.xml");

        let mut reporter = JUnitReporter::new(&path);
        reporter.start().unwrap();
        reporter
            .report(&CrawlEntry::all_units(TestResultMap::new()))
            .unwrap();
        reporter.stop().unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<testsuite name=\"(all units)\" tests=\"0\" failures=\"0\">"));
    }
}
