/// Test result definitions
///
/// Results are keyed by handler description. Reporters rely on the same
/// description appearing across crawls, so descriptions are stable keys.
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of running one handler against one unit or one unit set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestResult {
    /// The handler returned normally
    Pass,

    /// The handler returned an error or panicked
    Fail {
        /// The stringified error
        message: String,
    },
}

impl TestResult {
    /// Creates a failing result
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail {
            message: message.into(),
        }
    }

    /// Returns true if this is a passing result
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Returns true if this is a failing result
    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail { .. })
    }

    /// Returns the failure message, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Fail { message } => Some(message),
            Self::Pass => None,
        }
    }
}

/// Results for one unit (or the whole crawl), keyed by handler description
///
/// Entries iterate in insertion order, which is handler registration order.
/// Inserting an existing description replaces its result in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestResultMap {
    entries: Vec<(String, TestResult)>,
}

impl TestResultMap {
    /// Creates an empty result map
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the result for a description
    pub fn insert(&mut self, description: impl Into<String>, result: TestResult) {
        let description = description.into();
        match self.entries.iter_mut().find(|(d, _)| *d == description) {
            Some(entry) => entry.1 = result,
            None => self.entries.push((description, result)),
        }
    }

    /// Gets the result for a description
    pub fn get(&self, description: &str) -> Option<&TestResult> {
        self.entries
            .iter()
            .find(|(d, _)| d == description)
            .map(|(_, r)| r)
    }

    /// Iterates over `(description, result)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TestResult)> {
        self.entries.iter().map(|(d, r)| (d.as_str(), r))
    }

    /// Iterates over failing entries only
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(d, r)| match r {
            TestResult::Fail { message } => Some((d.as_str(), message.as_str())),
            TestResult::Pass => None,
        })
    }

    /// Returns the number of recorded results
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no results were recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if any recorded result is a failure
    pub fn has_failure(&self) -> bool {
        self.entries.iter().any(|(_, r)| r.is_fail())
    }
}

impl<S: Into<String>> FromIterator<(S, TestResult)> for TestResultMap {
    fn from_iter<I: IntoIterator<Item = (S, TestResult)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (description, result) in iter {
            map.insert(description, result);
        }
        map
    }
}

impl Serialize for TestResultMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (description, result) in &self.entries {
            map.serialize_entry(description, result)?;
        }
        map.end()
    }
}

/// Results for every unit of a crawl, keyed by URL
pub type EachResultMap = BTreeMap<String, TestResultMap>;
