/// Fetch outcome definitions
///
/// An outcome is produced exactly once per descriptor. Ordinary HTTP error
/// statuses are valid responses; only transport-level faults become `Failed`.
use serde::Serialize;

/// The measured result of fetching one resource
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// The resource responded (any status code)
    Response {
        /// HTTP status code
        status_code: u16,

        /// Time until the response headers arrived (milliseconds)
        backend_time_ms: f64,
    },

    /// The fetch itself failed (connection refused, timeout, DNS failure)
    Failed {
        /// Error description
        error: String,
    },
}

impl FetchOutcome {
    /// Creates a response outcome
    pub fn response(status_code: u16, backend_time_ms: f64) -> Self {
        Self::Response {
            status_code,
            backend_time_ms,
        }
    }

    /// Creates a failure outcome
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    /// Returns the status code, if the resource responded
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response { status_code, .. } => Some(*status_code),
            Self::Failed { .. } => None,
        }
    }

    /// Returns the backend time in milliseconds, if the resource responded
    pub fn backend_time_ms(&self) -> Option<f64> {
        match self {
            Self::Response {
                backend_time_ms, ..
            } => Some(*backend_time_ms),
            Self::Failed { .. } => None,
        }
    }

    /// Returns the transport error, if the fetch failed
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            Self::Response { .. } => None,
        }
    }

    /// Returns true if the fetch failed at the transport level
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_accessors() {
        let outcome = FetchOutcome::response(404, 31.0);
        assert_eq!(outcome.status_code(), Some(404));
        assert_eq!(outcome.backend_time_ms(), Some(31.0));
        assert!(outcome.error().is_none());
        assert!(!outcome.is_failed());
    }

    #[test]
    fn test_failed_accessors() {
        let outcome = FetchOutcome::failed("Connection refused");
        assert_eq!(outcome.status_code(), None);
        assert_eq!(outcome.backend_time_ms(), None);
        assert_eq!(outcome.error(), Some("Connection refused"));
        assert!(outcome.is_failed());
    }

    #[test]
    fn test_serializes_with_tag() {
        let value = serde_json::to_value(FetchOutcome::response(200, 5.0)).unwrap();
        assert_eq!(value["outcome"], "response");
        assert_eq!(value["status_code"], 200);
    }
}
