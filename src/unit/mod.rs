//! Unit model for crawl targets and their fetch outcomes
//!
//! This module provides the in-memory representation of a crawl target.
//!
//! # Components
//!
//! - `ResourceDescriptor`: The static request description (URL and group tags)
//! - `FetchOutcome`: The measured result of fetching a descriptor
//! - `CrawlerUnit`: A descriptor paired with its outcome, the object tests run against

mod descriptor;
mod outcome;

// Re-export main types
pub use descriptor::ResourceDescriptor;
pub use outcome::FetchOutcome;

/// A single crawl target paired with its fetch outcome
///
/// Units are only constructed once the fetch for their descriptor has
/// completed, so handlers never observe a partial unit.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlerUnit {
    /// The descriptor that was fetched
    pub request: ResourceDescriptor,

    /// The outcome of the fetch
    pub response: FetchOutcome,
}

impl CrawlerUnit {
    /// Creates a new unit from a descriptor and its outcome
    pub fn new(request: ResourceDescriptor, response: FetchOutcome) -> Self {
        Self { request, response }
    }

    /// Returns the URL this unit was fetched from
    pub fn url(&self) -> &str {
        &self.request.url
    }

    /// Returns true if the unit's descriptor carries the given group tag
    pub fn in_group(&self, group: &str) -> bool {
        self.request.in_group(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_accessors() {
        let unit = CrawlerUnit::new(
            ResourceDescriptor::new("https://example.com/").with_group("home"),
            FetchOutcome::response(200, 12.5),
        );

        assert_eq!(unit.url(), "https://example.com/");
        assert!(unit.in_group("home"));
        assert!(!unit.in_group("blog"));
        assert_eq!(unit.response.status_code(), Some(200));
    }
}
