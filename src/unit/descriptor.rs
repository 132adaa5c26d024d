/// Resource descriptor definitions
///
/// A descriptor is the static input for one crawl target. It is defined before
/// the crawl starts and never changes afterwards.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Describes one resource to fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// The URL to fetch
    pub url: String,

    /// Group tags used to scope handlers
    #[serde(default)]
    pub groups: BTreeSet<String>,
}

impl ResourceDescriptor {
    /// Creates a descriptor with no group tags
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            groups: BTreeSet::new(),
        }
    }

    /// Adds a group tag, returning the descriptor for chaining
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.insert(group.into());
        self
    }

    /// Returns true if this descriptor is tagged with `group`
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_membership() {
        let descriptor = ResourceDescriptor::new("https://example.com/a")
            .with_group("docs")
            .with_group("public");

        assert!(descriptor.in_group("docs"));
        assert!(descriptor.in_group("public"));
        assert!(!descriptor.in_group("admin"));
    }

    #[test]
    fn test_no_groups_by_default() {
        let descriptor = ResourceDescriptor::new("https://example.com/");
        assert!(descriptor.groups.is_empty());
        assert!(!descriptor.in_group(""));
    }

    #[test]
    fn test_display_is_url() {
        let descriptor = ResourceDescriptor::new("https://example.com/x");
        assert_eq!(descriptor.to_string(), "https://example.com/x");
    }
}
