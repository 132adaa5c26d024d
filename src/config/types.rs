use crate::unit::ResourceDescriptor;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for a crawl file
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(rename = "resource", default)]
    pub resources: Vec<ResourceDescriptor>,
    #[serde(rename = "check", default)]
    pub checks: Vec<CheckEntry>,
}

/// Crawl scheduling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of requests allowed in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> usize {
    3
}

/// HTTP transport configuration
///
/// The target URL and the timing measurement are not configurable here;
/// they always come from the descriptor and the transport itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransportConfig {
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (milliseconds); no timeout when absent
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Reuse connections between requests
    #[serde(default = "default_true")]
    pub keep_alive: bool,

    /// Follow redirects instead of reporting the 3xx status
    #[serde(default)]
    pub follow_redirects: bool,

    /// Extra headers merged into every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_ms: None,
            keep_alive: true,
            follow_redirects: false,
            headers: BTreeMap::new(),
        }
    }
}

fn default_user_agent() -> String {
    format!("crawl-probe/{}", env!("CARGO_PKG_VERSION"))
}

fn default_true() -> bool {
    true
}

/// Which registry bucket a declarative check is registered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckScope {
    /// Evaluated once per fetched unit
    Each,
    /// Evaluated once against every unit in the crawl
    All,
}

/// A declarative check compiled into a test handler
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CheckEntry {
    /// Stable description used as the result key
    pub description: String,

    /// Per-unit or cross-unit
    pub scope: CheckScope,

    /// Restricts the check to units tagged with this group
    #[serde(default)]
    pub group: Option<String>,

    /// Expected HTTP status code
    #[serde(default)]
    pub expect_status: Option<u16>,

    /// Maximum backend time (per unit for `each`, average for `all`)
    #[serde(default)]
    pub max_backend_time_ms: Option<f64>,

    /// Require the fetch to succeed at the transport level (`each` only)
    #[serde(default)]
    pub reachable: Option<bool>,
}
