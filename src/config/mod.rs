//! Configuration module for crawl-probe
//!
//! This module handles loading, parsing, and validating TOML crawl files.
//! A crawl file lists the resources to fetch, the transport settings, and
//! the declarative checks to run against each fetched unit.
//!
//! # Example
//!
//! ```no_run
//! use crawl_probe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawling {} resources", config.resources.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CheckEntry, CheckScope, Config, CrawlerConfig, TransportConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate_resources;
