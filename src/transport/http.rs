//! HTTP transport implementation
//!
//! This module handles all HTTP requests for the crawl engine, including:
//! - Building HTTP clients from the transport configuration
//! - Measuring backend time (time until response headers arrive)
//! - Error classification

use crate::config::TransportConfig;
use crate::transport::{Transport, TransportError, TransportResult};
use crate::unit::{FetchOutcome, ResourceDescriptor};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect::Policy, Client};
use std::time::{Duration, Instant};

/// Maximum redirect hops when redirects are followed
const MAX_REDIRECTS: usize = 10;

/// Builds an HTTP client with the configured headers and connection settings
///
/// # Arguments
///
/// * `config` - The transport configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(TransportError)` - A header was invalid or the client failed to build
///
/// # Example
///
/// ```no_run
/// use crawl_probe::config::TransportConfig;
/// use crawl_probe::transport::build_http_client;
///
/// let client = build_http_client(&TransportConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &TransportConfig) -> TransportResult<Client> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::Config(format!("Invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            TransportError::Config(format!("Invalid value for header '{}': {}", name, e))
        })?;
        headers.insert(name, value);
    }

    let redirect = if config.follow_redirects {
        Policy::limited(MAX_REDIRECTS)
    } else {
        Policy::none()
    };

    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .redirect(redirect)
        .gzip(true)
        .brotli(true);

    if let Some(timeout_ms) = config.timeout_ms {
        builder = builder.timeout(Duration::from_millis(timeout_ms));
    }

    if !config.keep_alive {
        // No idle connections are retained, so every request reconnects
        builder = builder.pool_max_idle_per_host(0);
    }

    builder
        .build()
        .map_err(|e| TransportError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Fetches crawl targets over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport from the configuration
    pub fn new(config: &TransportConfig) -> TransportResult<Self> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    /// Sends a GET request and records the status and time to first byte
    ///
    /// The target URL always comes from the descriptor. The response body is
    /// drained so the connection can be reused, but its content is not kept.
    async fn fetch(&self, descriptor: &ResourceDescriptor) -> TransportResult<FetchOutcome> {
        let url = descriptor.url.as_str();
        let started = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let backend_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        let status_code = response.status().as_u16();

        if let Err(e) = response.bytes().await {
            tracing::debug!("Failed to drain body for {}: {}", url, e);
        }

        Ok(FetchOutcome::response(status_code, backend_time_ms))
    }
}

/// Classifies a reqwest error into a transport error
fn classify_error(url: &str, error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        TransportError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        TransportError::Request {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
