use crate::config::types::{CheckEntry, CheckScope, Config, CrawlerConfig, TransportConfig};
use crate::unit::ResourceDescriptor;
use crate::{ConfigError, ConfigResult};
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_transport_config(&config.transport)?;
    validate_resources(&config.resources)?;
    validate_checks(&config.checks)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    Ok(())
}

/// Validates transport configuration
fn validate_transport_config(config: &TransportConfig) -> ConfigResult<()> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_ms == Some(0) {
        return Err(ConfigError::Validation(
            "timeout-ms must be greater than 0".to_string(),
        ));
    }

    for name in config.headers.keys() {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "header names cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates a resource set
///
/// Every URL must be absolute HTTP(S) and appear only once, since the URL is
/// the identifier results are reported under. Group tags must be non-empty.
pub fn validate_resources(resources: &[ResourceDescriptor]) -> ConfigResult<()> {
    if resources.is_empty() {
        return Err(ConfigError::Validation(
            "at least one resource is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for resource in resources {
        let url = Url::parse(&resource.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid resource URL '{}': {}", resource.url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Resource URL '{}' must use http or https",
                resource.url
            )));
        }

        if !seen.insert(resource.url.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate resource URL '{}'",
                resource.url
            )));
        }

        if resource.groups.iter().any(|g| g.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "Resource '{}' has an empty group name",
                resource.url
            )));
        }
    }

    Ok(())
}

/// Validates declarative check entries
fn validate_checks(checks: &[CheckEntry]) -> ConfigResult<()> {
    let mut seen = HashSet::new();

    for check in checks {
        if check.description.trim().is_empty() {
            return Err(ConfigError::Validation(
                "check description cannot be empty".to_string(),
            ));
        }

        if !seen.insert((check.scope, check.description.as_str())) {
            return Err(ConfigError::Validation(format!(
                "Duplicate check description '{}'",
                check.description
            )));
        }

        if check.expect_status.is_none()
            && check.max_backend_time_ms.is_none()
            && check.reachable.is_none()
        {
            return Err(ConfigError::Validation(format!(
                "Check '{}' must set at least one expectation",
                check.description
            )));
        }

        if let Some(max) = check.max_backend_time_ms {
            if !(max > 0.0) {
                return Err(ConfigError::Validation(format!(
                    "Check '{}': max-backend-time-ms must be positive, got {}",
                    check.description, max
                )));
            }
        }

        if check.scope == CheckScope::All && check.reachable.is_some() {
            return Err(ConfigError::Validation(format!(
                "Check '{}': reachable only applies to scope \"each\"",
                check.description
            )));
        }

        if let Some(group) = &check.group {
            if group.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "Check '{}' has an empty group name",
                    check.description
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(description: &str, scope: CheckScope) -> CheckEntry {
        CheckEntry {
            description: description.to_string(),
            scope,
            group: None,
            expect_status: Some(200),
            max_backend_time_ms: None,
            reachable: None,
        }
    }

    #[test]
    fn test_validate_resources() {
        assert!(validate_resources(&[ResourceDescriptor::new("https://example.com/")]).is_ok());
        assert!(validate_resources(&[ResourceDescriptor::new("http://127.0.0.1:8080/a")]).is_ok());

        assert!(validate_resources(&[]).is_err());
        assert!(validate_resources(&[ResourceDescriptor::new("not a url")]).is_err());
        assert!(validate_resources(&[ResourceDescriptor::new("ftp://example.com/")]).is_err());
        assert!(validate_resources(&[ResourceDescriptor::new("https://example.com/").with_group(" ")]).is_err());
    }

    #[test]
    fn test_duplicate_resources_rejected() {
        let result = validate_resources(&[
            ResourceDescriptor::new("https://example.com/"),
            ResourceDescriptor::new("https://example.com/"),
        ]);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_checks() {
        assert!(validate_checks(&[check("a", CheckScope::Each), check("a", CheckScope::All)]).is_ok());

        assert!(validate_checks(&[check("a", CheckScope::Each), check("a", CheckScope::Each)]).is_err());
        assert!(validate_checks(&[check("", CheckScope::Each)]).is_err());

        let mut empty = check("empty", CheckScope::Each);
        empty.expect_status = None;
        assert!(validate_checks(&[empty]).is_err());

        let mut reachable_all = check("reachable", CheckScope::All);
        reachable_all.reachable = Some(true);
        assert!(validate_checks(&[reachable_all]).is_err());

        let mut negative = check("negative", CheckScope::Each);
        negative.max_backend_time_ms = Some(-1.0);
        assert!(validate_checks(&[negative]).is_err());
    }

    #[test]
    fn test_validate_transport_config() {
        assert!(validate_transport_config(&TransportConfig::default()).is_ok());

        let mut config = TransportConfig::default();
        config.user_agent = String::new();
        assert!(validate_transport_config(&config).is_err());

        let mut config = TransportConfig::default();
        config.timeout_ms = Some(0);
        assert!(validate_transport_config(&config).is_err());
    }

    #[test]
    fn test_validate_crawler_config() {
        assert!(validate_crawler_config(&CrawlerConfig { concurrency: 1 }).is_ok());
        assert!(validate_crawler_config(&CrawlerConfig { concurrency: 0 }).is_err());
        assert!(validate_crawler_config(&CrawlerConfig { concurrency: 101 }).is_err());
    }
}
