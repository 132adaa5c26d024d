//! Declarative checks from the crawl file
//!
//! Each `[[check]]` entry is compiled into a handler on a
//! [`TestContextBuilder`], so checks written in TOML run through the same
//! registry as handlers registered in code.

use crate::config::{CheckEntry, CheckScope};
use crate::testing::{HandlerResult, TestContext, TestContextBuilder};
use crate::unit::CrawlerUnit;
use anyhow::{bail, ensure};

/// Builds a test context from declarative checks
pub fn build_context(checks: &[CheckEntry]) -> TestContext {
    register_checks(TestContext::builder(), checks).build()
}

/// Registers every check on an existing builder
pub fn register_checks(mut builder: TestContextBuilder, checks: &[CheckEntry]) -> TestContextBuilder {
    for check in checks {
        let description = check.description.clone();
        let owned = check.clone();

        builder = match (check.scope, check.group.clone()) {
            (CheckScope::Each, None) => builder.each(description, move |unit| check_unit(&owned, unit)),
            (CheckScope::Each, Some(group)) => {
                builder.each_in_group(description, group, move |unit| check_unit(&owned, unit))
            }
            (CheckScope::All, None) => builder.all(description, move |units| check_units(&owned, units)),
            (CheckScope::All, Some(group)) => {
                builder.all_in_group(description, group, move |units| check_units(&owned, units))
            }
        };
    }

    builder
}

/// Evaluates a per-unit check against one unit
fn check_unit(check: &CheckEntry, unit: &CrawlerUnit) -> HandlerResult {
    if let Some(reachable) = check.reachable {
        match (reachable, unit.response.error()) {
            (true, Some(error)) => bail!("fetch failed: {}", error),
            (false, None) => bail!("expected the fetch to fail, but the resource responded"),
            _ => {}
        }
    }

    if let Some(expected) = check.expect_status {
        let Some(status) = unit.response.status_code() else {
            bail!("expected status {}, but the fetch failed: {}", expected, unit_error(unit));
        };
        ensure!(status == expected, "expected status {}, got {}", expected, status);
    }

    if let Some(max) = check.max_backend_time_ms {
        let Some(elapsed) = unit.response.backend_time_ms() else {
            bail!("no backend time, the fetch failed: {}", unit_error(unit));
        };
        ensure!(
            elapsed <= max,
            "backend time {:.1}ms exceeds {:.1}ms",
            elapsed,
            max
        );
    }

    Ok(())
}

/// Evaluates a cross-unit check against a unit set
fn check_units(check: &CheckEntry, units: &[CrawlerUnit]) -> HandlerResult {
    if let Some(expected) = check.expect_status {
        let offenders: Vec<String> = units
            .iter()
            .filter(|u| u.response.status_code() != Some(expected))
            .map(|u| match u.response.status_code() {
                Some(status) => format!("{} ({})", u.url(), status),
                None => format!("{} (fetch failed)", u.url()),
            })
            .collect();

        ensure!(
            offenders.is_empty(),
            "{} of {} units did not return {}: {}",
            offenders.len(),
            units.len(),
            expected,
            offenders.join(", ")
        );
    }

    if let Some(max) = check.max_backend_time_ms {
        let times: Vec<f64> = units
            .iter()
            .filter_map(|u| u.response.backend_time_ms())
            .collect();

        ensure!(!times.is_empty(), "no unit responded, average backend time unavailable");

        let average = times.iter().sum::<f64>() / times.len() as f64;
        ensure!(
            average <= max,
            "average backend time {:.1}ms exceeds {:.1}ms",
            average,
            max
        );
    }

    Ok(())
}

fn unit_error(unit: &CrawlerUnit) -> &str {
    unit.response.error().unwrap_or("unknown error")
}
