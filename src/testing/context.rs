//! Handler registry
//!
//! Handlers are stored as tagged records (description, optional group, and
//! kind) and assembled through [`TestContextBuilder`]. Once built, a
//! [`TestContext`] is immutable and can be shared between fetch tasks.

use crate::testing::result::{TestResult, TestResultMap};
use crate::unit::CrawlerUnit;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Return type of a handler callback
///
/// `Ok(())` records a pass. An `Err` records a failure with the error's
/// message, including its context chain.
pub type HandlerResult = anyhow::Result<()>;

type UnitCallback = Box<dyn Fn(&CrawlerUnit) -> HandlerResult + Send + Sync>;
type UnitsCallback = Box<dyn Fn(&[CrawlerUnit]) -> HandlerResult + Send + Sync>;

/// The callback of a registered handler, tagged by what it runs against
pub enum HandlerKind {
    /// Invoked once per fetched unit
    PerUnit(UnitCallback),

    /// Invoked once with every unit of the crawl
    CrossUnit(UnitsCallback),
}

impl HandlerKind {
    fn is_per_unit(&self) -> bool {
        matches!(self, Self::PerUnit(_))
    }
}

/// A registered test
struct Handler {
    description: String,
    group: Option<String>,
    kind: HandlerKind,
}

/// Builder for a [`TestContext`]
///
/// # Example
///
/// ```
/// use crawl_probe::testing::TestContext;
///
/// let context = TestContext::builder()
///     .each("responds 200", |unit| {
///         anyhow::ensure!(
///             unit.response.status_code() == Some(200),
///             "expected 200, got {:?}",
///             unit.response.status_code()
///         );
///         Ok(())
///     })
///     .all_in_group("docs are present", "docs", |units| {
///         anyhow::ensure!(!units.is_empty(), "no docs crawled");
///         Ok(())
///     })
///     .build();
///
/// assert_eq!(context.per_unit_count(), 1);
/// assert_eq!(context.cross_unit_count(), 1);
/// ```
#[derive(Default)]
pub struct TestContextBuilder {
    handlers: Vec<Handler>,
}

impl TestContextBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a per-unit handler
    pub fn each<F>(self, description: impl Into<String>, cb: F) -> Self
    where
        F: Fn(&CrawlerUnit) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(description.into(), None, HandlerKind::PerUnit(Box::new(cb)))
    }

    /// Registers a cross-unit handler
    pub fn all<F>(self, description: impl Into<String>, cb: F) -> Self
    where
        F: Fn(&[CrawlerUnit]) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(description.into(), None, HandlerKind::CrossUnit(Box::new(cb)))
    }

    /// Registers a per-unit handler that only runs for units in `group`
    pub fn each_in_group<F>(self, description: impl Into<String>, group: impl Into<String>, cb: F) -> Self
    where
        F: Fn(&CrawlerUnit) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(
            description.into(),
            Some(group.into()),
            HandlerKind::PerUnit(Box::new(cb)),
        )
    }

    /// Registers a cross-unit handler that runs against the units in `group`
    ///
    /// The handler is not invoked, and records no result, when no unit of the
    /// crawl belongs to the group.
    pub fn all_in_group<F>(self, description: impl Into<String>, group: impl Into<String>, cb: F) -> Self
    where
        F: Fn(&[CrawlerUnit]) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(
            description.into(),
            Some(group.into()),
            HandlerKind::CrossUnit(Box::new(cb)),
        )
    }

    /// Adds a handler record; a duplicate description of the same kind
    /// replaces the earlier registration in place
    fn register(mut self, description: String, group: Option<String>, kind: HandlerKind) -> Self {
        let existing = self
            .handlers
            .iter_mut()
            .find(|h| h.description == description && h.kind.is_per_unit() == kind.is_per_unit());

        match existing {
            Some(handler) => {
                tracing::warn!(
                    "Handler '{}' registered twice, keeping the last registration",
                    description
                );
                handler.group = group;
                handler.kind = kind;
            }
            None => self.handlers.push(Handler {
                description,
                group,
                kind,
            }),
        }

        self
    }

    /// Finishes registration
    pub fn build(self) -> TestContext {
        TestContext {
            handlers: self.handlers,
        }
    }
}

/// Registry of per-unit and cross-unit tests
#[derive(Default)]
pub struct TestContext {
    handlers: Vec<Handler>,
}

impl TestContext {
    /// Starts building a context
    pub fn builder() -> TestContextBuilder {
        TestContextBuilder::new()
    }

    /// Returns the number of per-unit handlers
    pub fn per_unit_count(&self) -> usize {
        self.handlers.iter().filter(|h| h.kind.is_per_unit()).count()
    }

    /// Returns the number of cross-unit handlers
    pub fn cross_unit_count(&self) -> usize {
        self.handlers.iter().filter(|h| !h.kind.is_per_unit()).count()
    }

    /// Returns true if any cross-unit handler is registered
    pub fn has_cross_unit_handlers(&self) -> bool {
        self.cross_unit_count() > 0
    }

    /// Runs every per-unit handler against one unit
    ///
    /// Handlers scoped to a group the unit does not belong to are skipped and
    /// record nothing. Each handler runs regardless of earlier failures.
    pub fn test_unit(&self, unit: &CrawlerUnit) -> TestResultMap {
        let mut results = TestResultMap::new();

        for handler in &self.handlers {
            let HandlerKind::PerUnit(cb) = &handler.kind else {
                continue;
            };

            if let Some(group) = &handler.group {
                if !unit.in_group(group) {
                    continue;
                }
            }

            let result = capture(|| cb(unit));
            tracing::trace!("{} [{}]: {:?}", unit.url(), handler.description, result);
            results.insert(handler.description.clone(), result);
        }

        results
    }

    /// Runs every cross-unit handler against the complete unit set
    ///
    /// Group-scoped handlers see only the matching units and are skipped when
    /// there are none.
    pub fn test_units(&self, units: &[CrawlerUnit]) -> TestResultMap {
        let mut results = TestResultMap::new();

        for handler in &self.handlers {
            let HandlerKind::CrossUnit(cb) = &handler.kind else {
                continue;
            };

            let result = match &handler.group {
                Some(group) => {
                    let matching: Vec<CrawlerUnit> =
                        units.iter().filter(|u| u.in_group(group)).cloned().collect();
                    if matching.is_empty() {
                        tracing::debug!(
                            "Skipping '{}': no units in group '{}'",
                            handler.description,
                            group
                        );
                        continue;
                    }
                    capture(|| cb(&matching))
                }
                None => capture(|| cb(units)),
            };

            tracing::trace!("all units [{}]: {:?}", handler.description, result);
            results.insert(handler.description.clone(), result);
        }

        results
    }
}

impl fmt::Debug for TestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let descriptions: Vec<_> = self.handlers.iter().map(|h| &h.description).collect();
        f.debug_struct("TestContext")
            .field("handlers", &descriptions)
            .finish()
    }
}

/// Runs one handler invocation, converting errors and panics into failures
fn capture<F>(f: F) -> TestResult
where
    F: FnOnce() -> HandlerResult,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => TestResult::Pass,
        Ok(Err(e)) => TestResult::fail(format!("{:#}", e)),
        Err(payload) => TestResult::fail(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_string())
}
