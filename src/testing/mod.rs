//! Testing module: handler registration and execution
//!
//! This module holds user-registered tests and runs them against crawled
//! units. Tests come in two kinds:
//! - per-unit handlers, evaluated once for every fetched unit
//! - cross-unit handlers, evaluated once against the complete unit set
//!
//! Either kind may be scoped to a group tag. Every handler invocation is
//! isolated: an error or panic inside one handler is recorded as a failure
//! for that handler only.

mod context;
mod result;

pub use context::{HandlerKind, HandlerResult, TestContext, TestContextBuilder};
pub use result::{EachResultMap, TestResult, TestResultMap};
