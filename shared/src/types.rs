//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Unique identifier for a module in the host runtime
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId(pub u64);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module-{}", self.0)
    }
}

/// Lifecycle state of a module
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleState {
    Installed,
    Resolved,
    Starting,
    Active,
    Stopping,
}

/// What happened to a module
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModuleEventKind {
    Started,
    Updated,
    Stopped,
}

/// Module lifecycle event delivered by the host runtime
#[derive(Clone, Copy, Debug)]
pub struct ModuleEvent {
    pub module: ModuleId,
    pub kind: ModuleEventKind,
}

/// Outcome of running a single test case
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    Failed(String),
    /// An unmet assumption, not a real failure
    Aborted(String),
    Skipped(String),
}

/// A single runnable test case inside a suite
#[derive(Clone)]
pub struct TestCase {
    pub name: String,
    run: Arc<dyn Fn() -> TestOutcome + Send + Sync>,
}

impl TestCase {
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn() -> TestOutcome + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            run: Arc::new(run),
        }
    }

    /// A case that always passes, handy for fixtures
    pub fn passing(name: impl Into<String>) -> Self {
        Self::new(name, || TestOutcome::Passed)
    }

    /// A case that always fails with the given message
    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(name, move || TestOutcome::Failed(message.clone()))
    }

    /// A case that is always skipped with the given reason
    pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::new(name, move || TestOutcome::Skipped(reason.clone()))
    }

    /// A case that always aborts (unmet assumption)
    pub fn aborted(name: impl Into<String>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::new(name, move || TestOutcome::Aborted(reason.clone()))
    }

    pub fn run(&self) -> TestOutcome {
        (self.run)()
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase").field("name", &self.name).finish()
    }
}

/// The default suite style understood by [`crate::engine::SuiteTestEngine`]
pub const DEFAULT_SUITE_STYLE: &str = "standard";

/// A loadable "test class": a named collection of test cases.
///
/// The `style` tags which engine generation is able to run the suite, so
/// independently deployed engines can claim only the suites they understand.
#[derive(Clone, Debug)]
pub struct TestSuite {
    pub class_name: String,
    pub style: String,
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(class_name: impl Into<String>, cases: Vec<TestCase>) -> Self {
        Self {
            class_name: class_name.into(),
            style: DEFAULT_SUITE_STYLE.to_string(),
            cases,
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }
}

/// Aggregate result of one test run, passed to `run_finished`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunResult {
    pub run_count: u64,
    pub failure_count: u64,
    pub ignored_count: u64,
    pub assumption_failure_count: u64,
    pub duration: Duration,
}

impl RunResult {
    pub fn was_successful(&self) -> bool {
        self.failure_count == 0
    }
}
