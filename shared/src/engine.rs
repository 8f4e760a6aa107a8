//! Pluggable test-engine capability
//!
//! An engine knows how to discover and execute test suites of a particular
//! style. Engines are deployed inside modules and tracked dynamically, so the
//! set of engines available to a run is whatever the bridge can currently
//! see. During execution an engine emits a tree of start/finish/skip events
//! with structured outcomes; the bridge adapts that tree down to the flat
//! lifecycle event stream.

use std::fmt;

use crate::types::{TestOutcome, TestSuite};

/// Where a node of the execution tree comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestSource {
    Class(String),
    Method { class_name: String, method_name: String },
}

/// Identity of one node in an engine's execution tree.
///
/// Engine-internal container nodes carry no source; listeners are expected
/// to drop them rather than invent an identity for them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestIdentifier {
    pub unique_id: String,
    pub display_name: String,
    pub is_test: bool,
    pub source: Option<TestSource>,
}

impl TestIdentifier {
    pub fn container(unique_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            display_name: display_name.into(),
            is_test: false,
            source: None,
        }
    }

    pub fn suite(unique_id: impl Into<String>, class_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        Self {
            unique_id: unique_id.into(),
            display_name: class_name.clone(),
            is_test: false,
            source: Some(TestSource::Class(class_name)),
        }
    }

    pub fn case(
        unique_id: impl Into<String>,
        class_name: impl Into<String>,
        method_name: impl Into<String>,
    ) -> Self {
        let method_name = method_name.into();
        Self {
            unique_id: unique_id.into(),
            display_name: method_name.clone(),
            is_test: true,
            source: Some(TestSource::Method {
                class_name: class_name.into(),
                method_name,
            }),
        }
    }

    /// Flat name used in the lifecycle event stream
    pub fn flat_name(&self) -> Option<String> {
        match &self.source {
            Some(TestSource::Class(class_name)) => Some(class_name.clone()),
            Some(TestSource::Method {
                class_name,
                method_name,
            }) => Some(format!("{class_name}#{method_name}")),
            None => None,
        }
    }
}

/// Structured outcome of a finished node
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineExecutionResult {
    Successful,
    Failed { cause: String },
    Aborted { cause: String },
}

/// Event emitted by an engine while executing a request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    Started(TestIdentifier),
    Finished(TestIdentifier, EngineExecutionResult),
    Skipped(TestIdentifier, String),
}

/// Selects what an engine should execute
#[derive(Clone, Debug)]
pub enum SuiteSelector {
    /// Run every case of the suite
    Class(TestSuite),
    /// Run only the named case of the suite
    Method { suite: TestSuite, method_name: String },
}

impl SuiteSelector {
    pub fn suite(&self) -> &TestSuite {
        match self {
            SuiteSelector::Class(suite) => suite,
            SuiteSelector::Method { suite, .. } => suite,
        }
    }
}

/// A transient execution request, built per run and discarded after
#[derive(Clone, Debug, Default)]
pub struct EngineRequest {
    pub selectors: Vec<SuiteSelector>,
}

impl EngineRequest {
    pub fn classes(suites: Vec<TestSuite>) -> Self {
        Self {
            selectors: suites.into_iter().map(SuiteSelector::Class).collect(),
        }
    }

    pub fn method(suite: TestSuite, method_name: impl Into<String>) -> Self {
        Self {
            selectors: vec![SuiteSelector::Method {
                suite,
                method_name: method_name.into(),
            }],
        }
    }
}

/// A pluggable test engine
pub trait TestEngine: Send + Sync {
    /// Stable engine identifier
    fn id(&self) -> &str;

    /// Whether this engine can execute the given suite
    fn supports(&self, suite: &TestSuite) -> bool;

    /// Execute all supported selectors of the request, emitting the
    /// execution tree through `emit`.
    fn execute(&self, request: &EngineRequest, emit: &mut dyn FnMut(EngineEvent));
}

impl fmt::Debug for dyn TestEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TestEngine({})", self.id())
    }
}

/// Reference engine for standard-style suites.
///
/// Runs each selected case in declaration order and reports structured
/// outcomes. The engine-level container node deliberately has no source,
/// matching how real platforms surface synthetic nodes.
pub struct SuiteTestEngine {
    id: String,
    style: String,
}

impl SuiteTestEngine {
    pub fn new() -> Self {
        Self::for_style(crate::types::DEFAULT_SUITE_STYLE)
    }

    /// An engine claiming suites of the given style, with id `<style>-engine`
    pub fn for_style(style: impl Into<String>) -> Self {
        let style = style.into();
        Self {
            id: format!("{style}-engine"),
            style,
        }
    }

    fn run_case(
        &self,
        suite: &TestSuite,
        case: &crate::types::TestCase,
        emit: &mut dyn FnMut(EngineEvent),
    ) {
        let id = TestIdentifier::case(
            format!("[engine:{}]/[class:{}]/[method:{}]", self.id, suite.class_name, case.name),
            suite.class_name.clone(),
            case.name.clone(),
        );
        match case.run() {
            TestOutcome::Skipped(reason) => {
                emit(EngineEvent::Skipped(id, reason));
            }
            TestOutcome::Passed => {
                emit(EngineEvent::Started(id.clone()));
                emit(EngineEvent::Finished(id, EngineExecutionResult::Successful));
            }
            TestOutcome::Failed(cause) => {
                emit(EngineEvent::Started(id.clone()));
                emit(EngineEvent::Finished(id, EngineExecutionResult::Failed { cause }));
            }
            TestOutcome::Aborted(cause) => {
                emit(EngineEvent::Started(id.clone()));
                emit(EngineEvent::Finished(id, EngineExecutionResult::Aborted { cause }));
            }
        }
    }
}

impl Default for SuiteTestEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEngine for SuiteTestEngine {
    fn id(&self) -> &str {
        &self.id
    }

    fn supports(&self, suite: &TestSuite) -> bool {
        suite.style == self.style
    }

    fn execute(&self, request: &EngineRequest, emit: &mut dyn FnMut(EngineEvent)) {
        let engine_node =
            TestIdentifier::container(format!("[engine:{}]", self.id), self.id.clone());
        emit(EngineEvent::Started(engine_node.clone()));

        for selector in &request.selectors {
            let suite = selector.suite();
            if !self.supports(suite) {
                continue;
            }
            let suite_node = TestIdentifier::suite(
                format!("[engine:{}]/[class:{}]", self.id, suite.class_name),
                suite.class_name.clone(),
            );
            emit(EngineEvent::Started(suite_node.clone()));
            match selector {
                SuiteSelector::Class(suite) => {
                    for case in &suite.cases {
                        self.run_case(suite, case, emit);
                    }
                }
                SuiteSelector::Method { suite, method_name } => {
                    for case in suite.cases.iter().filter(|c| &c.name == method_name) {
                        self.run_case(suite, case, emit);
                    }
                }
            }
            emit(EngineEvent::Finished(suite_node, EngineExecutionResult::Successful));
        }

        emit(EngineEvent::Finished(engine_node, EngineExecutionResult::Successful));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TestCase;

    fn suite() -> TestSuite {
        TestSuite::new(
            "org.example.SampleSuite",
            vec![
                TestCase::passing("passes"),
                TestCase::failing("fails", "assertion mismatch"),
                TestCase::skipped("skips", "not today"),
            ],
        )
    }

    fn collect(request: &EngineRequest) -> Vec<EngineEvent> {
        let engine = SuiteTestEngine::new();
        let mut events = Vec::new();
        engine.execute(request, &mut |e| events.push(e));
        events
    }

    #[test]
    fn class_selector_runs_all_cases() {
        let events = collect(&EngineRequest::classes(vec![suite()]));
        let started_tests = events
            .iter()
            .filter(|e| matches!(e, EngineEvent::Started(id) if id.is_test))
            .count();
        let skipped = events
            .iter()
            .filter(|e| matches!(e, EngineEvent::Skipped(_, _)))
            .count();
        assert_eq!(started_tests, 2);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn method_selector_runs_only_named_case() {
        let events = collect(&EngineRequest::method(suite(), "passes"));
        let test_events: Vec<_> = events
            .iter()
            .filter(|e| {
                matches!(e, EngineEvent::Started(id) | EngineEvent::Finished(id, _) if id.is_test)
            })
            .collect();
        assert_eq!(test_events.len(), 2);
    }

    #[test]
    fn unsupported_style_is_not_executed() {
        let other = suite().with_style("exotic");
        let events = collect(&EngineRequest::classes(vec![other]));
        // only the engine container node appears
        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .all(|e| !matches!(e, EngineEvent::Started(id) if id.source.is_some())));
    }

    #[test]
    fn failed_case_carries_cause() {
        let events = collect(&EngineRequest::method(suite(), "fails"));
        assert!(events.iter().any(|e| matches!(
            e,
            EngineEvent::Finished(_, EngineExecutionResult::Failed { cause }) if cause == "assertion mismatch"
        )));
    }
}
