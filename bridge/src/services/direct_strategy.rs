//! Legacy single-runner execution strategy
//!
//! Drives suites directly, without the pluggable engine platform: resolve
//! each class through the coordinator, iterate its cases in order, emit the
//! lifecycle stream inline. A suite that fails to load mid-run surfaces as a
//! test failure rather than a silent skip.

use std::sync::Arc;
use std::time::Instant;

use shared::{Reporter, RunListener, RunResult, TestOutcome, TestSelector, TestSuite};
use tracing::debug;

use crate::core::coordinator::TestCoordinator;
use crate::error::BridgeResult;
use crate::traits::ExecutionStrategy;

pub struct DirectExecutionStrategy {
    coordinator: Arc<TestCoordinator>,
}

impl DirectExecutionStrategy {
    pub fn new(coordinator: Arc<TestCoordinator>) -> Self {
        Self { coordinator }
    }

    fn run_suite(
        &self,
        suite: &TestSuite,
        method_name: Option<&str>,
        listener: &dyn RunListener,
        result: &mut RunResult,
    ) {
        listener.suite_started(&suite.class_name);
        let cases = suite
            .cases
            .iter()
            .filter(|c| method_name.map_or(true, |m| c.name == m));
        for case in cases {
            let flat_name = format!("{}#{}", suite.class_name, case.name);
            match case.run() {
                TestOutcome::Skipped(_reason) => {
                    result.ignored_count += 1;
                    listener.test_ignored(&flat_name);
                }
                TestOutcome::Passed => {
                    result.run_count += 1;
                    listener.test_started(&flat_name);
                    listener.test_finished(&flat_name);
                }
                TestOutcome::Failed(cause) => {
                    result.run_count += 1;
                    result.failure_count += 1;
                    listener.test_started(&flat_name);
                    listener.test_failure(&flat_name, &cause);
                    listener.test_finished(&flat_name);
                }
                TestOutcome::Aborted(cause) => {
                    result.run_count += 1;
                    result.assumption_failure_count += 1;
                    listener.test_started(&flat_name);
                    listener.assumption_failure(&flat_name, &cause);
                    listener.test_finished(&flat_name);
                }
            }
        }
        listener.suite_finished(&suite.class_name);
    }
}

#[async_trait::async_trait]
impl ExecutionStrategy for DirectExecutionStrategy {
    async fn execute(
        &self,
        reporter: &dyn Reporter,
        test_names: &[String],
        selector: Option<&dyn TestSelector>,
    ) -> BridgeResult<()> {
        let listener = reporter.run_listener();
        let method_name = selector.and_then(|s| s.selected_test_method());
        let start = Instant::now();
        let mut result = RunResult::default();

        listener.run_started();
        for class_name in test_names {
            reporter.title(3, class_name);
            match self.coordinator.get_test_suite(class_name) {
                Ok(suite) => {
                    match method_name {
                        Some(method) => {
                            debug!("Running test method {} from test class {}", method, class_name)
                        }
                        None => debug!("Running test class {}", class_name),
                    }
                    self.run_suite(&suite, method_name, listener, &mut result);
                }
                Err(e) => {
                    // the class vanished between selection and execution
                    result.run_count += 1;
                    result.failure_count += 1;
                    listener.test_started(class_name);
                    listener.test_failure(class_name, &e.to_string());
                    listener.test_finished(class_name);
                }
            }
        }
        result.duration = start.elapsed();
        listener.run_finished(&result);
        Ok(())
    }
}
