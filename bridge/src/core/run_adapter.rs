//! Event protocol adapter
//!
//! Converts the pluggable platform's hierarchical execution events into the
//! flat lifecycle event stream, while keeping a running summary used to
//! synthesize the final aggregate result. Nodes without a resolvable source
//! are platform-internal and never reach the listener.

use std::sync::Mutex;
use std::time::Instant;

use shared::{EngineEvent, EngineExecutionResult, RunListener, RunResult, TestIdentifier};

use crate::core::launcher::LaunchListener;

#[derive(Debug, Default)]
struct Summary {
    tests_started: u64,
    tests_failed: u64,
    tests_skipped: u64,
    tests_aborted: u64,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
}

impl Summary {
    fn to_result(&self) -> RunResult {
        let duration = match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.duration_since(start),
            _ => Default::default(),
        };
        RunResult {
            run_count: self.tests_started,
            failure_count: self.tests_failed,
            ignored_count: self.tests_skipped,
            assumption_failure_count: self.tests_aborted,
            duration,
        }
    }
}

/// Adapts engine execution events to a [`RunListener`]
pub struct RunListenerAdapter<'a> {
    listener: &'a dyn RunListener,
    summary: Mutex<Summary>,
}

impl<'a> RunListenerAdapter<'a> {
    pub fn new(listener: &'a dyn RunListener) -> Self {
        Self {
            listener,
            summary: Mutex::new(Summary::default()),
        }
    }

    /// Aggregate result synthesized from the events seen so far
    pub fn result(&self) -> RunResult {
        self.summary.lock().expect("summary lock poisoned").to_result()
    }

    fn on_started(&self, id: &TestIdentifier) {
        if id.is_test {
            self.summary.lock().expect("summary lock poisoned").tests_started += 1;
        }
        let Some(name) = id.flat_name() else {
            return;
        };
        if id.is_test {
            self.listener.test_started(&name);
        } else {
            self.listener.suite_started(&name);
        }
    }

    fn on_finished(&self, id: &TestIdentifier, result: &EngineExecutionResult) {
        if id.is_test {
            let mut summary = self.summary.lock().expect("summary lock poisoned");
            match result {
                EngineExecutionResult::Failed { .. } => summary.tests_failed += 1,
                EngineExecutionResult::Aborted { .. } => summary.tests_aborted += 1,
                EngineExecutionResult::Successful => {}
            }
        }
        let Some(name) = id.flat_name() else {
            return;
        };
        if id.is_test {
            match result {
                EngineExecutionResult::Failed { cause } => {
                    self.listener.test_failure(&name, cause);
                }
                EngineExecutionResult::Aborted { cause } => {
                    self.listener.assumption_failure(&name, cause);
                }
                EngineExecutionResult::Successful => {}
            }
            self.listener.test_finished(&name);
        } else {
            self.listener.suite_finished(&name);
        }
    }

    fn on_skipped(&self, id: &TestIdentifier) {
        if id.is_test {
            self.summary.lock().expect("summary lock poisoned").tests_skipped += 1;
            if let Some(name) = id.flat_name() {
                self.listener.test_ignored(&name);
            }
        }
    }
}

impl LaunchListener for RunListenerAdapter<'_> {
    fn plan_started(&self) {
        self.summary.lock().expect("summary lock poisoned").started_at = Some(Instant::now());
        self.listener.run_started();
    }

    fn plan_finished(&self) {
        let result = {
            let mut summary = self.summary.lock().expect("summary lock poisoned");
            summary.finished_at = Some(Instant::now());
            summary.to_result()
        };
        self.listener.run_finished(&result);
    }

    fn engine_event(&self, event: &EngineEvent) {
        match event {
            EngineEvent::Started(id) => self.on_started(id),
            EngineEvent::Finished(id, result) => self.on_finished(id, result),
            EngineEvent::Skipped(id, _reason) => self.on_skipped(id),
        }
    }
}
