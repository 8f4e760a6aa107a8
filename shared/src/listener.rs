//! Uniform lifecycle-event listener contract
//!
//! Every execution strategy, whatever engine generation sits behind it, emits
//! the same flat sequence of run/suite/test events to exactly one listener
//! per run. Methods take `&self` so listeners can be shared with in-flight
//! runs; implementations use interior mutability where they accumulate state.

use std::sync::Mutex;

use crate::types::RunResult;

/// Receives the lifecycle event stream of one test run
pub trait RunListener: Send + Sync {
    fn run_started(&self) {}
    fn suite_started(&self, _name: &str) {}
    fn test_started(&self, _name: &str) {}
    fn test_finished(&self, _name: &str) {}
    fn test_ignored(&self, _name: &str) {}
    fn test_failure(&self, _name: &str, _cause: &str) {}
    fn assumption_failure(&self, _name: &str, _cause: &str) {}
    fn suite_finished(&self, _name: &str) {}
    fn run_finished(&self, _result: &RunResult) {}
}

/// Informational reporting contract implemented by the rendering layer.
///
/// The bridge only calls these methods; it never inspects what the renderer
/// produces out of them.
pub trait Reporter: Send + Sync {
    fn title(&self, level: u8, text: &str);
    fn info(&self, role: &str, text: &str);
    fn list(&self, role: &str, items: &[String]);
    fn run_listener(&self) -> &dyn RunListener;
}

/// One element of the recorded lifecycle stream
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    RunStarted,
    SuiteStarted(String),
    TestStarted(String),
    TestFinished(String),
    TestIgnored(String),
    TestFailed { name: String, cause: String },
    AssumptionFailed { name: String, cause: String },
    SuiteFinished(String),
    RunFinished(RunResult),
}

/// Listener that records the stream, used by tests and by renderers that
/// need the full sequence before producing output
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().expect("listener lock poisoned").clone()
    }

    pub fn final_result(&self) -> Option<RunResult> {
        self.events().into_iter().rev().find_map(|e| match e {
            LifecycleEvent::RunFinished(result) => Some(result),
            _ => None,
        })
    }

    fn push(&self, event: LifecycleEvent) {
        self.events.lock().expect("listener lock poisoned").push(event);
    }
}

impl RunListener for RecordingListener {
    fn run_started(&self) {
        self.push(LifecycleEvent::RunStarted);
    }

    fn suite_started(&self, name: &str) {
        self.push(LifecycleEvent::SuiteStarted(name.to_string()));
    }

    fn test_started(&self, name: &str) {
        self.push(LifecycleEvent::TestStarted(name.to_string()));
    }

    fn test_finished(&self, name: &str) {
        self.push(LifecycleEvent::TestFinished(name.to_string()));
    }

    fn test_ignored(&self, name: &str) {
        self.push(LifecycleEvent::TestIgnored(name.to_string()));
    }

    fn test_failure(&self, name: &str, cause: &str) {
        self.push(LifecycleEvent::TestFailed {
            name: name.to_string(),
            cause: cause.to_string(),
        });
    }

    fn assumption_failure(&self, name: &str, cause: &str) {
        self.push(LifecycleEvent::AssumptionFailed {
            name: name.to_string(),
            cause: cause.to_string(),
        });
    }

    fn suite_finished(&self, name: &str) {
        self.push(LifecycleEvent::SuiteFinished(name.to_string()));
    }

    fn run_finished(&self, result: &RunResult) {
        self.push(LifecycleEvent::RunFinished(result.clone()));
    }
}
