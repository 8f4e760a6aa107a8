//! Multi-engine launcher
//!
//! Executes one transient request against exactly the engines passed in: no
//! automatic global registration, so engines are scoped strictly to what the
//! bridge can currently see. Every engine event fans out to all listeners,
//! framed by one plan-started and one plan-finished.

use std::sync::Arc;

use shared::{EngineEvent, EngineRequest, SuiteSelector, TestEngine, TestIdentifier};
use tracing::{debug, warn};

/// Listener side of a launcher execution
pub trait LaunchListener {
    fn plan_started(&self);
    fn plan_finished(&self);
    fn engine_event(&self, event: &EngineEvent);
}

/// Drives a set of engines through one execution request
pub struct Launcher {
    engines: Vec<Arc<dyn TestEngine>>,
}

impl Launcher {
    pub fn new(engines: Vec<Arc<dyn TestEngine>>) -> Self {
        Self { engines }
    }

    /// Execute the request. Each selector goes to the first engine that
    /// supports its suite; suites no engine claims are reported as skipped.
    pub fn execute(&self, request: &EngineRequest, listeners: &[&dyn LaunchListener]) {
        for listener in listeners {
            listener.plan_started();
        }

        let mut emit = |event: EngineEvent| {
            for listener in listeners {
                listener.engine_event(&event);
            }
        };

        for selector in &request.selectors {
            let suite = selector.suite();
            match self.engines.iter().find(|e| e.supports(suite)) {
                Some(engine) => {
                    debug!("Engine '{}' executes suite '{}'", engine.id(), suite.class_name);
                    let scoped = EngineRequest {
                        selectors: vec![selector.clone()],
                    };
                    engine.execute(&scoped, &mut emit);
                }
                None => {
                    warn!(
                        "No engine available for style '{}' of suite '{}', skipping",
                        suite.style, suite.class_name
                    );
                    skip_whole_selector(selector, &mut emit);
                }
            }
        }

        for listener in listeners {
            listener.plan_finished();
        }
    }
}

/// Report every case the selector would have run as skipped, so the
/// listener still sees a complete picture
fn skip_whole_selector(selector: &SuiteSelector, emit: &mut dyn FnMut(EngineEvent)) {
    let suite = selector.suite();
    let reason = format!("no engine supports style '{}'", suite.style);
    let cases: Vec<&str> = match selector {
        SuiteSelector::Class(suite) => suite.cases.iter().map(|c| c.name.as_str()).collect(),
        SuiteSelector::Method { suite, method_name } => suite
            .cases
            .iter()
            .filter(|c| &c.name == method_name)
            .map(|c| c.name.as_str())
            .collect(),
    };
    for case in cases {
        let id = TestIdentifier::case(
            format!("[unassigned]/[class:{}]/[method:{}]", suite.class_name, case),
            suite.class_name.clone(),
            case,
        );
        emit(EngineEvent::Skipped(id, reason.clone()));
    }
}
