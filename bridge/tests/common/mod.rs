//! Shared fixtures for bridge tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use shared::{
    MemoryModuleBuilder, MemoryModuleRuntime, Module, RecordingListener, Reporter, RunListener,
    SuiteTestEngine, TestCase, TestSuite,
};

use bridge::services::module_scanner::TEST_REGEXP_HEADER;

/// Reporter capturing titles, infos and the full lifecycle stream
pub struct CapturingReporter {
    pub listener: RecordingListener,
    pub titles: Mutex<Vec<(u8, String)>>,
    pub infos: Mutex<Vec<(String, String)>>,
    pub lists: Mutex<Vec<(String, Vec<String>)>>,
}

impl CapturingReporter {
    pub fn new() -> Self {
        Self {
            listener: RecordingListener::new(),
            titles: Mutex::new(Vec::new()),
            infos: Mutex::new(Vec::new()),
            lists: Mutex::new(Vec::new()),
        }
    }

    pub fn titles(&self) -> Vec<String> {
        self.titles.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }
}

impl Reporter for CapturingReporter {
    fn title(&self, level: u8, text: &str) {
        self.titles.lock().unwrap().push((level, text.to_string()));
    }

    fn info(&self, role: &str, text: &str) {
        self.infos.lock().unwrap().push((role.to_string(), text.to_string()));
    }

    fn list(&self, role: &str, items: &[String]) {
        self.lists.lock().unwrap().push((role.to_string(), items.to_vec()));
    }

    fn run_listener(&self) -> &dyn RunListener {
        &self.listener
    }
}

/// A started module contributing the given suites under a match-all pattern
pub fn start_test_module(
    runtime: &MemoryModuleRuntime,
    name: &str,
    suites: Vec<TestSuite>,
) -> shared::ModuleId {
    let mut builder = MemoryModuleBuilder::new(name).header(TEST_REGEXP_HEADER, ".*");
    for suite in suites {
        builder = builder.suite(suite);
    }
    let module = runtime.install(builder);
    runtime.start(module.id());
    module.id()
}

/// A started module exporting the standard suite engine
pub fn start_engine_module(runtime: &MemoryModuleRuntime, name: &str) -> shared::ModuleId {
    let module =
        runtime.install(MemoryModuleBuilder::new(name).engine(Arc::new(SuiteTestEngine::new())));
    runtime.start(module.id());
    module.id()
}

pub fn passing_suite(class_name: &str) -> TestSuite {
    TestSuite::new(class_name, vec![TestCase::passing("works")])
}

/// Poll until the condition holds; the scanners apply events asynchronously
pub async fn wait_for<F: Fn() -> bool>(predicate: F) {
    for _ in 0..200 {
        if predicate() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}
