//! JSON renderer for machine consumers

use std::sync::Mutex;

use serde_json::{json, Value};
use shared::{Reporter, RunListener, RunResult, TestSelector};

use crate::traits::Renderer;
use crate::types::RequestParser;

#[derive(Default)]
pub struct JsonRenderer {
    elements: Mutex<Vec<Value>>,
}

impl JsonRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, element: Value) {
        self.elements.lock().expect("renderer lock poisoned").push(element);
    }
}

impl Renderer for JsonRenderer {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn applies_to(&self, request: &RequestParser) -> bool {
        TestSelector::extension(request) == self.extension()
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn setup(&self, page_title: &str) {
        self.push(json!({ "type": "page", "title": page_title }));
    }

    fn link(&self, info: &str, url: &str, method: &str) {
        self.push(json!({ "type": "link", "info": info, "url": url, "method": method }));
    }

    fn finish(&self) -> String {
        let elements = self.elements.lock().expect("renderer lock poisoned");
        // Values are plain maps, this cannot fail
        serde_json::to_string_pretty(&Value::Array(elements.clone())).unwrap_or_default()
    }

    fn as_reporter(&self) -> &dyn Reporter {
        self
    }
}

impl Reporter for JsonRenderer {
    fn title(&self, level: u8, text: &str) {
        self.push(json!({ "type": "title", "level": level, "text": text }));
    }

    fn info(&self, role: &str, text: &str) {
        self.push(json!({ "type": "info", "role": role, "text": text }));
    }

    fn list(&self, role: &str, items: &[String]) {
        self.push(json!({ "type": "list", "role": role, "data": items }));
    }

    fn run_listener(&self) -> &dyn RunListener {
        self
    }
}

impl RunListener for JsonRenderer {
    fn suite_started(&self, name: &str) {
        self.push(json!({ "type": "suite", "name": name }));
    }

    fn test_finished(&self, name: &str) {
        self.push(json!({ "type": "test", "name": name, "event": "finished" }));
    }

    fn test_ignored(&self, name: &str) {
        self.push(json!({ "type": "test", "name": name, "event": "ignored" }));
    }

    fn test_failure(&self, name: &str, cause: &str) {
        self.push(json!({ "type": "test", "name": name, "event": "failure", "cause": cause }));
    }

    fn assumption_failure(&self, name: &str, cause: &str) {
        self.push(json!({ "type": "test", "name": name, "event": "aborted", "cause": cause }));
    }

    fn run_finished(&self, result: &RunResult) {
        self.push(json!({
            "type": "summary",
            "tests": result.run_count,
            "failures": result.failure_count,
            "ignored": result.ignored_count,
            "aborted": result.assumption_failure_count,
            "successful": result.was_successful(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_a_json_array_of_events() {
        let renderer = JsonRenderer::new();
        renderer.setup("Tests");
        renderer.test_finished("a.FooTest#passes");
        renderer.run_finished(&RunResult {
            run_count: 1,
            ..RunResult::default()
        });

        let parsed: Value = serde_json::from_str(&renderer.finish()).unwrap();
        let elements = parsed.as_array().unwrap();
        assert_eq!(elements[0]["title"], "Tests");
        assert_eq!(elements[1]["name"], "a.FooTest#passes");
        assert_eq!(elements[2]["successful"], true);
    }

    #[test]
    fn applies_to_json_only() {
        let renderer = JsonRenderer::new();
        assert!(renderer.applies_to(&RequestParser::parse("/org.example.json")));
        assert!(!renderer.applies_to(&RequestParser::parse("/org.example.html")));
    }
}
