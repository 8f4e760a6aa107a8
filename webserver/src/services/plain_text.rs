//! Plain text renderer

use std::sync::Mutex;

use shared::{Reporter, RunListener, RunResult};

use crate::traits::Renderer;
use crate::types::RequestParser;

/// Renders for the `txt` extension, one line per event
#[derive(Default)]
pub struct PlainTextRenderer {
    output: Mutex<String>,
}

impl PlainTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn line(&self, text: &str) {
        let mut output = self.output.lock().expect("renderer lock poisoned");
        output.push_str(text);
        output.push('\n');
    }
}

impl Renderer for PlainTextRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn applies_to(&self, request: &RequestParser) -> bool {
        shared::TestSelector::extension(request) == self.extension()
    }

    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn setup(&self, page_title: &str) {
        self.title(1, page_title);
    }

    fn link(&self, info: &str, url: &str, method: &str) {
        self.line(&format!("{} ({} {})", info, method, url));
    }

    fn finish(&self) -> String {
        self.output.lock().expect("renderer lock poisoned").clone()
    }

    fn as_reporter(&self) -> &dyn Reporter {
        self
    }
}

impl Reporter for PlainTextRenderer {
    fn title(&self, _level: u8, text: &str) {
        self.line(&format!("{} ****", text));
    }

    fn info(&self, _role: &str, text: &str) {
        self.line(text);
    }

    fn list(&self, _role: &str, items: &[String]) {
        for item in items {
            self.line(item);
        }
    }

    fn run_listener(&self) -> &dyn RunListener {
        self
    }
}

impl RunListener for PlainTextRenderer {
    fn test_finished(&self, name: &str) {
        self.line(&format!("FINISHED {}", name));
    }

    fn test_ignored(&self, name: &str) {
        self.line(&format!("IGNORED {}", name));
    }

    fn test_failure(&self, name: &str, cause: &str) {
        self.line(&format!("FAILURE {}: {}", name, cause));
    }

    fn assumption_failure(&self, name: &str, cause: &str) {
        self.line(&format!("ABORTED {}: {}", name, cause));
    }

    fn run_finished(&self, result: &RunResult) {
        self.line(&format!(
            "TEST RUN FINISHED: tests:{}, failures:{}, ignored:{}, aborted:{}",
            result.run_count,
            result.failure_count,
            result.ignored_count,
            result.assumption_failure_count
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_to_txt_only() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.applies_to(&RequestParser::parse("/org.example.txt")));
        assert!(!renderer.applies_to(&RequestParser::parse("/org.example.html")));
    }

    #[test]
    fn events_become_lines() {
        let renderer = PlainTextRenderer::new();
        renderer.setup("Tests");
        renderer.test_failure("a.FooTest#fails", "boom");
        renderer.run_finished(&RunResult {
            run_count: 1,
            failure_count: 1,
            ..RunResult::default()
        });

        let body = renderer.finish();
        assert!(body.starts_with("Tests ****\n"));
        assert!(body.contains("FAILURE a.FooTest#fails: boom"));
        assert!(body.contains("TEST RUN FINISHED: tests:1, failures:1, ignored:0, aborted:0"));
    }
}
