//! HTML renderer, also the default when no extension is given

use std::sync::Mutex;

use shared::{Reporter, RunListener, RunResult, TestSelector};

use crate::traits::Renderer;
use crate::types::RequestParser;

#[derive(Default)]
pub struct HtmlRenderer {
    output: Mutex<String>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self, html: &str) {
        let mut output = self.output.lock().expect("renderer lock poisoned");
        output.push_str(html);
        output.push('\n');
    }

    /// `<span class='testCountNonZero'>tests:1</span>` and friends, the
    /// class carries whether the count is zero so stylesheets can highlight
    fn count_span(prefix: &str, label: &str, value: u64) -> String {
        let zeroness = if value == 0 { "Zero" } else { "NonZero" };
        format!("<span class='{prefix}Count{zeroness}'>{label}:{value}</span>")
    }
}

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl Renderer for HtmlRenderer {
    fn extension(&self) -> &'static str {
        "html"
    }

    fn applies_to(&self, request: &RequestParser) -> bool {
        let extension = TestSelector::extension(request);
        extension.is_empty() || extension == self.extension()
    }

    fn content_type(&self) -> &'static str {
        "text/html; charset=utf-8"
    }

    fn setup(&self, page_title: &str) {
        let title = escape(page_title);
        self.write(&format!(
            "<html><head><title>{title}</title></head><body class='testResults'>"
        ));
        self.title(1, page_title);
    }

    fn link(&self, info: &str, url: &str, method: &str) {
        if method.eq_ignore_ascii_case("post") {
            self.write(&format!(
                "<form action='{}' method='POST'><input type='submit' value='{}'/></form>",
                escape(url),
                escape(info)
            ));
        } else {
            self.write(&format!("<a href='{}'>{}</a>", escape(url), escape(info)));
        }
    }

    fn finish(&self) -> String {
        let mut output = self.output.lock().expect("renderer lock poisoned");
        output.push_str("</body></html>\n");
        output.clone()
    }

    fn as_reporter(&self) -> &dyn Reporter {
        self
    }
}

impl Reporter for HtmlRenderer {
    fn title(&self, level: u8, text: &str) {
        let level = level.clamp(1, 6);
        self.write(&format!("<h{level}>{}</h{level}>", escape(text)));
    }

    fn info(&self, role: &str, text: &str) {
        self.write(&format!("<p class='{}'>{}</p>", escape(role), escape(text)));
    }

    fn list(&self, role: &str, items: &[String]) {
        let mut html = format!("<ul class='{}'>", escape(role));
        for item in items {
            html.push_str(&format!("<li>{}</li>", escape(item)));
        }
        html.push_str("</ul>");
        self.write(&html);
    }

    fn run_listener(&self) -> &dyn RunListener {
        self
    }
}

impl RunListener for HtmlRenderer {
    fn suite_started(&self, name: &str) {
        self.write(&format!("<p class='suite'>{}</p>", escape(name)));
    }

    fn test_finished(&self, name: &str) {
        self.write(&format!("<p class='test'>{}</p>", escape(name)));
    }

    fn test_ignored(&self, name: &str) {
        self.write(&format!(
            "<p class='ignored'><h3>TEST IGNORED</h3><b>{}</b></p>",
            escape(name)
        ));
    }

    fn test_failure(&self, name: &str, cause: &str) {
        self.write(&format!(
            "<p class='failure'><h3>TEST FAILED: {}</h3><div class='failureDetails'>{}</div></p>",
            escape(name),
            escape(cause)
        ));
    }

    fn assumption_failure(&self, _name: &str, cause: &str) {
        self.write(&format!(
            "<p class='ignored'><h3>TEST ABORTED</h3><b>Assumption failed: {}</b></p>",
            escape(cause)
        ));
    }

    fn run_finished(&self, result: &RunResult) {
        self.write(&format!(
            "<p class='testRun'>{} {} {} {}</p>",
            Self::count_span("test", "tests", result.run_count),
            Self::count_span("failure", "failures", result.failure_count),
            Self::count_span("ignored", "ignored", result.ignored_count),
            Self::count_span("aborted", "aborted", result.assumption_failure_count),
        ));
    }
}
