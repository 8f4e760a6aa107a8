//! Request path parsing
//!
//! A request like `/org.example.FooTest/testBar.html` carries three things:
//! which tests are selected, an optional single method restriction, and the
//! extension that picks the output renderer. The extension is whatever
//! follows the last dot of the whole path; the part before it splits on its
//! last slash into selector and method name.

use std::fmt;

use shared::TestSelector;

/// Test selector parsed from a request subpath
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestParser {
    test_selector: String,
    method_name: String,
    extension: String,
}

impl RequestParser {
    pub fn parse(path_info: &str) -> Self {
        let trimmed = path_info.trim();
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let Some(dot) = trimmed.rfind('.') else {
            return Self {
                test_selector: trimmed.to_string(),
                method_name: String::new(),
                extension: String::new(),
            };
        };
        let extension = trimmed[dot + 1..].to_string();
        let stem = &trimmed[..dot];
        match stem.rfind('/') {
            Some(slash) => Self {
                test_selector: stem[..slash].to_string(),
                method_name: stem[slash + 1..].to_string(),
                extension,
            },
            None => Self {
                test_selector: stem.to_string(),
                method_name: String::new(),
                extension,
            },
        }
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Relative path to POST to in order to execute this selection
    pub fn execution_path(&self) -> String {
        let method = if self.method_name.is_empty() {
            String::new()
        } else {
            format!("/{}", self.method_name)
        };
        format!("./{}{}.{}", self.test_selector, method, self.extension)
    }
}

impl TestSelector for RequestParser {
    fn accept_test_name(&self, test_name: &str) -> bool {
        self.test_selector.is_empty()
            || test_name == self.test_selector
            || test_name.starts_with(&format!("{}.", self.test_selector))
    }

    fn selected_test_method(&self) -> Option<&str> {
        if self.method_name.is_empty() {
            None
        } else {
            Some(&self.method_name)
        }
    }

    fn selector_string(&self) -> &str {
        &self.test_selector
    }

    fn extension(&self) -> &str {
        &self.extension
    }
}

impl fmt::Display for RequestParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "selector '{}' method '{}' extension '{}'",
            self.test_selector, self.method_name, self.extension
        )
    }
}
