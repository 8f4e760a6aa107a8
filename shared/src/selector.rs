//! Test selection contract
//!
//! A selector narrows which tests a request is about: a name predicate plus
//! an optional single-method restriction, along with the raw selector string
//! and the rendering extension the front end derived it from.

use std::fmt;

pub trait TestSelector: Send + Sync {
    /// True if the named test should be selected
    fn accept_test_name(&self, test_name: &str) -> bool;

    /// Optional restriction to a single test method
    fn selected_test_method(&self) -> Option<&str>;

    /// The raw string the selection was built from
    fn selector_string(&self) -> &str;

    /// Extension used to pick the result renderer
    fn extension(&self) -> &str;
}

impl fmt::Display for dyn TestSelector + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "selector '{}' method {:?} extension '{}'",
            self.selector_string(),
            self.selected_test_method(),
            self.extension()
        )
    }
}

/// Selector accepting an exact class name or any name below it on a dot
/// boundary. The empty selector accepts everything.
#[derive(Clone, Debug, Default)]
pub struct PrefixTestSelector {
    selector: String,
    method_name: Option<String>,
    extension: String,
}

impl PrefixTestSelector {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            method_name: None,
            extension: String::new(),
        }
    }

    pub fn with_method(mut self, method_name: impl Into<String>) -> Self {
        self.method_name = Some(method_name.into());
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

impl TestSelector for PrefixTestSelector {
    fn accept_test_name(&self, test_name: &str) -> bool {
        self.selector.is_empty()
            || test_name == self.selector
            || test_name.starts_with(&format!("{}.", self.selector))
    }

    fn selected_test_method(&self) -> Option<&str> {
        self.method_name.as_deref().filter(|m| !m.is_empty())
    }

    fn selector_string(&self) -> &str {
        &self.selector
    }

    fn extension(&self) -> &str {
        &self.extension
    }
}
