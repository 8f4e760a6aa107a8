//! Rendering contract of the HTTP layer
//!
//! A renderer turns the bridge's reporting calls and lifecycle events into
//! one response body. Instances are single-use: the selector creates a fresh
//! renderer per request, the handler feeds it and calls `finish` once.

use shared::Reporter;

use crate::types::RequestParser;

pub trait Renderer: Reporter {
    /// The extension that triggers this renderer
    fn extension(&self) -> &'static str;

    /// True if this renderer applies to the supplied request
    fn applies_to(&self, request: &RequestParser) -> bool;

    fn content_type(&self) -> &'static str;

    /// Called first, before any reporting
    fn setup(&self, page_title: &str);

    /// Render a link to `url` to be followed with the given HTTP method
    fn link(&self, info: &str, url: &str, method: &str);

    /// Called once rendering is done; returns the response body
    fn finish(&self) -> String;

    /// Upcast, handlers pass renderers where the bridge wants a reporter
    fn as_reporter(&self) -> &dyn Reporter;
}
