//! Picks the output renderer for a request
//!
//! Renderers accumulate per-request state, so the selector hands out a
//! fresh instance every time instead of sharing one.

use tracing::debug;

use crate::services::{HtmlRenderer, JsonRenderer, PlainTextRenderer};
use crate::traits::Renderer;
use crate::types::RequestParser;

type RendererFactory = Box<dyn Fn() -> Box<dyn Renderer> + Send + Sync>;

pub struct RendererSelector {
    factories: Vec<RendererFactory>,
}

impl RendererSelector {
    /// Selector over the built-in renderers. First match wins, the HTML
    /// renderer also claims extensionless requests.
    pub fn new() -> Self {
        Self {
            factories: vec![
                Box::new(|| Box::new(PlainTextRenderer::new())),
                Box::new(|| Box::new(JsonRenderer::new())),
                Box::new(|| Box::new(HtmlRenderer::new())),
            ],
        }
    }

    pub fn renderer_for(&self, request: &RequestParser) -> Option<Box<dyn Renderer>> {
        for factory in &self.factories {
            let renderer = factory();
            if renderer.applies_to(request) {
                debug!("Using renderer for extension '{}'", renderer.extension());
                return Some(renderer);
            }
        }
        None
    }
}

impl Default for RendererSelector {
    fn default() -> Self {
        Self::new()
    }
}
