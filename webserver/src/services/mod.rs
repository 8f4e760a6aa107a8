//! Renderer implementations and their selector

pub mod html;
pub mod json;
pub mod plain_text;
pub mod renderer_selector;

pub use html::HtmlRenderer;
pub use json::JsonRenderer;
pub use plain_text::PlainTextRenderer;
pub use renderer_selector::RendererSelector;
