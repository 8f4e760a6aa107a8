//! HTTP front end for the test bridge
//!
//! Exposes the bridge's catalog and execution over plain HTTP: GET lists
//! the selected tests, POST runs them, and the extension of the request
//! path picks the output format.

pub mod error;
pub mod services;
pub mod state;
pub mod traits;
pub mod types;
pub mod web;
pub mod webserver_impl;

// Re-export main types
pub use error::{WebServerError, WebServerResult};
pub use state::AppState;
pub use types::RequestParser;
pub use webserver_impl::WebServer;

// Re-export trait definitions and implementations
pub use services::{HtmlRenderer, JsonRenderer, PlainTextRenderer, RendererSelector};
pub use traits::Renderer;
