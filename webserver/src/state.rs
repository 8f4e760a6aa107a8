//! Shared handler state

use std::sync::Arc;

use bridge::core::TestCoordinator;

use crate::services::RendererSelector;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<TestCoordinator>,
    pub renderers: Arc<RendererSelector>,
}

impl AppState {
    pub fn new(coordinator: Arc<TestCoordinator>, renderers: Arc<RendererSelector>) -> Self {
        Self {
            coordinator,
            renderers,
        }
    }
}
