//! Wiring of a complete bridge over a module runtime
//!
//! Assembles the scanner, registry, engine tracker, readiness gate and
//! coordinator, and installs the platform execution strategy. The HTTP front
//! end and the integration tests both boot through this.

use std::sync::Arc;

use shared::ModuleRuntime;
use tracing::info;

use crate::core::coordinator::TestCoordinator;
use crate::core::readiness::{StartupConfig, SystemReadiness};
use crate::services::engine_tracker::EngineTracker;
use crate::services::module_scanner::ModuleTestsProvider;
use crate::services::platform_strategy::PlatformExecutionStrategy;
use crate::services::provider_registry::ProviderRegistry;
use crate::traits::TestsProvider;

/// A running bridge: tracked providers and engines plus the coordinator
pub struct TestBridge {
    pub coordinator: Arc<TestCoordinator>,
    pub registry: Arc<ProviderRegistry>,
    pub engines: Arc<EngineTracker>,
    provider: Arc<ModuleTestsProvider>,
}

impl TestBridge {
    /// Start tracking the runtime and wire the default strategy
    pub fn start(runtime: Arc<dyn ModuleRuntime>, startup: StartupConfig) -> Self {
        let provider = ModuleTestsProvider::open(Arc::clone(&runtime));
        let engines = EngineTracker::open(Arc::clone(&runtime));

        let registry = Arc::new(ProviderRegistry::new());
        registry.register(Arc::clone(&provider) as Arc<dyn TestsProvider>);

        let readiness = SystemReadiness::new(runtime, startup);
        let coordinator = Arc::new(TestCoordinator::new(Arc::clone(&registry), readiness));
        coordinator.set_strategy(Arc::new(PlatformExecutionStrategy::new(
            Arc::clone(&coordinator),
            Arc::clone(&engines),
        )));
        info!("Test bridge started");

        Self {
            coordinator,
            registry,
            engines,
            provider,
        }
    }

    /// Stop following module events
    pub fn shutdown(&self) {
        self.provider.close();
        self.engines.close();
        info!("Test bridge stopped");
    }
}
