//! Service implementations of the bridge's trait seams

pub mod direct_strategy;
pub mod engine_tracker;
pub mod module_scanner;
pub mod platform_strategy;
pub mod provider_registry;

pub use direct_strategy::DirectExecutionStrategy;
pub use engine_tracker::EngineTracker;
pub use module_scanner::{ModuleTestsProvider, TEST_REGEXP_HEADER};
pub use platform_strategy::PlatformExecutionStrategy;
pub use provider_registry::ProviderRegistry;
