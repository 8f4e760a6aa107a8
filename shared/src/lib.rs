//! Shared vocabulary for the test bridge processes
//!
//! This crate defines the contracts that the bridge core, the HTTP front end
//! and the in-memory module runtime all agree on: the module-runtime
//! abstraction, test suites and outcomes, the pluggable engine capability,
//! the uniform lifecycle-event listener, selectors, errors and logging.

pub mod engine;
pub mod errors;
pub mod listener;
pub mod logging;
pub mod memory;
pub mod module;
pub mod selector;
pub mod types;

// Re-export the most commonly used items at crate level
pub use engine::{
    EngineEvent, EngineExecutionResult, EngineRequest, SuiteSelector, SuiteTestEngine, TestEngine,
    TestIdentifier, TestSource,
};
pub use errors::{SharedError, SharedResult};
pub use listener::{LifecycleEvent, RecordingListener, Reporter, RunListener};
pub use memory::{MemoryModule, MemoryModuleBuilder, MemoryModuleRuntime};
pub use module::{Module, ModuleRuntime, FRAGMENT_HOST_HEADER};
pub use selector::{PrefixTestSelector, TestSelector};
pub use types::{
    ModuleEvent, ModuleEventKind, ModuleId, ModuleState, RunResult, TestCase, TestOutcome,
    TestSuite,
};
