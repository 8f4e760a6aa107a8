//! Test bridge core
//!
//! Lets externally supplied test suites run inside a live, already-booted
//! module runtime. Test classes and test engines arrive and leave
//! dynamically as modules are installed, updated and removed; the bridge
//! keeps a merged catalog of everything currently available, gates the first
//! run on system readiness, and normalizes heterogeneous engines into one
//! lifecycle event stream.
//!
//! Layers, leaves first:
//! - [`services::module_scanner`] / [`services::engine_tracker`] follow the
//!   runtime's module events,
//! - [`services::provider_registry`] tracks active test-class sources,
//! - [`core::coordinator`] merges the catalog and owns the readiness gate,
//! - [`services::direct_strategy`] and [`services::platform_strategy`] run
//!   the selected tests, the latter through [`core::launcher`] and
//!   [`core::run_adapter`].

pub mod bootstrap;
pub mod core;
pub mod error;
pub mod services;
pub mod traits;

pub use bootstrap::TestBridge;
pub use error::{BridgeError, BridgeResult};
pub use traits::{ExecutionStrategy, TestsProvider};
