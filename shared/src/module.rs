//! Host-runtime module abstraction
//!
//! The bridge never talks to a concrete component container; it sees modules
//! through these traits. A module is an independently deployable unit that
//! carries metadata headers, enumerable class entries and optionally exported
//! test engines. Lifecycle changes are published on a broadcast channel so
//! several trackers can follow the same runtime.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::engine::TestEngine;
use crate::errors::SharedResult;
use crate::types::{ModuleEvent, ModuleId, ModuleState, TestSuite};

/// Header marking a module as a fragment. Fragments attach to a host module
/// and never reach the Active state themselves.
pub const FRAGMENT_HOST_HEADER: &str = "Fragment-Host";

/// A single module as seen by the bridge
pub trait Module: Send + Sync {
    fn id(&self) -> ModuleId;

    fn symbolic_name(&self) -> &str;

    fn state(&self) -> ModuleState;

    /// Value of a metadata header, if declared
    fn header(&self, name: &str) -> Option<String>;

    /// All class entries reachable inside the module, as resource paths
    /// like `org/example/FooTest.class`, in discovery order.
    fn class_entries(&self) -> Vec<String>;

    /// Load the suite behind a fully qualified class name.
    ///
    /// Fails with `SharedError::ClassNotFound` if the module does not
    /// contain that class.
    fn load_suite(&self, class_name: &str) -> SharedResult<TestSuite>;

    /// Test engines exported by this module, if any
    fn test_engines(&self) -> Vec<Arc<dyn TestEngine>>;

    fn is_fragment(&self) -> bool {
        self.header(FRAGMENT_HOST_HEADER).is_some()
    }
}

/// The host runtime: a live view of all modules plus lifecycle notifications
pub trait ModuleRuntime: Send + Sync {
    /// Snapshot of all modules currently known to the runtime
    fn modules(&self) -> Vec<Arc<dyn Module>>;

    /// Look up one module by id
    fn module(&self, id: ModuleId) -> Option<Arc<dyn Module>>;

    /// Subscribe to module lifecycle events. Each subscriber gets every
    /// event published after the call.
    fn subscribe(&self) -> broadcast::Receiver<ModuleEvent>;
}
