//! In-memory module runtime
//!
//! The smallest thing that satisfies [`crate::module::ModuleRuntime`]: a
//! tracked map of modules plus a broadcast channel for lifecycle events.
//! Tests drive it directly (install/start/update/stop) and the demo binary
//! boots on it; production deployments plug a real container behind the same
//! traits.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;
use tracing::debug;

use crate::engine::TestEngine;
use crate::errors::{SharedError, SharedResult};
use crate::module::{Module, ModuleRuntime};
use crate::types::{ModuleEvent, ModuleEventKind, ModuleId, ModuleState, TestSuite};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// One module held by the in-memory runtime
pub struct MemoryModule {
    id: ModuleId,
    symbolic_name: String,
    state: RwLock<ModuleState>,
    headers: RwLock<HashMap<String, String>>,
    extra_entries: RwLock<Vec<String>>,
    suites: RwLock<Vec<TestSuite>>,
    engines: RwLock<Vec<Arc<dyn TestEngine>>>,
}

impl MemoryModule {
    pub fn set_state(&self, state: ModuleState) {
        *self.state.write().expect("module lock poisoned") = state;
    }

    pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.headers
            .write()
            .expect("module lock poisoned")
            .insert(name.into(), value.into());
    }

    /// Replace the module's suites wholesale, as a module update would
    pub fn set_suites(&self, suites: Vec<TestSuite>) {
        *self.suites.write().expect("module lock poisoned") = suites;
    }

    pub fn set_engines(&self, engines: Vec<Arc<dyn TestEngine>>) {
        *self.engines.write().expect("module lock poisoned") = engines;
    }

    fn class_entry(class_name: &str) -> String {
        format!("{}.class", class_name.replace('.', "/"))
    }
}

impl Module for MemoryModule {
    fn id(&self) -> ModuleId {
        self.id
    }

    fn symbolic_name(&self) -> &str {
        &self.symbolic_name
    }

    fn state(&self) -> ModuleState {
        *self.state.read().expect("module lock poisoned")
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .read()
            .expect("module lock poisoned")
            .get(name)
            .cloned()
    }

    fn class_entries(&self) -> Vec<String> {
        let mut entries: Vec<String> = self
            .suites
            .read()
            .expect("module lock poisoned")
            .iter()
            .map(|s| Self::class_entry(&s.class_name))
            .collect();
        entries.extend(self.extra_entries.read().expect("module lock poisoned").iter().cloned());
        entries
    }

    fn load_suite(&self, class_name: &str) -> SharedResult<TestSuite> {
        self.suites
            .read()
            .expect("module lock poisoned")
            .iter()
            .find(|s| s.class_name == class_name)
            .cloned()
            .ok_or_else(|| SharedError::ClassNotFound {
                class_name: class_name.to_string(),
            })
    }

    fn test_engines(&self) -> Vec<Arc<dyn TestEngine>> {
        self.engines.read().expect("module lock poisoned").clone()
    }
}

/// Builder for [`MemoryModule`]
pub struct MemoryModuleBuilder {
    symbolic_name: String,
    state: ModuleState,
    headers: HashMap<String, String>,
    extra_entries: Vec<String>,
    suites: Vec<TestSuite>,
    engines: Vec<Arc<dyn TestEngine>>,
}

impl MemoryModuleBuilder {
    pub fn new(symbolic_name: impl Into<String>) -> Self {
        Self {
            symbolic_name: symbolic_name.into(),
            state: ModuleState::Installed,
            headers: HashMap::new(),
            extra_entries: Vec::new(),
            suites: Vec::new(),
            engines: Vec::new(),
        }
    }

    pub fn state(mut self, state: ModuleState) -> Self {
        self.state = state;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn suite(mut self, suite: TestSuite) -> Self {
        self.suites.push(suite);
        self
    }

    /// Additional class entry without a loadable suite behind it, e.g. a
    /// helper class shipped next to the tests
    pub fn class_entry(mut self, resource_path: impl Into<String>) -> Self {
        self.extra_entries.push(resource_path.into());
        self
    }

    pub fn engine(mut self, engine: Arc<dyn TestEngine>) -> Self {
        self.engines.push(engine);
        self
    }
}

/// In-memory implementation of [`ModuleRuntime`]
pub struct MemoryModuleRuntime {
    modules: RwLock<BTreeMap<ModuleId, Arc<MemoryModule>>>,
    next_id: AtomicU64,
    events: broadcast::Sender<ModuleEvent>,
}

impl MemoryModuleRuntime {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            modules: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            events,
        }
    }

    /// Install a module without starting it. No event is published.
    pub fn install(&self, builder: MemoryModuleBuilder) -> Arc<MemoryModule> {
        let id = ModuleId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let module = Arc::new(MemoryModule {
            id,
            symbolic_name: builder.symbolic_name,
            state: RwLock::new(builder.state),
            headers: RwLock::new(builder.headers),
            extra_entries: RwLock::new(builder.extra_entries),
            suites: RwLock::new(builder.suites),
            engines: RwLock::new(builder.engines),
        });
        self.modules
            .write()
            .expect("runtime lock poisoned")
            .insert(id, Arc::clone(&module));
        debug!(module = %id, name = %module.symbolic_name, "Installed module");
        module
    }

    /// Install and immediately start a module
    pub fn install_started(&self, builder: MemoryModuleBuilder) -> Arc<MemoryModule> {
        let module = self.install(builder);
        self.start(module.id());
        module
    }

    /// Move a module to Active and publish a Started event
    pub fn start(&self, id: ModuleId) {
        if let Some(module) = self.memory_module(id) {
            module.set_state(ModuleState::Active);
            self.publish(id, ModuleEventKind::Started);
        }
    }

    /// Apply in-place changes and publish an Updated event
    pub fn update<F>(&self, id: ModuleId, apply: F)
    where
        F: FnOnce(&MemoryModule),
    {
        if let Some(module) = self.memory_module(id) {
            apply(&module);
            self.publish(id, ModuleEventKind::Updated);
        }
    }

    /// Move a module back to Resolved and publish a Stopped event
    pub fn stop(&self, id: ModuleId) {
        if let Some(module) = self.memory_module(id) {
            module.set_state(ModuleState::Resolved);
            self.publish(id, ModuleEventKind::Stopped);
        }
    }

    fn memory_module(&self, id: ModuleId) -> Option<Arc<MemoryModule>> {
        self.modules
            .read()
            .expect("runtime lock poisoned")
            .get(&id)
            .cloned()
    }

    fn publish(&self, module: ModuleId, kind: ModuleEventKind) {
        // Nobody subscribed yet is fine, e.g. during test setup
        let _ = self.events.send(ModuleEvent { module, kind });
    }
}

impl Default for MemoryModuleRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleRuntime for MemoryModuleRuntime {
    fn modules(&self) -> Vec<Arc<dyn Module>> {
        self.modules
            .read()
            .expect("runtime lock poisoned")
            .values()
            .map(|m| Arc::clone(m) as Arc<dyn Module>)
            .collect()
    }

    fn module(&self, id: ModuleId) -> Option<Arc<dyn Module>> {
        self.memory_module(id).map(|m| m as Arc<dyn Module>)
    }

    fn subscribe(&self) -> broadcast::Receiver<ModuleEvent> {
        self.events.subscribe()
    }
}
