//! Dynamic discovery of test engines
//!
//! Engines are deployed inside modules and tracked the same way test classes
//! are, but they are consumed only transiently per run: no catalog of engine
//! names is kept, just the currently available set. An engine shipped in a
//! module that is later removed stops being offered to new runs without any
//! restart of this subsystem.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock};

use shared::{ModuleEventKind, ModuleId, ModuleRuntime, ModuleState, TestEngine};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Tracks modules for exported test-engine implementations
pub struct EngineTracker {
    runtime: Arc<dyn ModuleRuntime>,
    tracked: RwLock<BTreeMap<ModuleId, Vec<Arc<dyn TestEngine>>>>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl EngineTracker {
    /// Collect engines from already-started modules and begin following
    /// lifecycle events
    pub fn open(runtime: Arc<dyn ModuleRuntime>) -> Arc<Self> {
        let mut events = runtime.subscribe();

        let tracker = Arc::new(Self {
            runtime,
            tracked: RwLock::new(BTreeMap::new()),
            watcher: Mutex::new(None),
        });
        tracker.rescan_all();

        let tracked = Arc::clone(&tracker);
        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => match event.kind {
                        ModuleEventKind::Started | ModuleEventKind::Updated => {
                            tracked.scan_module(event.module);
                        }
                        ModuleEventKind::Stopped => {
                            tracked.retract(event.module);
                        }
                    },
                    Err(RecvError::Lagged(missed)) => {
                        warn!("Missed {} module events, rescanning engines", missed);
                        tracked.rescan_all();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        *tracker.watcher.lock().expect("tracker lock poisoned") = Some(handle);
        tracker
    }

    pub fn close(&self) {
        if let Some(handle) = self.watcher.lock().expect("tracker lock poisoned").take() {
            handle.abort();
        }
    }

    /// The engines currently visible to new runs
    pub fn available_engines(&self) -> Vec<Arc<dyn TestEngine>> {
        self.tracked
            .read()
            .expect("tracker lock poisoned")
            .values()
            .flatten()
            .cloned()
            .collect()
    }

    /// Full resynchronization. A lagged event receiver may have missed
    /// Stopped events, so everything tracked is dropped and rebuilt from
    /// the modules that are active right now.
    fn rescan_all(&self) {
        self.tracked.write().expect("tracker lock poisoned").clear();
        for module in self.runtime.modules() {
            if module.state() == ModuleState::Active {
                self.scan_module(module.id());
            }
        }
    }

    fn scan_module(&self, id: ModuleId) {
        let Some(module) = self.runtime.module(id) else {
            debug!(module = %id, "Module vanished before engine scan");
            return;
        };
        let engines = module.test_engines();
        let mut tracked = self.tracked.write().expect("tracker lock poisoned");
        if engines.is_empty() {
            tracked.remove(&id);
        } else {
            for engine in &engines {
                info!("Found test engine '{}' in module '{}'", engine.id(), module.symbolic_name());
            }
            tracked.insert(id, engines);
        }
    }

    fn retract(&self, id: ModuleId) {
        if self.tracked.write().expect("tracker lock poisoned").remove(&id).is_some() {
            debug!(module = %id, "Engines of stopped module withdrawn");
        }
    }
}

impl Drop for EngineTracker {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{MemoryModuleBuilder, MemoryModuleRuntime, Module, SuiteTestEngine};
    use std::time::Duration;

    #[tokio::test]
    async fn engines_follow_module_lifecycle() {
        let runtime = Arc::new(MemoryModuleRuntime::new());
        let tracker = EngineTracker::open(Arc::clone(&runtime) as Arc<dyn ModuleRuntime>);
        assert!(tracker.available_engines().is_empty());

        let module = runtime.install(
            MemoryModuleBuilder::new("engine-module").engine(Arc::new(SuiteTestEngine::new())),
        );
        runtime.start(module.id());
        wait_for(|| tracker.available_engines().len() == 1).await;

        runtime.stop(module.id());
        wait_for(|| tracker.available_engines().is_empty()).await;

        tracker.close();
    }

    #[tokio::test]
    async fn engines_of_already_started_modules_are_visible() {
        let runtime = Arc::new(MemoryModuleRuntime::new());
        let module = runtime.install(
            MemoryModuleBuilder::new("early-engines")
                .engine(Arc::new(SuiteTestEngine::new()))
                .engine(Arc::new(SuiteTestEngine::for_style("exotic"))),
        );
        runtime.start(module.id());

        let tracker = EngineTracker::open(Arc::clone(&runtime) as Arc<dyn ModuleRuntime>);
        assert_eq!(tracker.available_engines().len(), 2);
    }

    #[tokio::test]
    async fn rescan_withdraws_engines_of_modules_that_stopped_unnoticed() {
        let runtime = Arc::new(MemoryModuleRuntime::new());
        let module = runtime.install(
            MemoryModuleBuilder::new("engine-module").engine(Arc::new(SuiteTestEngine::new())),
        );
        runtime.start(module.id());
        let tracker = EngineTracker::open(Arc::clone(&runtime) as Arc<dyn ModuleRuntime>);
        assert_eq!(tracker.available_engines().len(), 1);

        // state change without an event, as when the receiver lagged past
        // the Stopped notification
        module.set_state(ModuleState::Resolved);
        tracker.rescan_all();
        assert!(tracker.available_engines().is_empty());
    }

    async fn wait_for<F: Fn() -> bool>(predicate: F) {
        for _ in 0..200 {
            if predicate() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }
}
