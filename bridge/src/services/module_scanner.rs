//! Module-sourced test discovery
//!
//! One concrete [`TestsProvider`]: watches module lifecycle events, inspects
//! each started module for a declared test-pattern header and matching class
//! entries, and publishes the matching class names as that module's
//! contribution. Contributions are replaced on update and retracted on stop.
//! No suite is loaded during discovery, only in `create_test_suite`.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use regex::Regex;
use shared::{Module, ModuleEventKind, ModuleId, ModuleRuntime, TestSuite};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{BridgeError, BridgeResult};
use crate::traits::TestsProvider;

/// Module header declaring a regular expression matched against fully
/// qualified class names. Modules without it contribute nothing.
pub const TEST_REGEXP_HEADER: &str = "Test-Suite-Regexp";

const CLASS_SUFFIX: &str = ".class";

/// A [`TestsProvider`] that gets test classes from modules carrying a
/// [`TEST_REGEXP_HEADER`] and corresponding class entries
pub struct ModuleTestsProvider {
    runtime: Arc<dyn ModuleRuntime>,
    tracked: RwLock<BTreeMap<ModuleId, Vec<String>>>,
    last_modified: AtomicU64,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl ModuleTestsProvider {
    /// Scan already-started modules and begin following lifecycle events
    pub fn open(runtime: Arc<dyn ModuleRuntime>) -> Arc<Self> {
        // Subscribe before the initial scan so no event can fall between
        let mut events = runtime.subscribe();

        let provider = Arc::new(Self {
            runtime,
            tracked: RwLock::new(BTreeMap::new()),
            last_modified: AtomicU64::new(0),
            watcher: Mutex::new(None),
        });
        provider.rescan_all();

        let tracked = Arc::clone(&provider);
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
                        warn!("Missed {} module events, rescanning all modules", missed);
                        tracked.rescan_all();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        *provider.watcher.lock().expect("scanner lock poisoned") = Some(handle);
        provider
    }

    /// Stop following module events. Tracked contributions stay readable.
    pub fn close(&self) {
        if let Some(handle) = self.watcher.lock().expect("scanner lock poisoned").take() {
            handle.abort();
        }
    }

    /// Full resynchronization. A lagged event receiver may have missed
    /// Stopped events, so everything tracked is dropped and rebuilt from
    /// the modules that are active right now.
    fn rescan_all(&self) {
        let dropped = {
            let mut tracked = self.tracked.write().expect("scanner lock poisoned");
            let dropped = !tracked.is_empty();
            tracked.clear();
            dropped
        };
        if dropped {
            self.last_modified.fetch_add(1, Ordering::SeqCst);
        }
        for module in self.runtime.modules() {
            if module.state() == shared::ModuleState::Active {
                self.scan_module(module.id());
            }
        }
    }

    fn scan_module(&self, id: ModuleId) {
        let Some(module) = self.runtime.module(id) else {
            debug!(module = %id, "Module vanished before scan");
            return;
        };
        let names = discover_test_classes(module.as_ref());
        let mut tracked = self.tracked.write().expect("scanner lock poisoned");
        let changed = if names.is_empty() {
            tracked.remove(&id).is_some()
        } else {
            info!("{} test classes found in module '{}'", names.len(), module.symbolic_name());
            tracked.insert(id, names);
            true
        };
        drop(tracked);
        if changed {
            self.last_modified.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn retract(&self, id: ModuleId) {
        let removed = self
            .tracked
            .write()
            .expect("scanner lock poisoned")
            .remove(&id)
            .is_some();
        if removed {
            debug!(module = %id, "Retracted test contribution of stopped module");
            self.last_modified.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Drop for ModuleTestsProvider {
    fn drop(&mut self) {
        self.close();
    }
}

impl TestsProvider for ModuleTestsProvider {
    fn service_id(&self) -> String {
        "module-tests-provider".to_string()
    }

    fn test_names(&self) -> Vec<String> {
        self.tracked
            .read()
            .expect("scanner lock poisoned")
            .values()
            .flatten()
            .cloned()
            .collect()
    }

    fn create_test_suite(&self, test_name: &str) -> BridgeResult<TestSuite> {
        let owner = self
            .tracked
            .read()
            .expect("scanner lock poisoned")
            .iter()
            .find(|(_, names)| names.iter().any(|n| n == test_name))
            .map(|(id, _)| *id);
        let Some(owner) = owner else {
            return Err(BridgeError::ClassNotFound {
                class_name: test_name.to_string(),
            });
        };
        let module = self
            .runtime
            .module(owner)
            .ok_or_else(|| BridgeError::ClassNotFound {
                class_name: test_name.to_string(),
            })?;
        debug!(module = %owner, "Loading test class {}", test_name);
        Ok(module.load_suite(test_name)?)
    }

    fn last_modified(&self) -> u64 {
        self.last_modified.load(Ordering::SeqCst)
    }
}

/// Names of the test classes a module provides, in discovery order,
/// deduplicated. Empty when the header is missing or its pattern invalid.
fn discover_test_classes(module: &dyn Module) -> Vec<String> {
    let Some(header_value) = module.header(TEST_REGEXP_HEADER) else {
        debug!(
            "Module '{}' does not have {} header, not looking for test classes",
            module.symbolic_name(),
            TEST_REGEXP_HEADER
        );
        return Vec::new();
    };

    let pattern = match Regex::new(&header_value) {
        Ok(pattern) => pattern,
        Err(_) => {
            warn!(
                "Module '{}' has an invalid pattern for {} header, ignored: '{}'",
                module.symbolic_name(),
                TEST_REGEXP_HEADER,
                header_value
            );
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for entry in module.class_entries() {
        let Some(name) = to_class_name(&entry) else {
            continue;
        };
        if pattern.is_match(&name) {
            if seen.insert(name.clone()) {
                result.push(name);
            }
        } else {
            debug!(
                "Class '{}' does not match {} pattern '{}' of module '{}', ignored",
                name,
                TEST_REGEXP_HEADER,
                header_value,
                module.symbolic_name()
            );
        }
    }
    result
}

/// Convert a class resource path to a fully qualified class name
fn to_class_name(entry: &str) -> Option<String> {
    let trimmed = entry.trim_start_matches('/');
    let stem = trimmed.strip_suffix(CLASS_SUFFIX)?;
    Some(stem.replace('/', "."))
}
