//! Tracked set of active test providers
//!
//! The registry is the dynamic part of the catalog: providers register and
//! unregister at arbitrary times as modules come and go. Readers get a
//! consistent snapshot plus a monotonic tracking count, so the coordinator
//! can detect membership changes without polling provider content.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use crate::traits::TestsProvider;

/// Thread-safe registry of currently active [`TestsProvider`]s
pub struct ProviderRegistry {
    providers: RwLock<Vec<Arc<dyn TestsProvider>>>,
    tracking_count: AtomicU64,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(Vec::new()),
            tracking_count: AtomicU64::new(0),
        }
    }

    /// Register a provider. A provider with the same service id replaces
    /// the previous registration.
    pub fn register(&self, provider: Arc<dyn TestsProvider>) {
        let service_id = provider.service_id();
        {
            let mut providers = self.providers.write().expect("registry lock poisoned");
            providers.retain(|p| p.service_id() != service_id);
            providers.push(provider);
            info!("Registered tests provider '{}', {} active", service_id, providers.len());
        }
        self.tracking_count.fetch_add(1, Ordering::SeqCst);
    }

    /// Unregister the provider with the given service id, if present
    pub fn unregister(&self, service_id: &str) {
        let removed = {
            let mut providers = self.providers.write().expect("registry lock poisoned");
            let before = providers.len();
            providers.retain(|p| p.service_id() != service_id);
            before != providers.len()
        };
        if removed {
            self.tracking_count.fetch_add(1, Ordering::SeqCst);
            info!("Unregistered tests provider '{}'", service_id);
        } else {
            debug!("Provider '{}' was not registered, nothing to do", service_id);
        }
    }

    /// Consistent snapshot of the currently registered providers, in
    /// registration order
    pub fn snapshot(&self) -> Vec<Arc<dyn TestsProvider>> {
        self.providers.read().expect("registry lock poisoned").clone()
    }

    /// Monotonic counter bumped on every membership change
    pub fn tracking_count(&self) -> u64 {
        self.tracking_count.load(Ordering::SeqCst)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
