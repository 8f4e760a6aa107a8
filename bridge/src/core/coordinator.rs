//! Test catalog and run coordination
//!
//! The coordinator merges test names from all currently tracked providers
//! into one catalog, owns the system-readiness gate, and drives execution
//! through a pluggable strategy. The catalog is rebuilt, never patched, when
//! the provider set or any provider's content changes; membership changes
//! are detected through the registry's tracking count so a quiescent system
//! never rebuilds per request.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use shared::{Reporter, TestSelector, TestSuite};
use tracing::{debug, info, warn};

use crate::core::readiness::SystemReadiness;
use crate::error::{BridgeError, BridgeResult};
use crate::services::provider_registry::ProviderRegistry;
use crate::traits::{ExecutionStrategy, TestsProvider};

struct CatalogState {
    /// Registry tracking count at the last provider refresh, None before
    /// the first refresh
    last_tracking_count: Option<u64>,
    providers: Vec<Arc<dyn TestsProvider>>,
    /// Merged view: test name to owning provider's service id. On name
    /// collisions the last provider processed during rebuild wins; callers
    /// must not rely on which one that is.
    tests: BTreeMap<String, String>,
    last_modified: HashMap<String, u64>,
}

/// Central aggregation point for test discovery and execution
pub struct TestCoordinator {
    registry: Arc<ProviderRegistry>,
    readiness: SystemReadiness,
    strategy: RwLock<Option<Arc<dyn ExecutionStrategy>>>,
    catalog: Mutex<CatalogState>,
}

impl TestCoordinator {
    pub fn new(registry: Arc<ProviderRegistry>, readiness: SystemReadiness) -> Self {
        Self {
            registry,
            readiness,
            strategy: RwLock::new(None),
            catalog: Mutex::new(CatalogState {
                last_tracking_count: None,
                providers: Vec::new(),
                tests: BTreeMap::new(),
                last_modified: HashMap::new(),
            }),
        }
    }

    /// Install the strategy used by [`TestCoordinator::execute_tests`]
    pub fn set_strategy(&self, strategy: Arc<dyn ExecutionStrategy>) {
        *self.strategy.write().expect("coordinator lock poisoned") = Some(strategy);
    }

    pub fn readiness(&self) -> &SystemReadiness {
        &self.readiness
    }

    /// Names of available tests, optionally filtered by a selector, in
    /// lexical order
    pub fn get_test_names(&self, selector: Option<&dyn TestSelector>) -> Vec<String> {
        let mut catalog = self.catalog.lock().expect("coordinator lock poisoned");
        self.maybe_update_providers(&mut catalog);
        self.maybe_reload_tests(&mut catalog);

        let all: Vec<String> = catalog.tests.keys().cloned().collect();
        match selector {
            None => {
                debug!("No test selector supplied, returning all {} tests", all.len());
                all
            }
            Some(selector) => {
                let selected: Vec<String> = all
                    .into_iter()
                    .filter(|name| selector.accept_test_name(name))
                    .collect();
                debug!(
                    "{} selected {} tests out of {}",
                    selector,
                    selected.len(),
                    catalog.tests.len()
                );
                selected
            }
        }
    }

    /// Resolve a test name against the currently tracked providers.
    ///
    /// This is a live query, not a lookup in the cached catalog, so a
    /// module that vanished since the last rebuild is reported as gone.
    pub fn get_test_suite(&self, test_name: &str) -> BridgeResult<TestSuite> {
        let providers = {
            let mut catalog = self.catalog.lock().expect("coordinator lock poisoned");
            self.maybe_update_providers(&mut catalog);
            catalog.providers.clone()
        };
        for provider in providers {
            if provider.test_names().iter().any(|n| n == test_name) {
                debug!(
                    "Using provider '{}' to create test class {}",
                    provider.service_id(),
                    test_name
                );
                return provider.create_test_suite(test_name);
            }
        }
        Err(BridgeError::ClassNotFound {
            class_name: test_name.to_string(),
        })
    }

    /// List tests using the supplied reporter
    pub fn list_tests(&self, test_names: &[String], reporter: &dyn Reporter) {
        reporter.title(2, "Test classes");
        let note = "The test set can be restricted using partial test names \
                    as a suffix to this URL, followed by the appropriate \
                    extension, like 'com.example.foo.tests.html'";
        reporter.info("note", note);
        reporter.list("testNames", test_names);
    }

    /// Execute the selected tests and report results through the reporter's
    /// run listener.
    ///
    /// Fails with [`BridgeError::NoTestCasesFound`] when the selection is
    /// empty, so front ends can answer 404 instead of a generic error.
    pub async fn execute_tests(
        &self,
        reporter: &dyn Reporter,
        selector: Option<&dyn TestSelector>,
    ) -> BridgeResult<()> {
        reporter.title(2, "Running tests");
        self.readiness.wait_for_startup().await;

        let test_names = self.get_test_names(selector);
        if test_names.is_empty() {
            return Err(BridgeError::NoTestCasesFound);
        }

        let strategy = self
            .strategy
            .read()
            .expect("coordinator lock poisoned")
            .clone()
            .ok_or_else(|| BridgeError::EngineFailure {
                message: "no execution strategy configured".to_string(),
            })?;
        info!("Executing {} tests", test_names.len());
        strategy.execute(reporter, &test_names, selector).await
    }

    /// Resolve the already-selected test names into a concrete request.
    ///
    /// The two factories let each execution strategy build its own request
    /// shape while the selection rules live here once: a single-method
    /// restriction is only meaningful against exactly one matched class.
    pub fn create_test_request<R>(
        &self,
        test_names: &[String],
        selector: Option<&dyn TestSelector>,
        method_factory: impl FnOnce(TestSuite, &str) -> R,
        classes_factory: impl FnOnce(Vec<TestSuite>) -> R,
    ) -> BridgeResult<R> {
        let mut suites = Vec::new();
        for name in test_names {
            match self.get_test_suite(name) {
                Ok(suite) => suites.push(suite),
                Err(e) => warn!("Failed to find test class '{}': {}", name, e),
            }
        }
        if suites.is_empty() {
            return Err(BridgeError::NoTestCasesFound);
        }

        let method_name = selector.and_then(|s| s.selected_test_method());
        match method_name {
            Some(method_name) if suites.len() == 1 => {
                let suite = suites.remove(0);
                debug!("Running test method {} from test class {}", method_name, suite.class_name);
                Ok(method_factory(suite, method_name))
            }
            Some(method_name) => Err(BridgeError::MethodSelectorAmbiguous {
                method_name: method_name.to_string(),
                matched_classes: suites.len(),
            }),
            None => Ok(classes_factory(suites)),
        }
    }

    /// Refresh the provider snapshot if the registry membership changed
    fn maybe_update_providers(&self, catalog: &mut CatalogState) {
        let tracking_count = self.registry.tracking_count();
        if catalog.last_tracking_count == Some(tracking_count) {
            return;
        }
        catalog.providers = self.registry.snapshot();
        catalog.last_modified.clear();
        catalog.last_tracking_count = Some(tracking_count);
        info!("Updated list of tests providers, {} active", catalog.providers.len());
    }

    /// Rebuild the merged name catalog if any provider reported changes
    fn maybe_reload_tests(&self, catalog: &mut CatalogState) {
        let emptied_out = catalog.providers.is_empty() && !catalog.tests.is_empty();
        let reload = emptied_out
            || catalog.providers.iter().any(|p| {
                catalog.last_modified.get(&p.service_id()) != Some(&p.last_modified())
            });
        if !reload {
            return;
        }

        catalog.tests.clear();
        let providers = catalog.providers.clone();
        for provider in providers {
            let service_id = provider.service_id();
            catalog.last_modified.insert(service_id.clone(), provider.last_modified());
            let names = provider.test_names();
            debug!("Added {} test names from provider '{}'", names.len(), service_id);
            for name in names {
                catalog.tests.insert(name, service_id.clone());
            }
        }
        info!(
            "Test names reloaded, total {} names from {} providers",
            catalog.tests.len(),
            catalog.providers.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::readiness::StartupConfig;
    use crate::traits::MockTestsProvider;
    use shared::{MemoryModuleRuntime, PrefixTestSelector, TestCase};
    use std::time::Duration;

    fn provider(id: &str, names: Vec<&str>) -> Arc<dyn TestsProvider> {
        let mut mock = MockTestsProvider::new();
        mock.expect_service_id().return_const(id.to_string());
        let owned: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        mock.expect_test_names().returning(move || owned.clone());
        mock.expect_last_modified().return_const(1u64);
        mock.expect_create_test_suite().returning(|name| {
            Ok(TestSuite::new(name, vec![TestCase::passing("ok")]))
        });
        Arc::new(mock)
    }

    fn coordinator(registry: Arc<ProviderRegistry>) -> TestCoordinator {
        let runtime = Arc::new(MemoryModuleRuntime::new());
        let readiness = SystemReadiness::new(runtime, StartupConfig::new(Duration::from_secs(1)));
        TestCoordinator::new(registry, readiness)
    }

    #[test]
    fn disjoint_providers_merge_to_the_sum() {
        let registry = Arc::new(ProviderRegistry::new());
        registry.register(provider("x", vec!["pkg.A"]));
        registry.register(provider("y", vec!["pkg.B", "pkg.C"]));
        let coordinator = coordinator(Arc::clone(&registry));

        assert_eq!(coordinator.get_test_names(None).len(), 3);
    }

    #[test]
    fn colliding_name_has_exactly_one_owner() {
        let registry = Arc::new(ProviderRegistry::new());
        registry.register(provider("x", vec!["pkg.Shared"]));
        registry.register(provider("y", vec!["pkg.Shared"]));
        let coordinator = coordinator(Arc::clone(&registry));

        assert_eq!(coordinator.get_test_names(None), vec!["pkg.Shared".to_string()]);
    }

    #[test]
    fn selector_filters_names() {
        let registry = Arc::new(ProviderRegistry::new());
        registry.register(provider("x", vec!["pkg.A"]));
        registry.register(provider("y", vec!["pkg.B"]));
        let coordinator = coordinator(Arc::clone(&registry));

        let selector = PrefixTestSelector::new("pkg.A");
        assert_eq!(
            coordinator.get_test_names(Some(&selector)),
            vec!["pkg.A".to_string()]
        );
    }

    #[test]
    fn provider_changes_are_picked_up() {
        let registry = Arc::new(ProviderRegistry::new());
        registry.register(provider("x", vec!["pkg.A"]));
        let coordinator = coordinator(Arc::clone(&registry));
        assert_eq!(coordinator.get_test_names(None), vec!["pkg.A".to_string()]);

        registry.register(provider("y", vec!["pkg.B"]));
        assert_eq!(coordinator.get_test_names(None).len(), 2);

        registry.unregister("x");
        assert_eq!(coordinator.get_test_names(None), vec!["pkg.B".to_string()]);
    }

    #[test]
    fn unknown_test_name_is_class_not_found() {
        let registry = Arc::new(ProviderRegistry::new());
        registry.register(provider("x", vec!["pkg.A"]));
        let coordinator = coordinator(Arc::clone(&registry));

        assert!(coordinator.get_test_suite("pkg.A").is_ok());
        let err = coordinator.get_test_suite("pkg.Missing").unwrap_err();
        assert!(matches!(err, BridgeError::ClassNotFound { .. }));
    }

    #[test]
    fn method_selector_against_many_classes_fails_loudly() {
        let registry = Arc::new(ProviderRegistry::new());
        registry.register(provider("x", vec!["pkg.A", "pkg.B"]));
        let coordinator = coordinator(Arc::clone(&registry));

        let selector = PrefixTestSelector::new("pkg").with_method("testSomething");
        let names = coordinator.get_test_names(Some(&selector));
        let err = coordinator
            .create_test_request(&names, Some(&selector), |_, _| (), |_| ())
            .unwrap_err();
        assert!(matches!(err, BridgeError::MethodSelectorAmbiguous { matched_classes: 2, .. }));
    }

    #[test]
    fn method_selector_against_one_class_builds_method_request() {
        let registry = Arc::new(ProviderRegistry::new());
        registry.register(provider("x", vec!["pkg.A"]));
        let coordinator = coordinator(Arc::clone(&registry));

        let selector = PrefixTestSelector::new("pkg.A").with_method("testSomething");
        let names = coordinator.get_test_names(Some(&selector));
        let built = coordinator
            .create_test_request(
                &names,
                Some(&selector),
                |suite, method| format!("{}#{}", suite.class_name, method),
                |_| "classes".to_string(),
            )
            .unwrap();
        assert_eq!(built, "pkg.A#testSomething");
    }

    #[test]
    fn empty_selection_resolves_to_no_test_cases_found() {
        let registry = Arc::new(ProviderRegistry::new());
        let coordinator = coordinator(Arc::clone(&registry));
        let err = coordinator
            .create_test_request(&[], None, |_, _| (), |_| ())
            .unwrap_err();
        assert!(matches!(err, BridgeError::NoTestCasesFound));
    }
}
