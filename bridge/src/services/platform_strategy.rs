//! Pluggable-engine execution strategy
//!
//! Builds a launcher over exactly the engines currently visible through the
//! engine tracker, converts the selection into class or method selectors,
//! and adapts the platform's execution-tree events down to the uniform
//! lifecycle stream. Engines deployed in modules that have since stopped are
//! simply absent from the next run.

use std::sync::Arc;

use shared::{EngineEvent, EngineRequest, Reporter, TestSelector, TestSource};

use crate::core::coordinator::TestCoordinator;
use crate::core::launcher::{LaunchListener, Launcher};
use crate::core::run_adapter::RunListenerAdapter;
use crate::error::BridgeResult;
use crate::services::engine_tracker::EngineTracker;
use crate::traits::ExecutionStrategy;

pub struct PlatformExecutionStrategy {
    coordinator: Arc<TestCoordinator>,
    engines: Arc<EngineTracker>,
}

impl PlatformExecutionStrategy {
    pub fn new(coordinator: Arc<TestCoordinator>, engines: Arc<EngineTracker>) -> Self {
        Self {
            coordinator,
            engines,
        }
    }
}

/// Mirrors class-node starts as per-class titles on the reporter
struct TitleListener<'a> {
    reporter: &'a dyn Reporter,
}

impl LaunchListener for TitleListener<'_> {
    fn plan_started(&self) {}

    fn plan_finished(&self) {}

    fn engine_event(&self, event: &EngineEvent) {
        if let EngineEvent::Started(id) = event {
            if let Some(TestSource::Class(class_name)) = &id.source {
                self.reporter.title(3, class_name);
            }
        }
    }
}

#[async_trait::async_trait]
impl ExecutionStrategy for PlatformExecutionStrategy {
    async fn execute(
        &self,
        reporter: &dyn Reporter,
        test_names: &[String],
        selector: Option<&dyn TestSelector>,
    ) -> BridgeResult<()> {
        let request = self.coordinator.create_test_request(
            test_names,
            selector,
            |suite, method_name| EngineRequest::method(suite, method_name),
            EngineRequest::classes,
        )?;

        let launcher = Launcher::new(self.engines.available_engines());
        let titles = TitleListener { reporter };
        let adapter = RunListenerAdapter::new(reporter.run_listener());
        launcher.execute(&request, &[&titles, &adapter]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::readiness::{StartupConfig, SystemReadiness};
    use crate::error::BridgeError;
    use crate::services::provider_registry::ProviderRegistry;
    use crate::traits::{MockTestsProvider, TestsProvider};
    use shared::{
        LifecycleEvent, MemoryModuleBuilder, MemoryModuleRuntime, Module, ModuleRuntime,
        PrefixTestSelector, RecordingListener, RunListener, SuiteTestEngine, TestCase, TestSuite,
    };
    use std::sync::Mutex;
    use std::time::Duration;

    struct ListenerReporter {
        listener: RecordingListener,
        titles: Mutex<Vec<String>>,
    }

    impl ListenerReporter {
        fn new() -> Self {
            Self {
                listener: RecordingListener::new(),
                titles: Mutex::new(Vec::new()),
            }
        }
    }

    impl Reporter for ListenerReporter {
        fn title(&self, _level: u8, text: &str) {
            self.titles.lock().unwrap().push(text.to_string());
        }
        fn info(&self, _role: &str, _text: &str) {}
        fn list(&self, _role: &str, _items: &[String]) {}
        fn run_listener(&self) -> &dyn RunListener {
            &self.listener
        }
    }

    fn fixture(suites: Vec<TestSuite>) -> (PlatformExecutionStrategy, Vec<String>) {
        let names: Vec<String> = suites.iter().map(|s| s.class_name.clone()).collect();
        let mut mock = MockTestsProvider::new();
        mock.expect_service_id().return_const("fixture".to_string());
        let listed = names.clone();
        mock.expect_test_names().returning(move || listed.clone());
        mock.expect_last_modified().return_const(1u64);
        mock.expect_create_test_suite().returning(move |name| {
            suites
                .iter()
                .find(|s| s.class_name == name)
                .cloned()
                .ok_or(BridgeError::ClassNotFound {
                    class_name: name.to_string(),
                })
        });

        let registry = Arc::new(ProviderRegistry::new());
        registry.register(Arc::new(mock) as Arc<dyn TestsProvider>);

        let runtime = Arc::new(MemoryModuleRuntime::new());
        let engine_module = runtime.install(
            MemoryModuleBuilder::new("engine-module").engine(Arc::new(SuiteTestEngine::new())),
        );
        runtime.start(engine_module.id());

        let readiness = SystemReadiness::new(
            Arc::clone(&runtime) as Arc<dyn ModuleRuntime>,
            StartupConfig::new(Duration::from_secs(1)),
        );
        let coordinator = Arc::new(TestCoordinator::new(registry, readiness));
        let engines = EngineTracker::open(Arc::clone(&runtime) as Arc<dyn ModuleRuntime>);
        (PlatformExecutionStrategy::new(coordinator, engines), names)
    }

    #[tokio::test]
    async fn runs_suites_through_discovered_engines() {
        let (strategy, names) = fixture(vec![TestSuite::new(
            "org.x.PlatformSuite",
            vec![
                TestCase::passing("passes"),
                TestCase::failing("fails", "nope"),
                TestCase::skipped("skips", "later"),
            ],
        )]);
        let reporter = ListenerReporter::new();

        strategy.execute(&reporter, &names, None).await.unwrap();

        let result = reporter.listener.final_result().unwrap();
        assert_eq!(result.run_count, 2);
        assert_eq!(result.failure_count, 1);
        assert_eq!(result.ignored_count, 1);

        // exactly one run-finished closes the stream
        let finishes = reporter
            .listener
            .events()
            .iter()
            .filter(|e| matches!(e, LifecycleEvent::RunFinished(_)))
            .count();
        assert_eq!(finishes, 1);
        assert_eq!(*reporter.titles.lock().unwrap(), vec!["org.x.PlatformSuite".to_string()]);
    }

    #[tokio::test]
    async fn method_selector_reaches_the_engine() {
        let (strategy, names) = fixture(vec![TestSuite::new(
            "org.x.NarrowSuite",
            vec![TestCase::passing("kept"), TestCase::failing("dropped", "x")],
        )]);
        let reporter = ListenerReporter::new();
        let selector = PrefixTestSelector::new("org.x.NarrowSuite").with_method("kept");

        strategy
            .execute(&reporter, &names, Some(&selector))
            .await
            .unwrap();

        let result = reporter.listener.final_result().unwrap();
        assert_eq!(result.run_count, 1);
        assert_eq!(result.failure_count, 0);
    }

    #[tokio::test]
    async fn empty_selection_is_no_test_cases_found() {
        let (strategy, _) = fixture(vec![]);
        let reporter = ListenerReporter::new();
        let err = strategy.execute(&reporter, &[], None).await.unwrap_err();
        assert!(matches!(err, BridgeError::NoTestCasesFound));
    }
}
