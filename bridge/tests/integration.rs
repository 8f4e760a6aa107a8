//! End-to-end tests: a memory module runtime, a full bridge on top of it,
//! and runs driven the way the HTTP layer drives them.

mod common;

use std::sync::Arc;
use std::time::Duration;

use bridge::core::readiness::StartupConfig;
use bridge::error::BridgeError;
use bridge::services::module_scanner::TEST_REGEXP_HEADER;
use bridge::TestBridge;
use shared::{
    LifecycleEvent, MemoryModuleBuilder, MemoryModuleRuntime, ModuleRuntime, PrefixTestSelector,
    TestCase, TestSuite,
};

use common::{passing_suite, start_engine_module, start_test_module, wait_for, CapturingReporter};

fn boot(runtime: &Arc<MemoryModuleRuntime>) -> TestBridge {
    TestBridge::start(
        Arc::clone(runtime) as Arc<dyn ModuleRuntime>,
        StartupConfig::new(Duration::from_millis(100)),
    )
}

#[tokio::test]
async fn discovered_tests_run_through_a_tracked_engine() {
    let runtime = Arc::new(MemoryModuleRuntime::new());
    start_engine_module(&runtime, "engine");
    start_test_module(
        &runtime,
        "tests",
        vec![
            TestSuite::new(
                "org.example.ATest",
                vec![TestCase::passing("passes"), TestCase::failing("fails", "boom")],
            ),
            passing_suite("org.example.BTest"),
        ],
    );
    let bridge = boot(&runtime);
    wait_for(|| bridge.coordinator.get_test_names(None).len() == 2).await;

    let reporter = CapturingReporter::new();
    bridge.coordinator.execute_tests(&reporter, None).await.unwrap();

    let result = reporter.listener.final_result().unwrap();
    assert_eq!(result.run_count, 3);
    assert_eq!(result.failure_count, 1);
    assert!(!result.was_successful());

    let events = reporter.listener.events();
    assert_eq!(events.first(), Some(&LifecycleEvent::RunStarted));
    assert!(events.contains(&LifecycleEvent::TestFailed {
        name: "org.example.ATest#fails".to_string(),
        cause: "boom".to_string(),
    }));
    assert!(matches!(events.last(), Some(LifecycleEvent::RunFinished(_))));
    assert_eq!(reporter.titles()[0], "Running tests");

    bridge.shutdown();
}

#[tokio::test]
async fn selector_narrows_the_run_to_one_class() {
    let runtime = Arc::new(MemoryModuleRuntime::new());
    start_engine_module(&runtime, "engine");
    start_test_module(
        &runtime,
        "tests",
        vec![passing_suite("org.example.ATest"), passing_suite("org.example.BTest")],
    );
    let bridge = boot(&runtime);
    wait_for(|| bridge.coordinator.get_test_names(None).len() == 2).await;

    let reporter = CapturingReporter::new();
    let selector = PrefixTestSelector::new("org.example.ATest");
    bridge.coordinator.execute_tests(&reporter, Some(&selector)).await.unwrap();

    let result = reporter.listener.final_result().unwrap();
    assert_eq!(result.run_count, 1);
    assert!(reporter
        .listener
        .events()
        .contains(&LifecycleEvent::TestFinished("org.example.ATest#works".to_string())));

    bridge.shutdown();
}

#[tokio::test]
async fn method_selector_runs_a_single_case() {
    let runtime = Arc::new(MemoryModuleRuntime::new());
    start_engine_module(&runtime, "engine");
    start_test_module(
        &runtime,
        "tests",
        vec![TestSuite::new(
            "org.example.ATest",
            vec![TestCase::passing("first"), TestCase::passing("second")],
        )],
    );
    let bridge = boot(&runtime);
    wait_for(|| !bridge.coordinator.get_test_names(None).is_empty()).await;

    let reporter = CapturingReporter::new();
    let selector = PrefixTestSelector::new("org.example.ATest").with_method("second");
    bridge.coordinator.execute_tests(&reporter, Some(&selector)).await.unwrap();

    let result = reporter.listener.final_result().unwrap();
    assert_eq!(result.run_count, 1);
    let events = reporter.listener.events();
    assert!(events.contains(&LifecycleEvent::TestFinished("org.example.ATest#second".to_string())));
    assert!(!events.contains(&LifecycleEvent::TestStarted("org.example.ATest#first".to_string())));

    bridge.shutdown();
}

#[tokio::test]
async fn stopped_module_leaves_the_catalog_and_runs_fail() {
    let runtime = Arc::new(MemoryModuleRuntime::new());
    start_engine_module(&runtime, "engine");
    let tests = start_test_module(&runtime, "tests", vec![passing_suite("org.example.ATest")]);
    let bridge = boot(&runtime);
    wait_for(|| !bridge.coordinator.get_test_names(None).is_empty()).await;

    runtime.stop(tests);
    wait_for(|| bridge.coordinator.get_test_names(None).is_empty()).await;

    let reporter = CapturingReporter::new();
    let err = bridge.coordinator.execute_tests(&reporter, None).await.unwrap_err();
    assert!(matches!(err, BridgeError::NoTestCasesFound));

    bridge.shutdown();
}

#[tokio::test]
async fn module_update_replaces_its_contribution() {
    let runtime = Arc::new(MemoryModuleRuntime::new());
    start_engine_module(&runtime, "engine");
    let tests = start_test_module(&runtime, "tests", vec![passing_suite("org.example.OldTest")]);
    let bridge = boot(&runtime);
    wait_for(|| bridge.coordinator.get_test_names(None) == ["org.example.OldTest"]).await;

    runtime.update(tests, |m| {
        m.set_suites(vec![passing_suite("org.example.NewTest")]);
    });
    wait_for(|| bridge.coordinator.get_test_names(None) == ["org.example.NewTest"]).await;

    bridge.shutdown();
}

#[tokio::test]
async fn header_pattern_limits_what_a_module_contributes() {
    let runtime = Arc::new(MemoryModuleRuntime::new());
    let bridge = boot(&runtime);

    runtime.install_started(
        MemoryModuleBuilder::new("smoke-tests")
            .header(TEST_REGEXP_HEADER, r"org\.example\..*SmokeSuite")
            .suite(passing_suite("org.example.LoginSmokeSuite"))
            .suite(passing_suite("org.example.UnitTest")),
    );
    runtime.install_started(MemoryModuleBuilder::new("no-header").suite(passing_suite("x.Hidden")));

    wait_for(|| !bridge.coordinator.get_test_names(None).is_empty()).await;
    assert_eq!(
        bridge.coordinator.get_test_names(None),
        vec!["org.example.LoginSmokeSuite".to_string()]
    );

    bridge.shutdown();
}

#[tokio::test]
async fn unclaimed_suite_style_is_reported_ignored() {
    let runtime = Arc::new(MemoryModuleRuntime::new());
    start_engine_module(&runtime, "engine");
    start_test_module(
        &runtime,
        "tests",
        vec![passing_suite("org.example.ExoticTest").with_style("exotic")],
    );
    let bridge = boot(&runtime);
    wait_for(|| !bridge.coordinator.get_test_names(None).is_empty()).await;

    let reporter = CapturingReporter::new();
    bridge.coordinator.execute_tests(&reporter, None).await.unwrap();

    let result = reporter.listener.final_result().unwrap();
    assert_eq!(result.run_count, 0);
    assert_eq!(result.ignored_count, 1);

    bridge.shutdown();
}

#[tokio::test(start_paused = true)]
async fn first_run_waits_for_straggler_modules() {
    let runtime = Arc::new(MemoryModuleRuntime::new());
    start_engine_module(&runtime, "engine");
    start_test_module(&runtime, "tests", vec![passing_suite("org.example.ATest")]);
    // installed but never started, so the readiness gate has to time out
    runtime.install(MemoryModuleBuilder::new("straggler"));

    let bridge = TestBridge::start(
        Arc::clone(&runtime) as Arc<dyn ModuleRuntime>,
        StartupConfig::new(Duration::from_secs(3)),
    );
    wait_for(|| !bridge.coordinator.get_test_names(None).is_empty()).await;

    let start = tokio::time::Instant::now();
    let reporter = CapturingReporter::new();
    bridge.coordinator.execute_tests(&reporter, None).await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(3));

    // gate is one-shot, the second run is immediate
    let start = tokio::time::Instant::now();
    let reporter = CapturingReporter::new();
    bridge.coordinator.execute_tests(&reporter, None).await.unwrap();
    assert!(start.elapsed() < Duration::from_secs(1));

    bridge.shutdown();
}

#[tokio::test]
async fn shutdown_stops_tracking_new_modules() {
    let runtime = Arc::new(MemoryModuleRuntime::new());
    let bridge = boot(&runtime);
    bridge.shutdown();

    start_test_module(&runtime, "late-tests", vec![passing_suite("org.example.LateTest")]);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(bridge.coordinator.get_test_names(None).is_empty());
}
