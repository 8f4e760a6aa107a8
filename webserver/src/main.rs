//! Test bridge HTTP server entry point
//!
//! Boots an in-memory module runtime seeded with example test modules, a
//! bridge on top of it, and the HTTP front end. A production deployment
//! replaces the seeded runtime with the host container's adapter.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use dotenv::dotenv;
use tokio::signal;

use bridge::core::StartupConfig;
use bridge::services::module_scanner::TEST_REGEXP_HEADER;
use bridge::TestBridge;
use shared::{
    logging, MemoryModuleBuilder, MemoryModuleRuntime, ModuleRuntime, SuiteTestEngine, TestCase,
    TestSuite,
};
use webserver::{AppState, RendererSelector, WebServer, WebServerError, WebServerResult};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "webserver")]
#[command(about = "HTTP front end for the test bridge")]
struct Args {
    /// Port for the HTTP server
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Startup readiness timeout in seconds, overrides the environment
    #[arg(long)]
    startup_timeout_seconds: Option<u64>,
}

#[tokio::main]
async fn main() -> WebServerResult<()> {
    dotenv().ok();
    let args = Args::parse();
    logging::init_tracing_with_level("webserver", Some(&args.log_level));
    logging::log_startup("webserver", &format!("test bridge HTTP server on port {}", args.port));

    let runtime = Arc::new(MemoryModuleRuntime::new());
    seed_example_modules(&runtime);

    let startup = match args.startup_timeout_seconds {
        Some(seconds) => StartupConfig::new(Duration::from_secs(seconds)),
        None => StartupConfig::from_env(),
    };
    let bridge = TestBridge::start(Arc::clone(&runtime) as Arc<dyn ModuleRuntime>, startup);

    let state = AppState::new(
        Arc::clone(&bridge.coordinator),
        Arc::new(RendererSelector::new()),
    );
    let server = WebServer::new(state);

    let shutdown_sender = server.get_shutdown_sender();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            logging::log_shutdown("webserver", "Received Ctrl+C signal");
            let _ = shutdown_sender.send(()).await;
        }
    });

    let addr: SocketAddr = format!("127.0.0.1:{}", args.port)
        .parse()
        .map_err(|e| WebServerError::ServerStartup(format!("Invalid port: {}", e)))?;
    server.run(addr).await?;

    bridge.shutdown();
    Ok(())
}

/// Example modules so the server has something to show out of the box
fn seed_example_modules(runtime: &MemoryModuleRuntime) {
    runtime.install_started(
        MemoryModuleBuilder::new("standard-suite-engine").engine(Arc::new(SuiteTestEngine::new())),
    );
    runtime.install_started(
        MemoryModuleBuilder::new("example-tests")
            .header(TEST_REGEXP_HEADER, r"org\.example\..*Test")
            .suite(TestSuite::new(
                "org.example.tests.PassingTest",
                vec![TestCase::passing("addition"), TestCase::passing("subtraction")],
            ))
            .suite(TestSuite::new(
                "org.example.tests.MixedTest",
                vec![
                    TestCase::passing("works"),
                    TestCase::failing("breaks", "expected <1> but was <2>"),
                    TestCase::skipped("later", "not implemented yet"),
                    TestCase::aborted("conditional", "only runs on the target platform"),
                ],
            )),
    );
}
