//! One-time system-readiness gate
//!
//! Before the first test run the bridge waits, bounded by a timeout, until
//! all modules of the host runtime are active. Module activation is a
//! startup phenomenon, so the gate runs at most once per process lifetime;
//! later calls return immediately. A timeout is logged but never blocks
//! testing: one stuck unrelated module must not make the tool unusable.

use std::collections::HashSet;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use shared::{Module, ModuleRuntime, ModuleState};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

/// Environment override for the startup timeout, in seconds
pub const STARTUP_TIMEOUT_ENV: &str = "BRIDGE_STARTUP_TIMEOUT_SECONDS";

const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(40);

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration of the readiness wait
#[derive(Clone, Debug)]
pub struct StartupConfig {
    pub timeout: Duration,
    /// Symbolic names of modules exempt from the wait
    pub exempt_modules: HashSet<String>,
}

impl StartupConfig {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            exempt_modules: HashSet::new(),
        }
    }

    /// Timeout from [`STARTUP_TIMEOUT_ENV`], defaulting to 40 seconds
    pub fn from_env() -> Self {
        let timeout = env::var(STARTUP_TIMEOUT_ENV)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_STARTUP_TIMEOUT);
        Self::new(timeout)
    }

    pub fn exempt(mut self, module_name: impl Into<String>) -> Self {
        self.exempt_modules.insert(module_name.into());
        self
    }
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STARTUP_TIMEOUT)
    }
}

/// The startup barrier. State machine: waiting → ready, terminal once ready.
pub struct SystemReadiness {
    runtime: Arc<dyn ModuleRuntime>,
    config: StartupConfig,
    /// Guards the single physical wait; flips to false exactly once
    still_waiting: Mutex<bool>,
    ready: AtomicBool,
}

impl SystemReadiness {
    pub fn new(runtime: Arc<dyn ModuleRuntime>, config: StartupConfig) -> Self {
        Self {
            runtime,
            config,
            still_waiting: Mutex::new(true),
            ready: AtomicBool::new(false),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Wait for all modules to be started, at most once per process
    /// lifetime. Returns the elapsed wait time.
    ///
    /// Concurrent callers serialize on the internal lock, so only one
    /// physical wait ever happens even if two runs are triggered back to
    /// back during boot.
    pub async fn wait_for_startup(&self) -> Duration {
        let mut still_waiting = self.still_waiting.lock().await;
        if !*still_waiting {
            self.ready.store(true, Ordering::SeqCst);
            return Duration::ZERO;
        }
        // Flip before waiting: an abandoned wait counts as "ready enough"
        *still_waiting = false;

        let start = Instant::now();
        let deadline = start + self.config.timeout;

        let mut to_wait_for: Vec<Arc<dyn Module>> = self
            .runtime
            .modules()
            .into_iter()
            .filter(|m| {
                m.state() != ModuleState::Active
                    && !m.is_fragment()
                    && !self.config.exempt_modules.contains(m.symbolic_name())
            })
            .collect();

        while !to_wait_for.is_empty() && Instant::now() < deadline {
            info!(
                "Waiting for modules to start: {:?}",
                to_wait_for.iter().map(|m| m.symbolic_name().to_string()).collect::<Vec<_>>()
            );
            tokio::time::sleep(POLL_INTERVAL).await;
            to_wait_for.retain(|m| m.state() != ModuleState::Active);
        }

        let elapsed = start.elapsed();
        self.ready.store(true, Ordering::SeqCst);

        if to_wait_for.is_empty() {
            info!("All modules are active, starting to run tests.");
        } else {
            warn!(
                "Waited {:?} but the following modules are not yet started: {:?}",
                elapsed,
                to_wait_for.iter().map(|m| m.symbolic_name().to_string()).collect::<Vec<_>>()
            );
        }
        elapsed
    }
}
