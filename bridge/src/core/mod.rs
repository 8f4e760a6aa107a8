//! Core algorithms: catalog coordination, readiness gating, engine
//! launching and event adaptation

pub mod coordinator;
pub mod launcher;
pub mod readiness;
pub mod run_adapter;

pub use coordinator::TestCoordinator;
pub use launcher::{LaunchListener, Launcher};
pub use readiness::{StartupConfig, SystemReadiness, STARTUP_TIMEOUT_ENV};
pub use run_adapter::RunListenerAdapter;
