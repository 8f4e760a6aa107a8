//! Shared logging utilities for consistent tracing across processes

use chrono::{DateTime, Utc};
use tracing::info;

/// Initialize the tracing subscriber for the named process at `info` level
pub fn init_tracing(process: &str) {
    init_tracing_with_level(process, None);
}

/// Initialize the tracing subscriber with an explicit base level.
///
/// `RUST_LOG` still wins when set; otherwise noisy HTTP internals are kept
/// at `warn` so test output stays readable.
pub fn init_tracing_with_level(process: &str, log_level: Option<&str>) {
    use tracing_subscriber::{fmt, EnvFilter};

    let base_level = log_level.unwrap_or("info");
    let default_filter = format!(
        "{process}={base_level},bridge={base_level},shared={base_level},tower=warn,hyper=warn"
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    // Ignore the error if a subscriber is already installed (tests)
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Contextual logging helper for startup messages
pub fn log_startup(process: &str, details: &str) {
    info!(process = process, timestamp = format_timestamp(), "🚀 Starting {}", details);
}

/// Contextual logging helper for shutdown messages
pub fn log_shutdown(process: &str, reason: &str) {
    info!(process = process, timestamp = format_timestamp(), "🛑 Shutting down: {}", reason);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_has_millisecond_precision() {
        let ts = format_timestamp();
        // HH:MM:SS.mmm
        assert_eq!(ts.len(), 12);
        assert!(ts.contains('.'));
    }
}
