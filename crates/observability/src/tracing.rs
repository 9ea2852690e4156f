//! Tracing/logging initialization.
//!
//! Workers report everything through the ambient `tracing` dispatcher
//! (structured fields, not a threaded-through logger handle), so a host
//! process only has to call `init` once before launching tasks.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// Filtering follows `RUST_LOG`, defaulting to `info`. Safe to call
/// multiple times (subsequent calls are no-ops).
pub fn init() {
    init_with_default("info");
}

/// Initialize with an explicit default filter directive, still overridable
/// via `RUST_LOG`. Useful for embedding processes and tests.
pub fn init_with_default(directives: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    // JSON logs + timestamps, configurable via RUST_LOG.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
