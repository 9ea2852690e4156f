//! Tracing/logging setup shared by every rota process.

/// Initialize process-wide observability (tracing/logging).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize with an explicit default filter (still overridable via
/// `RUST_LOG`).
pub fn init_with_default(directives: &str) {
    tracing::init_with_default(directives);
}

/// Tracing configuration (filters, output format).
pub mod tracing;
