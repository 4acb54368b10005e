//! Tracing/logging setup shared by binaries and tests.

/// Subscriber configuration (filters, formatting).
pub mod subscriber;

/// Initialize process-wide logging: JSON lines, filtered by `RUST_LOG`
/// (default `info`).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    subscriber::init_json();
}

/// Human-readable logs routed through the test harness's captured output.
///
/// Safe to call from every test.
pub fn init_test() {
    subscriber::init_test_writer();
}
