//! Structured logging for analysis audit trails using **tracing**.
//!
//! The engine itself is pure and silent on the happy path; log events are
//! emitted at decision points (graph edges discarded by validation, switches
//! skipped as not-exhaustive-by-intent) so a mis-gated construct can be
//! diagnosed from the trace alone.

/// Initializes the global tracing collector (subscriber).
///
/// This should be called *once* at the beginning of the application's
/// runtime. It configures structured JSON output to stderr.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=matchlock=debug`)
pub fn init_structured_logging() {
    tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr) // keep stdout clean for tool output
        .init();
}
