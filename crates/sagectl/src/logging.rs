//! Logging for sagectl operations.
//!
//! Diagnostics go to stderr via tracing; user-facing output stays on
//! stdout. Verbosity follows RUST_LOG, defaulting to warnings only.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
