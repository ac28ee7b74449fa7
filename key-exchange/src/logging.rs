//! Diagnostic output setup for the command-line tools

use tracing_subscriber::{EnvFilter, fmt};

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG` (default `warn`).
///
/// Stdout stays reserved for the short status lines the tools print.
/// Calling this twice is harmless; the second install is ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .try_init();
}
