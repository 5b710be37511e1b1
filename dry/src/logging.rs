//! Diagnostic tracing for the task runner.
//!
//! # Separation of Concerns
//!
//! - **Tracing (this module)**: diagnostics via `RUST_LOG`, output to stderr.
//! - **Progress lines** (`Cleaning...`, `Removed '...'`): product output on
//!   stdout, printed by the tasks regardless of `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise defaults to `warn`, or `dry=debug`
/// when `verbose` is on. Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=dry=trace dry unit
/// ```
pub fn init(verbose: bool) {
    let fallback = if verbose { "warn,dry=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
