//! Tracing subscriber setup
//!
//! Logs go to stderr so stdout carries only the benchmark report.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber
///
/// `RUST_LOG` wins over `default_filter` when set. Calling this twice is
/// harmless; the second call leaves the first subscriber in place.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
