//! Structured logging setup for the binary.
//!
//! The library only emits `tracing` events. The binary installs a subscriber
//! that writes to stderr (stdout carries the reports), filtered by `RUST_LOG`
//! and defaulting to `info`.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber. Later calls are no-ops.
pub fn init(json: bool, verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Logging already initialised");
    }
}
