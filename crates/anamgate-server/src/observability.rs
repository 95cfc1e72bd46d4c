//! Tracing initialization with a reloadable log level.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type FilterHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

static FILTER_HANDLE: OnceLock<FilterHandle> = OnceLock::new();

/// Installs the global subscriber. `RUST_LOG` takes precedence; otherwise
/// logging starts at `info` until the configuration is loaded.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter, handle) = reload::Layer::new(filter);
    let _ = FILTER_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}

/// Applies the configured logging level once configuration is available.
pub fn apply_logging_level(level: &str) {
    // RUST_LOG keeps precedence over the config file
    if std::env::var("RUST_LOG").is_ok() {
        return;
    }
    if let Some(handle) = FILTER_HANDLE.get() {
        let _ = handle.modify(|f| *f = EnvFilter::new(level));
    }
}
