//! Global `tracing` subscriber for the binaries.

use tracing_subscriber::EnvFilter;

use crate::LogSettings;

/// `RUST_LOG` wins over `log.filter`. Safe to call more than once; later
/// calls are no-ops.
pub fn init(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if log.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
