//! Structured logging bootstrap for the platescan workspace.

use tracing_subscriber::{fmt, EnvFilter};

pub mod logging;

pub use logging::{init_structured_logging, init_with_service, LogConfig, LogFormat};
pub use tracing_appender::non_blocking::WorkerGuard;

/// Minimal init for tools and tests that do not need the full config.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}
