//! Tracing setup for the runner
//!
//! Cell and step execution logs go through `tracing`. The filter is
//! taken from the `GRIDLINE_LOG` environment variable when set,
//! otherwise from the level passed in (the `log_level` of the loaded
//! [`Config`][crate::infrastructure::Config], or `debug` when
//! `GRIDLINE_DEBUG` is set).

use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable that overrides the configured log filter
pub const LOG_ENV_VAR: &str = "GRIDLINE_LOG";

/// Initializes the tracing subscriber with the given default level.
///
/// The first call wins; later calls keep the installed subscriber, so
/// an early `GRIDLINE_DEBUG` init is not clobbered by the level loaded
/// from configuration.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .try_init();
}
