//! Infrastructure layer
//!
//! External formats and adapters: workflow YAML, configuration,
//! logging and metrics.

mod config;
mod github_actions;
mod logging;
mod metrics;

pub use config::Config;
pub use github_actions::{GitHubActionsBackend, load_workflow, parse_workflow};
pub use logging::{LOG_ENV_VAR, init_logging};
pub use metrics::{MetricsCollector, RunMetrics};
