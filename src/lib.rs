//! # Gridline - Matrix test workflows, run locally
//!
//! Gridline models CI test workflows as a typed build matrix (operating
//! system x runtime version) and executes every cell of the matrix on
//! the host, each cell in its own workspace with its own outcome.
//!
//! ## Features
//!
//! - **Typed workflow model**: Triggers, jobs, matrices and steps with
//!   validation built in
//! - **Independent cells**: A failing cell never stops its siblings;
//!   all outcomes are reported
//! - **Canonical step sequence**: checkout, runtime setup, commands,
//!   artifact install, per-cell artifact upload
//! - **GitHub Actions YAML**: Load the familiar workflow shape and
//!   render it back
//!
//! ## Quick Start
//!
//! ```no_run
//! use gridline::executor::{LocalExecutor, WorkflowExecutor};
//! use gridline::workflow::package_test_workflow;
//!
//! let workflow = package_test_workflow();
//! let outcome = LocalExecutor::new().execute(&workflow)?;
//! println!("{outcome}");
//! # Ok::<(), gridline::workflow::WorkflowError>(())
//! ```
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <https://www.apache.org/licenses/LICENSE-2.0>)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or <https://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod cli;
pub mod executor;
pub mod infrastructure;
pub mod workflow;

// Prelude module for common imports
pub mod prelude;

// Re-export commonly used types
pub use executor::{
    CellContext, ExecutorCapabilities, ExecutorConfig, HealthStatus, LocalExecutor, ShellCommand,
    ShellConfig, ShellResult, WorkflowExecutor, expand_variables,
};
pub use infrastructure::{
    Config, GitHubActionsBackend, MetricsCollector, RunMetrics, init_logging, load_workflow,
    parse_workflow,
};
pub use workflow::{
    CellOutcome, CellStatus, Environment, Job, Matrix, MatrixAxis, MatrixCell, RunOutcome, Step,
    StepType, Trigger, Validate, Workflow, WorkflowBuilder, WorkflowError, package_test_workflow,
};

/// Version of the gridline crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
