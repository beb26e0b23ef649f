//! Workflow execution
//!
//! The [`WorkflowExecutor`] trait is the seam between the workflow
//! model and the machinery that runs it; [`LocalExecutor`] is the
//! host-process implementation.

pub mod artifacts;
pub mod local;
pub mod shell;
pub mod traits;

pub use local::{ExecutorConfig, LocalExecutor};
pub use shell::{ShellCommand, ShellConfig, ShellResult, expand_variables};
pub use traits::{CellContext, ExecutorCapabilities, HealthStatus, WorkflowExecutor};
