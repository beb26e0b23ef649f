//! Workflow execution traits
//!
//! This module defines traits and interfaces for workflow execution.

use crate::workflow::{CellStatus, RunOutcome, Workflow};
use ahash::AHashMap;
use std::path::PathBuf;

/// Trait for executing workflows
#[allow(clippy::missing_errors_doc)]
pub trait WorkflowExecutor: Send + Sync {
    /// Executes a workflow and returns the aggregated run outcome
    fn execute(&self, workflow: &Workflow) -> Result<RunOutcome, crate::workflow::WorkflowError>;

    /// Validates a workflow without executing it
    fn validate(&self, workflow: &Workflow) -> Result<(), crate::workflow::ValidationError>;

    /// Performs a dry run of the workflow (no side effects)
    fn dry_run(&self, workflow: &Workflow) -> Result<RunOutcome, crate::workflow::WorkflowError>;

    /// Returns the capabilities of this executor
    fn capabilities(&self) -> ExecutorCapabilities;

    /// Performs a health check
    fn health_check(&self) -> HealthStatus;
}

/// Capabilities of an executor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorCapabilities {
    /// Can execute shell commands
    pub can_execute_shell: bool,

    /// Runs matrix cells concurrently
    pub supports_parallel_cells: bool,

    /// Stages artifacts to a local artifacts root
    pub supports_artifacts: bool,
}

impl Default for ExecutorCapabilities {
    fn default() -> Self {
        Self {
            can_execute_shell: true,
            supports_parallel_cells: false,
            supports_artifacts: true,
        }
    }
}

/// Health status of an executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Executor is healthy
    Healthy,

    /// Executor is unhealthy
    Unhealthy {
        /// Reason for being unhealthy
        reason: String,
    },
}

impl HealthStatus {
    /// Returns true if the executor can run workflows
    #[must_use]
    pub fn is_operational(&self) -> bool {
        !matches!(self, Self::Unhealthy { .. })
    }
}

/// Per-cell execution context
///
/// Each matrix cell gets its own context: an isolated workspace
/// directory, the cell's environment and the step results recorded so
/// far. Contexts are never shared between cells.
#[derive(Debug, Clone)]
pub struct CellContext {
    /// Environment variables visible to the cell's steps
    pub env: AHashMap<String, String>,

    /// Ephemeral workspace directory of the cell
    pub workspace: PathBuf,

    /// Unique identifier of the enclosing run
    pub run_id: String,

    /// Results of the steps executed so far, in order
    pub step_results: Vec<(String, CellStatus)>,
}

impl CellContext {
    /// Creates a new context rooted at the given workspace
    #[must_use]
    pub fn new(workspace: impl Into<PathBuf>, run_id: impl Into<String>) -> Self {
        let workspace = workspace.into();
        let run_id = run_id.into();
        let mut env: AHashMap<String, String> = std::env::vars().collect();
        env.insert(
            "GRIDLINE_WORKSPACE".to_string(),
            workspace.to_string_lossy().to_string(),
        );
        env.insert("GRIDLINE_RUN_ID".to_string(), run_id.clone());
        Self {
            env,
            workspace,
            run_id,
            step_results: Vec::new(),
        }
    }

    /// Sets an environment variable
    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env.insert(key.into(), value.into());
    }

    /// Gets an environment variable
    #[must_use]
    pub fn get_env(&self, key: &str) -> Option<&String> {
        self.env.get(key)
    }

    /// Records the result of a step
    pub fn record_step_result(&mut self, step: &str, status: CellStatus) {
        self.step_results.push((step.to_string(), status));
    }
}
