//! Core types for the workflow domain
//!
//! This module contains fundamental types that represent
//! the outcome of workflow and matrix cell execution.

#![allow(clippy::must_use_candidate)]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Result type for workflow execution
pub type WorkflowResult = std::result::Result<RunOutcome, super::errors::WorkflowError>;

/// Possible outcomes of a single matrix cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellStatus {
    /// All steps of the cell completed successfully
    Success,
    /// A step of the cell failed
    Failure,
    /// The cell was not executed
    Skipped,
}

impl CellStatus {
    /// Returns true if the cell succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns true if the cell failed
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure)
    }

    /// Returns true if the cell was skipped
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

impl fmt::Display for CellStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Failure => write!(f, "FAILURE"),
            Self::Skipped => write!(f, "SKIPPED"),
        }
    }
}

/// Outcome of one matrix cell of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellOutcome {
    /// Name of the job the cell belongs to
    pub job: String,

    /// Name of the matrix cell (empty matrix yields the job name)
    pub cell: String,

    /// Final status of the cell
    pub status: CellStatus,

    /// Name of the step that failed, if any
    pub failed_step: Option<String>,

    /// Wall-clock duration of the cell
    pub duration: Duration,
}

impl fmt::Display for CellOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.failed_step {
            Some(step) => write!(f, "{} [{}] (failed at '{step}')", self.cell, self.status),
            None => write!(f, "{} [{}]", self.cell, self.status),
        }
    }
}

/// Aggregated outcome of a workflow run
///
/// Matrix cells are independent, so a run carries every cell outcome
/// rather than stopping at the first failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// Outcomes of all executed cells, in expansion order
    pub cells: Vec<CellOutcome>,
}

impl RunOutcome {
    /// Returns true when every cell succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.cells.iter().all(|c| c.status.is_success())
    }

    /// Returns the outcomes of all failed cells
    #[must_use]
    pub fn failed_cells(&self) -> Vec<&CellOutcome> {
        self.cells
            .iter()
            .filter(|c| c.status.is_failure())
            .collect()
    }

    /// Records a cell outcome
    pub fn record(&mut self, outcome: CellOutcome) {
        self.cells.push(outcome);
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.failed_cells().len();
        write!(
            f,
            "{} cells, {} failed: {}",
            self.cells.len(),
            failed,
            if failed == 0 { "SUCCESS" } else { "FAILURE" }
        )
    }
}

/// Trait for types that can be validated
#[allow(clippy::missing_errors_doc)]
pub trait Validate {
    /// Type of validation error
    type Error;

    /// Validates this type
    fn validate(&self) -> std::result::Result<(), Self::Error>;
}
