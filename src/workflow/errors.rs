//! Error types for the workflow domain

use thiserror::Error;

/// Errors that can occur while loading or running workflows
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// Validation failed with specified reason
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Command execution failed
    #[error("Command failed with exit code {code}: {stderr}")]
    CommandFailed {
        /// Exit code returned by the command.
        code: i32,
        /// Standard error output from the command.
        stderr: String,
    },

    /// No file matched an artifact pattern
    #[error("No file matched artifact pattern '{pattern}'")]
    ArtifactNotFound {
        /// The pattern that matched nothing.
        pattern: String,
    },

    /// Workflow file could not be parsed
    #[error("Failed to parse workflow: {0}")]
    Parse(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for WorkflowError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for WorkflowError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Validation errors for workflow components
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name cannot be empty
    #[error("Name cannot be empty")]
    EmptyName,

    /// Invalid characters in name
    #[error("Invalid characters in name: '{name}'")]
    InvalidNameChars {
        /// The invalid name.
        name: String,
    },

    /// Workflow must have at least one job
    #[error("Workflow must have at least one job")]
    EmptyWorkflow,

    /// Job must have at least one step
    #[error("Job '{job}' must have at least one step")]
    EmptyJob {
        /// Name of the empty job.
        job: String,
    },

    /// Matrix axis has no values
    #[error("Matrix axis '{axis}' must have at least one value")]
    EmptyAxis {
        /// Name of the axis without values.
        axis: String,
    },

    /// Trigger declares an empty branch filter
    #[error("Trigger branch filter cannot contain empty branch names")]
    EmptyBranchFilter,

    /// Runtime version is empty
    #[error("Setup step must declare a runtime version")]
    MissingRuntimeVersion,

    /// Artifact pattern or path is empty
    #[error("Artifact step '{step}' has an empty pattern or path")]
    EmptyArtifactPath {
        /// The offending step kind.
        step: String,
    },
}
