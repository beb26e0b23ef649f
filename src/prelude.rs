//! Prelude module for common imports

// Re-export all workflow types with full paths
pub use crate::workflow::errors::{ValidationError, WorkflowError};
pub use crate::workflow::job::{Job, Workflow, WorkflowBuilder};
pub use crate::workflow::matrix::{Matrix, MatrixAxis, MatrixCell, MatrixExclude};
pub use crate::workflow::steps::{Step, StepType};
pub use crate::workflow::templates::package_test_workflow;
pub use crate::workflow::triggers::Trigger;
pub use crate::workflow::types::{CellOutcome, CellStatus, RunOutcome, Validate, WorkflowResult};
pub use crate::workflow::Environment;

// Re-export executor types
pub use crate::executor::{
    CellContext, ExecutorCapabilities, ExecutorConfig, HealthStatus, LocalExecutor,
    WorkflowExecutor,
};
