//! Workflow domain types and logic

pub mod errors;
pub mod job;
pub mod matrix;
pub mod steps;
pub mod templates;
pub mod triggers;
pub mod types;

pub use serde::{Deserialize, Serialize};

pub use errors::{ValidationError, WorkflowError};
pub use job::{Job, Workflow, WorkflowBuilder};
pub use matrix::{Matrix, MatrixAxis, MatrixCell, MatrixExclude, axis_env_key};
pub use steps::{Step, StepType};
pub use templates::package_test_workflow;
pub use triggers::Trigger;
pub use types::{CellOutcome, CellStatus, RunOutcome, Validate, WorkflowResult};

/// Defines environment variables available to workflow steps.
///
/// Variables can be resolved using the [`resolve`][Environment::resolve]
/// method which supports `${VAR}` syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Environment {
    /// Environment variables as key-value pairs.
    #[serde(flatten)]
    pub vars: std::collections::BTreeMap<String, String>,
}

impl Environment {
    /// Creates a new empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an environment variable.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Gets an environment variable by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&String> {
        self.vars.get(key)
    }

    /// Resolves a value that may contain `${VAR}` expansions.
    /// Unknown variables are left untouched.
    #[must_use]
    pub fn resolve(&self, value: &str) -> String {
        let mut result = value.to_string();
        let mut start = 0;

        while let Some(found) = result[start..].find("${") {
            let var_start = start + found;
            let Some(end_brace) = result[var_start..].find('}') else {
                break;
            };
            let var_end = var_start + end_brace + 1;
            let var_name = &result[var_start + 2..var_end - 1];

            if let Some(var_value) = self.vars.get(var_name) {
                let replacement = var_value.clone();
                result.replace_range(var_start..var_end, &replacement);
                start = var_start + replacement.len();
            } else {
                start = var_end;
            }
        }

        result
    }
}
