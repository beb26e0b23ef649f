//! Workflow and job definitions

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use crate::workflow::Environment;
use crate::workflow::errors::ValidationError;
use crate::workflow::matrix::Matrix;
use crate::workflow::steps::Step;
use crate::workflow::triggers::Trigger;
use crate::workflow::types::Validate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A job: one step sequence executed once per matrix cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Job name
    pub name: String,

    /// Runner label the job is declared for (`ubuntu-latest`, or a
    /// matrix expression resolved per cell)
    pub runs_on: String,

    /// Matrix strategy, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Matrix>,

    /// Job-level environment variables
    #[serde(default)]
    pub env: Environment,

    /// Ordered steps of the job
    pub steps: Vec<Step>,
}

impl Job {
    /// Creates a new job
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            runs_on: "ubuntu-latest".to_string(),
            matrix: None,
            env: Environment::new(),
            steps,
        }
    }

    /// Sets the runner label
    pub fn with_runs_on(mut self, runs_on: impl Into<String>) -> Self {
        self.runs_on = runs_on.into();
        self
    }

    /// Sets the matrix strategy
    pub fn with_matrix(mut self, matrix: Matrix) -> Self {
        self.matrix = Some(matrix);
        self
    }

    /// Sets the job environment
    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    /// Expands the job's matrix; a job without a matrix yields one
    /// implicit cell.
    #[must_use]
    pub fn cells(&self) -> Vec<crate::workflow::matrix::MatrixCell> {
        match &self.matrix {
            Some(matrix) => matrix.expand(),
            None => Matrix::new().expand(),
        }
    }

    /// Returns true when a failing cell should stop its siblings
    #[must_use]
    pub fn fail_fast(&self) -> bool {
        self.matrix.as_ref().is_some_and(|m| m.fail_fast)
    }
}

impl Validate for Job {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        // Job names become workspace path components.
        if !self
            .name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(ValidationError::InvalidNameChars {
                name: self.name.clone(),
            });
        }
        if self.steps.is_empty() {
            return Err(ValidationError::EmptyJob {
                job: self.name.clone(),
            });
        }
        if let Some(ref matrix) = self.matrix {
            matrix.validate()?;
        }
        for step in &self.steps {
            match &step.step_type {
                crate::workflow::steps::StepType::SetupRuntime { version }
                    if version.trim().is_empty() =>
                {
                    return Err(ValidationError::MissingRuntimeVersion);
                }
                crate::workflow::steps::StepType::InstallArtifact { pattern }
                    if pattern.trim().is_empty() =>
                {
                    return Err(ValidationError::EmptyArtifactPath {
                        step: "install-artifact".to_string(),
                    });
                }
                crate::workflow::steps::StepType::UploadArtifact { name, path }
                    if name.trim().is_empty() || path.trim().is_empty() =>
                {
                    return Err(ValidationError::EmptyArtifactPath {
                        step: "upload".to_string(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Job({}): {} steps, {} cells",
            self.name,
            self.steps.len(),
            self.cells().len()
        )
    }
}

/// Main workflow structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    /// Workflow name
    pub name: String,

    /// Trigger contract
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub triggers: Vec<Trigger>,

    /// Workflow-level environment variables
    #[serde(default)]
    pub env: Environment,

    /// Jobs of the workflow
    pub jobs: Vec<Job>,
}

impl Workflow {
    /// Creates a new workflow builder
    pub fn builder() -> WorkflowBuilder {
        WorkflowBuilder::new()
    }

    /// Returns a job by name
    #[must_use]
    pub fn job(&self, name: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.name == name)
    }

    /// Total number of matrix cells across all jobs
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.jobs.iter().map(|j| j.cells().len()).sum()
    }
}

impl Validate for Workflow {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.jobs.is_empty() {
            return Err(ValidationError::EmptyWorkflow);
        }
        for trigger in &self.triggers {
            trigger.validate()?;
        }
        for job in &self.jobs {
            job.validate()?;
        }
        Ok(())
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Workflow({}): {} jobs, {} cells",
            self.name,
            self.jobs.len(),
            self.cell_count()
        )
    }
}

/// Builder for creating workflows
#[derive(Debug, Clone)]
pub struct WorkflowBuilder {
    workflow: Workflow,
}

impl WorkflowBuilder {
    /// Creates a new workflow builder
    pub fn new() -> Self {
        Self {
            workflow: Workflow {
                name: String::new(),
                triggers: Vec::new(),
                env: Environment::new(),
                jobs: Vec::new(),
            },
        }
    }

    /// Sets the workflow name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.workflow.name = name.into();
        self
    }

    /// Adds a trigger
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.workflow.triggers.push(trigger);
        self
    }

    /// Adds a job
    pub fn job(mut self, job: Job) -> Self {
        self.workflow.jobs.push(job);
        self
    }

    /// Adds multiple jobs
    pub fn jobs(mut self, mut jobs: Vec<Job>) -> Self {
        self.workflow.jobs.append(&mut jobs);
        self
    }

    /// Configures the environment with a closure
    pub fn env<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Environment) -> Environment,
    {
        self.workflow.env = f(self.workflow.env);
        self
    }

    /// Builds the workflow
    #[allow(clippy::missing_errors_doc)]
    pub fn build(self) -> Result<Workflow, ValidationError> {
        self.workflow.validate()?;
        Ok(self.workflow)
    }

    /// Builds the workflow without validation (for internal use)
    #[must_use]
    pub fn build_unchecked(self) -> Workflow {
        self.workflow
    }
}

impl Default for WorkflowBuilder {
    fn default() -> Self {
        Self::new()
    }
}
