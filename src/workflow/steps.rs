//! Step types for workflow execution
//!
//! A step is the atomic unit of work inside a matrix cell. Steps run
//! strictly sequentially; the first failing step fails its cell.

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Types of steps available in workflows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepType {
    /// Check out the repository into the cell workspace
    Checkout,

    /// Provision the language runtime at a specific version
    SetupRuntime {
        /// Runtime version identifier (for example `3.11`)
        version: String,
    },

    /// Run a shell command
    Run {
        /// Command to execute
        command: String,
    },

    /// Locate a built artifact by filename pattern and install it
    InstallArtifact {
        /// Wildcard pattern relative to the workspace (`dist/*.whl`)
        pattern: String,
    },

    /// Persist a file or directory as a named run artifact
    UploadArtifact {
        /// Artifact name, unique per matrix cell
        name: String,
        /// Path relative to the workspace
        path: String,
    },
}

impl StepType {
    /// Creates a checkout step
    pub fn checkout() -> Self {
        Self::Checkout
    }

    /// Creates a runtime setup step
    pub fn setup_runtime(version: impl Into<String>) -> Self {
        Self::SetupRuntime {
            version: version.into(),
        }
    }

    /// Creates a shell command step
    pub fn run(command: impl Into<String>) -> Self {
        Self::Run {
            command: command.into(),
        }
    }

    /// Creates an artifact install step
    pub fn install_artifact(pattern: impl Into<String>) -> Self {
        Self::InstallArtifact {
            pattern: pattern.into(),
        }
    }

    /// Creates an artifact upload step
    pub fn upload_artifact(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::UploadArtifact {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Short kind label used for ordering checks and reports
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::SetupRuntime { .. } => "setup",
            Self::Run { .. } => "run",
            Self::InstallArtifact { .. } => "install-artifact",
            Self::UploadArtifact { .. } => "upload",
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkout => write!(f, "checkout"),
            Self::SetupRuntime { version } => write!(f, "setup({version})"),
            Self::Run { command } => write!(f, "run({command})"),
            Self::InstallArtifact { pattern } => write!(f, "install({pattern})"),
            Self::UploadArtifact { name, path } => write!(f, "upload({name}, {path})"),
        }
    }
}

/// A single step in a workflow job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Type of step
    #[serde(flatten)]
    pub step_type: StepType,

    /// Optional display name for the step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Step {
    /// Creates a new step
    pub fn new(step_type: StepType) -> Self {
        Self {
            step_type,
            name: None,
        }
    }

    /// Sets the display name of the step
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Creates a checkout step
    pub fn checkout() -> Self {
        Self::new(StepType::checkout())
    }

    /// Creates a runtime setup step
    pub fn setup_runtime(version: impl Into<String>) -> Self {
        Self::new(StepType::setup_runtime(version))
    }

    /// Creates a shell command step
    pub fn run(command: impl Into<String>) -> Self {
        Self::new(StepType::run(command))
    }

    /// Creates an artifact install step
    pub fn install_artifact(pattern: impl Into<String>) -> Self {
        Self::new(StepType::install_artifact(pattern))
    }

    /// Creates an artifact upload step
    pub fn upload_artifact(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(StepType::upload_artifact(name, path))
    }

    /// Display name of the step, falling back to its type
    #[must_use]
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.step_type.to_string(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Step({}): {}", name, self.step_type),
            None => write!(f, "Step: {}", self.step_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_type_run() {
        let step_type = StepType::run("python -m build");
        assert!(matches!(step_type, StepType::Run { .. }));
        assert_eq!(step_type.to_string(), "run(python -m build)");
    }

    #[test]
    fn test_step_type_kinds() {
        assert_eq!(StepType::checkout().kind(), "checkout");
        assert_eq!(StepType::setup_runtime("3.11").kind(), "setup");
        assert_eq!(StepType::run("make").kind(), "run");
        assert_eq!(StepType::install_artifact("dist/*.whl").kind(), "install-artifact");
        assert_eq!(StepType::upload_artifact("report", "reports/").kind(), "upload");
    }

    #[test]
    fn test_step_with_name() {
        let step = Step::run("python -m unittest").with_name("Run unittests");
        assert_eq!(step.name, Some("Run unittests".to_string()));
        assert_eq!(step.to_string(), "Step(Run unittests): run(python -m unittest)");
    }

    #[test]
    fn test_step_label_falls_back_to_type() {
        let step = Step::checkout();
        assert_eq!(step.label(), "checkout");
        assert_eq!(step.with_name("Checkout").label(), "Checkout");
    }

    #[test]
    fn test_upload_step_fields() {
        let step = Step::upload_artifact("test-report-ubuntu-latest-3.11", "reports/");
        assert!(matches!(
            step.step_type,
            StepType::UploadArtifact { ref name, ref path }
                if name == "test-report-ubuntu-latest-3.11" && path == "reports/"
        ));
    }

    #[test]
    fn test_step_serde_tagging() {
        let step = Step::install_artifact("dist/*.whl");
        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains("\"type\":\"install_artifact\""));
        let back: Step = serde_json::from_str(&json).unwrap();
        assert_eq!(back, step);
    }
}
