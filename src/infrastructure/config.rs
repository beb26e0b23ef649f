//! Configuration management

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory cell workspaces are created under
    pub workspace_root: String,
    /// Directory uploaded artifacts are staged into
    pub artifacts_root: String,
    /// Shell used for run steps
    pub shell: String,
    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace_root: ".gridline/work".to_string(),
            artifacts_root: ".gridline/artifacts".to_string(),
            shell: "sh".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from a JSON file, falling back to defaults
    /// when the file does not exist.
    #[allow(clippy::missing_errors_doc)]
    pub fn load(path: &std::path::Path) -> Result<Self, crate::workflow::WorkflowError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let source = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&source)
            .map_err(|e| crate::workflow::WorkflowError::Parse(e.to_string()))?;
        Ok(config)
    }
}
