//! Shell execution for workflow steps
//!
//! Commands run under `sh -c` by default; a different shell line (for
//! example `bash -e`) can be configured and is split with `shell-words`.
//! `${VAR}` references are expanded from the cell environment before
//! execution.

use crate::workflow::WorkflowError;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Shell execution configuration
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Working directory
    pub cwd: PathBuf,

    /// Environment variables
    pub env: AHashMap<String, String>,

    /// Shell line to run commands under (default: `sh`)
    pub shell: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_default(),
            env: AHashMap::new(),
            shell: "sh".to_string(),
        }
    }
}

/// Result of shell command execution
#[derive(Debug, Clone)]
pub struct ShellResult {
    /// Standard output
    pub stdout: String,

    /// Standard error
    pub stderr: String,

    /// Exit code
    pub exit_code: i32,

    /// Duration of execution
    pub duration: Duration,
}

impl ShellResult {
    /// Returns true if the command succeeded (exit code 0)
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns true if the command failed
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.exit_code != 0
    }
}

/// Builder for shell commands
#[derive(Debug, Clone)]
pub struct ShellCommand<'a> {
    config: &'a ShellConfig,
}

impl<'a> ShellCommand<'a> {
    /// Creates a new shell command builder
    #[must_use]
    pub fn new(config: &'a ShellConfig) -> Self {
        Self { config }
    }

    /// Executes a shell command with captured output.
    ///
    /// A non-zero exit code is reported in the returned [`ShellResult`];
    /// only spawn failures and malformed shell lines are errors.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Io`] when the shell cannot be spawned
    /// and [`WorkflowError::Parse`] when the shell line cannot be split.
    pub fn execute(&self, command: &str) -> Result<ShellResult, WorkflowError> {
        let expanded = expand_variables(command, &self.config.env);

        let shell_parts = shell_words::split(&self.config.shell)
            .map_err(|e| WorkflowError::Parse(format!("Invalid shell line: {e}")))?;
        let (program, args) = match shell_parts.split_first() {
            Some((program, args)) => (program.clone(), args.to_vec()),
            None => ("sh".to_string(), Vec::new()),
        };

        tracing::debug!(command = %expanded, shell = %program, "Executing shell command");

        let start = Instant::now();

        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.arg("-c");
        cmd.arg(&expanded);
        cmd.current_dir(&self.config.cwd);
        cmd.envs(&self.config.env);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = cmd.output().map_err(|e| WorkflowError::Io(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);

        if !stdout.is_empty() {
            print!("{stdout}");
        }
        if !stderr.is_empty() {
            eprint!("{stderr}");
        }

        Ok(ShellResult {
            stdout,
            stderr,
            exit_code,
            duration: start.elapsed(),
        })
    }
}

/// Expands environment variables in a command string
///
/// Variables are expanded using the `${VAR_NAME}` syntax.
/// If a variable is not found, it remains unchanged in the output.
pub fn expand_variables(input: &str, env: &AHashMap<String, String>) -> String {
    static VAR_PATTERN: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

    VAR_PATTERN
        .replace_all(input, |caps: &regex::Captures| {
            let var_name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            if let Some(value) = env.get(var_name) {
                value.clone()
            } else {
                // Keep the original if not found
                caps.get(0)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default()
            }
        })
        .to_string()
}
