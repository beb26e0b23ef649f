//! `gridline lint` - Analyze workflows for common problems

use crate::infrastructure::load_workflow;
use crate::workflow::{StepType, Trigger, Workflow};
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::Path;

/// A single lint finding
#[derive(Debug, Clone, Serialize)]
pub struct LintMessage {
    /// Stable rule code (`G003`)
    pub code: String,
    /// Human-readable description
    pub message: String,
    /// Workflow or job the finding applies to
    pub location: String,
    /// Severity of the finding
    pub severity: LintSeverity,
    /// Suggested fix, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Severity of a lint finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    /// Informational
    Info,
    /// Likely problem
    Warning,
    /// Definite problem
    Error,
}

impl std::fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LintSeverity::Info => write!(f, "info"),
            LintSeverity::Warning => write!(f, "warning"),
            LintSeverity::Error => write!(f, "error"),
        }
    }
}

/// Lint configuration
#[derive(Debug)]
pub struct LintConfig {
    /// Lowest severity to report
    pub min_severity: LintSeverity,
    /// Include suggestions in text output
    pub show_suggestions: bool,
    /// Output format
    pub format: OutputFormat,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            min_severity: LintSeverity::Info,
            show_suggestions: false,
            format: OutputFormat::Text,
        }
    }
}

/// Lint output format
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Plain text, one finding per line
    Text,
    /// Pretty-printed JSON
    Json,
}

static SECRET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(password|token|secret|api_key)\s*[=:]\s*['"]?[A-Za-z0-9_/+-]{8,}"#).unwrap()
});

/// Lints a workflow file and returns the messages at or above the
/// configured severity.
pub fn lint_workflow(file: &Path, config: &LintConfig) -> Result<Vec<LintMessage>> {
    let workflow = load_workflow(file)
        .with_context(|| format!("Failed to load workflow: {}", file.display()))?;

    let mut messages = lint(&workflow);
    messages.retain(|msg| msg.severity >= config.min_severity);
    Ok(messages)
}

/// Runs all lint rules on an already-loaded workflow.
#[must_use]
pub fn lint(workflow: &Workflow) -> Vec<LintMessage> {
    let mut messages = Vec::new();

    check_triggers(workflow, &mut messages);
    check_fail_fast(workflow, &mut messages);
    check_uploads(workflow, &mut messages);
    check_secrets(workflow, &mut messages);

    messages
}

fn check_triggers(workflow: &Workflow, messages: &mut Vec<LintMessage>) {
    if workflow.triggers.is_empty() {
        messages.push(LintMessage {
            code: "G001".to_string(),
            message: "Workflow has no triggers".to_string(),
            location: workflow.name.clone(),
            severity: LintSeverity::Info,
            suggestion: Some(
                "Add workflow_dispatch, push or pull_request triggers".to_string(),
            ),
        });
    }

    for trigger in &workflow.triggers {
        let unfiltered = match trigger {
            Trigger::Dispatch => false,
            Trigger::Push { branches } | Trigger::PullRequest { branches } => branches.is_empty(),
        };
        if unfiltered {
            messages.push(LintMessage {
                code: "G002".to_string(),
                message: format!("Trigger `{trigger}` has no branch filter"),
                location: workflow.name.clone(),
                severity: LintSeverity::Warning,
                suggestion: Some("Restrict the trigger to specific branches".to_string()),
            });
        }
    }
}

fn check_fail_fast(workflow: &Workflow, messages: &mut Vec<LintMessage>) {
    for job in &workflow.jobs {
        if job.fail_fast() {
            messages.push(LintMessage {
                code: "G003".to_string(),
                message: format!("Job `{}` stops its matrix on first failure", job.name),
                location: job.name.clone(),
                severity: LintSeverity::Warning,
                suggestion: Some(
                    "Disable fail-fast so every cell reports its own outcome".to_string(),
                ),
            });
        }
    }
}

fn check_uploads(workflow: &Workflow, messages: &mut Vec<LintMessage>) {
    for job in &workflow.jobs {
        let has_upload = job
            .steps
            .iter()
            .any(|s| matches!(s.step_type, StepType::UploadArtifact { .. }));
        if !has_upload {
            messages.push(LintMessage {
                code: "G004".to_string(),
                message: format!("Job `{}` uploads no artifacts", job.name),
                location: job.name.clone(),
                severity: LintSeverity::Info,
                suggestion: Some(
                    "Upload reports so failed cells leave something to inspect".to_string(),
                ),
            });
        }
    }
}

fn check_secrets(workflow: &Workflow, messages: &mut Vec<LintMessage>) {
    for job in &workflow.jobs {
        for step in &job.steps {
            let StepType::Run { command } = &step.step_type else {
                continue;
            };
            if SECRET_PATTERN.is_match(command) {
                messages.push(LintMessage {
                    code: "G005".to_string(),
                    message: format!("Possible hardcoded secret in `{}`", step.label()),
                    location: job.name.clone(),
                    severity: LintSeverity::Error,
                    suggestion: Some(
                        "Use environment variables or secrets management".to_string(),
                    ),
                });
            }
        }
    }
}

/// Formats lint messages for display.
#[must_use]
pub fn format_lint_messages(messages: &[LintMessage], config: &LintConfig) -> String {
    match config.format {
        OutputFormat::Text => {
            if messages.is_empty() {
                return "No lint issues found.".to_string();
            }
            let mut output = String::new();
            for msg in messages {
                output.push_str(&format!(
                    "{}: {} ({}) [{}]\n",
                    msg.code, msg.message, msg.location, msg.severity
                ));
                if config.show_suggestions
                    && let Some(suggestion) = &msg.suggestion
                {
                    output.push_str(&format!("  {suggestion}\n"));
                }
            }
            output
        }
        OutputFormat::Json => {
            serde_json::to_string_pretty(messages).unwrap_or_else(|_| "[]".to_string())
        }
    }
}
