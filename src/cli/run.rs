//! `gridline run` - Execute a workflow's matrix locally

use crate::executor::{ExecutorConfig, LocalExecutor, WorkflowExecutor};
use crate::infrastructure::{Config, init_logging, load_workflow};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Name of the optional per-project configuration file, looked up next
/// to the workflow file
pub const CONFIG_FILE: &str = ".gridline.json";

/// Options for a local workflow run
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Only run the named job
    pub job: Option<String>,
    /// Directory uploaded artifacts are staged into
    pub artifacts_dir: Option<PathBuf>,
    /// Directory cell workspaces are created under
    pub workspace_dir: Option<PathBuf>,
    /// Command prefix used to install located artifacts
    pub install_command: Option<String>,
    /// Print the execution plan without running anything
    pub dry_run: bool,
}

/// Loads a workflow file and executes its matrix on the host.
///
/// Returns an error when the workflow cannot be loaded or when any
/// cell fails, so the process exit code reflects the run outcome.
pub fn run_workflow(file: &Path, options: &RunOptions) -> Result<()> {
    let mut workflow = load_workflow(file)
        .with_context(|| format!("Failed to load workflow: {}", file.display()))?;

    if let Some(job_name) = &options.job {
        workflow.jobs.retain(|j| &j.name == job_name);
        if workflow.jobs.is_empty() {
            anyhow::bail!("No job named `{job_name}` in workflow");
        }
    }

    let project_dir = file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let config = Config::load(&project_dir.join(CONFIG_FILE))
        .with_context(|| format!("Failed to load {CONFIG_FILE}"))?;
    init_logging(&config.log_level);

    let mut executor = LocalExecutor::with_config(ExecutorConfig {
        workspace_root: config.workspace_root.into(),
        artifacts_root: config.artifacts_root.into(),
        shell: config.shell,
        ..ExecutorConfig::default()
    })
    .with_checkout_source(project_dir);
    if let Some(dir) = &options.artifacts_dir {
        executor = executor.with_artifacts_root(dir);
    }
    if let Some(dir) = &options.workspace_dir {
        executor = executor.with_workspace_root(dir);
    }
    if let Some(install) = &options.install_command {
        executor = executor.with_install_command(install);
    }

    let outcome = if options.dry_run {
        executor.dry_run(&workflow)?
    } else {
        executor.execute(&workflow)?
    };

    for cell in &outcome.cells {
        println!("{cell}");
    }
    println!("{outcome}");

    if let Some(metrics) = executor.metrics().get(&workflow.name) {
        tracing::info!(
            workflow = %metrics.workflow_name,
            cells = metrics.cell_count,
            failed = metrics.failed_cells,
            duration_ms = metrics.duration.as_millis(),
            "Run metrics"
        );
    }

    if !options.dry_run && !outcome.is_success() {
        anyhow::bail!("{} cell(s) failed", outcome.failed_cells().len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKFLOW: &str = r"
name: Smoke
on:
  workflow_dispatch:
jobs:
  smoke:
    steps:
      - run: echo smoke
";

    fn write_workflow(dir: &Path, source: &str) -> PathBuf {
        let path = dir.join("workflow.yml");
        std::fs::write(&path, source).unwrap();
        path
    }

    #[test]
    fn test_run_workflow_success() {
        let tmp = tempfile::tempdir().unwrap();
        let file = write_workflow(tmp.path(), WORKFLOW);

        let options = RunOptions {
            artifacts_dir: Some(tmp.path().join("artifacts")),
            workspace_dir: Some(tmp.path().join("work")),
            ..RunOptions::default()
        };
        run_workflow(&file, &options).unwrap();
    }

    #[test]
    fn test_run_workflow_failure_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let file = write_workflow(
            tmp.path(),
            r"
name: Failing
on:
  workflow_dispatch:
jobs:
  smoke:
    steps:
      - run: exit 1
",
        );

        let options = RunOptions {
            artifacts_dir: Some(tmp.path().join("artifacts")),
            workspace_dir: Some(tmp.path().join("work")),
            ..RunOptions::default()
        };
        assert!(run_workflow(&file, &options).is_err());
    }

    #[test]
    fn test_run_unknown_job_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let file = write_workflow(tmp.path(), WORKFLOW);

        let options = RunOptions {
            job: Some("missing".to_string()),
            ..RunOptions::default()
        };
        let err = run_workflow(&file, &options).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_sibling_config_file_is_applied() {
        let tmp = tempfile::tempdir().unwrap();
        let file = write_workflow(
            tmp.path(),
            r"
name: Configured
on:
  workflow_dispatch:
jobs:
  smoke:
    steps:
      - run: mkdir reports && echo ok > reports/summary.txt
      - uses: actions/upload-artifact@v4
        with:
          name: report
          path: reports/
",
        );
        let config = serde_json::json!({
            "workspace_root": tmp.path().join("cfg-work"),
            "artifacts_root": tmp.path().join("cfg-artifacts"),
            "shell": "sh",
            "log_level": "debug",
        });
        std::fs::write(tmp.path().join(CONFIG_FILE), config.to_string()).unwrap();

        run_workflow(&file, &RunOptions::default()).unwrap();
        assert!(
            tmp.path()
                .join("cfg-artifacts")
                .join("report")
                .join("summary.txt")
                .exists()
        );
    }

    #[test]
    fn test_dry_run_reports_plan_without_executing() {
        let tmp = tempfile::tempdir().unwrap();
        let file = write_workflow(tmp.path(), WORKFLOW);

        let options = RunOptions {
            workspace_dir: Some(tmp.path().join("work")),
            dry_run: true,
            ..RunOptions::default()
        };
        run_workflow(&file, &options).unwrap();
        assert!(!tmp.path().join("work").exists());
    }
}
