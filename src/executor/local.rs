//! Local executor
//!
//! Runs every matrix cell of a workflow on the host, each in its own
//! ephemeral workspace directory. Within a cell, steps execute strictly
//! sequentially and the first failing step fails the cell; sibling
//! cells continue independently unless the matrix enables fail-fast.

use super::artifacts;
use super::shell::{ShellCommand, ShellConfig, expand_variables};
use super::traits::{CellContext, ExecutorCapabilities, HealthStatus, WorkflowExecutor};
use crate::infrastructure::{MetricsCollector, RunMetrics};
use crate::workflow::{
    CellOutcome, CellStatus, Job, MatrixCell, RunOutcome, Step, StepType, Validate, Workflow,
    WorkflowError,
};
use std::path::PathBuf;
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Local executor that runs workflow cells on the host system
#[derive(Debug, Clone)]
pub struct LocalExecutor {
    config: ExecutorConfig,
    metrics: MetricsCollector,
}

/// Configuration for the local executor
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Root directory cell workspaces are created under
    pub workspace_root: PathBuf,

    /// Root directory uploaded artifacts are staged into
    pub artifacts_root: PathBuf,

    /// Shell line commands run under
    pub shell: String,

    /// Directory the checkout step copies into the cell workspace.
    /// Defaults to the current directory.
    pub checkout_source: PathBuf,

    /// Command prefix used to install a located artifact
    /// (`python -m pip install`). When unset the artifact path is only
    /// exported as `GRIDLINE_ARTIFACT`.
    pub install_command: Option<String>,

    /// Keep workspaces of successful cells instead of removing them
    pub keep_workspaces: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            workspace_root: std::env::temp_dir().join("gridline"),
            artifacts_root: PathBuf::from("artifacts"),
            shell: "sh".to_string(),
            checkout_source: std::env::current_dir().unwrap_or_default(),
            install_command: None,
            keep_workspaces: false,
        }
    }
}

impl LocalExecutor {
    /// Creates a new local executor with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ExecutorConfig::default())
    }

    /// Creates a local executor from explicit configuration
    #[must_use]
    pub fn with_config(config: ExecutorConfig) -> Self {
        Self {
            config,
            metrics: MetricsCollector::new(),
        }
    }

    /// Metrics recorded by completed runs, keyed by workflow name
    #[must_use]
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Sets the artifacts root
    #[must_use]
    pub fn with_artifacts_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.artifacts_root = root.into();
        self
    }

    /// Sets the workspace root
    #[must_use]
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.workspace_root = root.into();
        self
    }

    /// Sets the checkout source directory
    #[must_use]
    pub fn with_checkout_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.config.checkout_source = source.into();
        self
    }

    /// Sets the artifact install command prefix
    #[must_use]
    pub fn with_install_command(mut self, command: impl Into<String>) -> Self {
        self.config.install_command = Some(command.into());
        self
    }
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowExecutor for LocalExecutor {
    fn execute(&self, workflow: &Workflow) -> Result<RunOutcome, WorkflowError> {
        workflow.validate()?;

        let run_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(
            workflow = %workflow.name,
            run_id = %run_id,
            jobs = workflow.jobs.len(),
            cells = workflow.cell_count(),
            "Starting workflow run"
        );

        let mut run = RunOutcome::default();
        for job in &workflow.jobs {
            let outcomes = self.execute_job(workflow, job, &run_id);
            for outcome in outcomes {
                run.record(outcome);
            }
        }

        self.metrics
            .record(RunMetrics::from_outcome(&workflow.name, &run));
        tracing::info!(run_id = %run_id, outcome = %run, "Workflow run finished");
        Ok(run)
    }

    fn validate(&self, workflow: &Workflow) -> Result<(), crate::workflow::ValidationError> {
        workflow.validate()
    }

    fn dry_run(&self, workflow: &Workflow) -> Result<RunOutcome, WorkflowError> {
        workflow.validate()?;

        let mut run = RunOutcome::default();
        for job in &workflow.jobs {
            for cell in job.cells() {
                tracing::info!(
                    job = %job.name,
                    cell = %cell,
                    "Would execute {} steps",
                    job.steps.len()
                );
                for step in &job.steps {
                    tracing::debug!(step = %step, "Would execute step");
                }
                run.record(CellOutcome {
                    job: job.name.clone(),
                    cell: cell_display_name(job, &cell),
                    status: CellStatus::Skipped,
                    failed_step: None,
                    duration: std::time::Duration::ZERO,
                });
            }
        }
        Ok(run)
    }

    fn capabilities(&self) -> ExecutorCapabilities {
        ExecutorCapabilities {
            can_execute_shell: true,
            supports_parallel_cells: true,
            supports_artifacts: true,
        }
    }

    fn health_check(&self) -> HealthStatus {
        let result = Command::new("sh").arg("-c").arg("echo test").output();

        match result {
            Ok(output) if output.status.success() => HealthStatus::Healthy,
            Ok(_) => HealthStatus::Unhealthy {
                reason: "Shell command returned non-zero exit code".to_string(),
            },
            Err(e) => HealthStatus::Unhealthy {
                reason: format!("Shell not available: {e}"),
            },
        }
    }
}

impl LocalExecutor {
    /// Executes all cells of one job and returns their outcomes in
    /// expansion order.
    fn execute_job(&self, workflow: &Workflow, job: &Job, run_id: &str) -> Vec<CellOutcome> {
        let cells = job.cells();

        // Fail-fast runs cells one by one so the remainder can be
        // skipped; the default mode runs cells on independent threads.
        if job.fail_fast() {
            let mut outcomes = Vec::with_capacity(cells.len());
            let mut failed = false;
            for cell in cells {
                if failed {
                    outcomes.push(CellOutcome {
                        job: job.name.clone(),
                        cell: cell_display_name(job, &cell),
                        status: CellStatus::Skipped,
                        failed_step: None,
                        duration: std::time::Duration::ZERO,
                    });
                    continue;
                }
                let outcome = Self::execute_cell(&self.config, workflow, job, &cell, run_id);
                failed = outcome.status.is_failure();
                outcomes.push(outcome);
            }
            return outcomes;
        }

        let results: Arc<Mutex<Vec<(usize, CellOutcome)>>> =
            Arc::new(Mutex::new(Vec::with_capacity(cells.len())));

        let handles: Vec<_> = cells
            .into_iter()
            .enumerate()
            .map(|(index, cell)| {
                let results = Arc::clone(&results);
                let config = self.config.clone();
                let workflow = workflow.clone();
                let job = job.clone();
                let run_id = run_id.to_string();

                std::thread::spawn(move || {
                    let outcome = Self::execute_cell(&config, &workflow, &job, &cell, &run_id);
                    let mut guard = results.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                    guard.push((index, outcome));
                })
            })
            .collect();

        for handle in handles {
            let _ = handle.join();
        }

        let mut outcomes = results
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        outcomes.sort_by_key(|(index, _)| *index);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }

    /// Executes one matrix cell: sequential steps, stop on first failure.
    fn execute_cell(
        config: &ExecutorConfig,
        workflow: &Workflow,
        job: &Job,
        cell: &MatrixCell,
        run_id: &str,
    ) -> CellOutcome {
        let cell_name = cell_display_name(job, cell);
        let workspace = config
            .workspace_root
            .join(run_id)
            .join(&job.name)
            .join(sanitize_path_component(&cell_name));

        let start = Instant::now();

        if let Err(e) = std::fs::create_dir_all(&workspace) {
            tracing::error!(cell = %cell_name, error = %e, "Failed to create workspace");
            return CellOutcome {
                job: job.name.clone(),
                cell: cell_name,
                status: CellStatus::Failure,
                failed_step: Some("workspace".to_string()),
                duration: start.elapsed(),
            };
        }

        let mut context = CellContext::new(&workspace, run_id);
        for (key, value) in &workflow.env.vars {
            context.set_env(key, value);
        }
        for (key, value) in &job.env.vars {
            context.set_env(key, value);
        }
        for (key, value) in cell.env() {
            context.set_env(key, value);
        }
        let runner_os = cell
            .get("os")
            .map_or_else(|| std::env::consts::OS.to_string(), ToString::to_string);
        context.set_env("RUNNER_OS", runner_os);

        tracing::info!(job = %job.name, cell = %cell_name, "Executing cell");

        let mut failed_step = None;
        for step in &job.steps {
            let label = step.label();
            tracing::info!(cell = %cell_name, step = %label, "Executing step");

            match Self::execute_step(config, step, &mut context) {
                Ok(()) => context.record_step_result(&label, CellStatus::Success),
                Err(e) => {
                    tracing::error!(cell = %cell_name, step = %label, error = %e, "Step failed");
                    context.record_step_result(&label, CellStatus::Failure);
                    failed_step = Some(label);
                    break;
                }
            }
        }

        let status = if failed_step.is_some() {
            CellStatus::Failure
        } else {
            CellStatus::Success
        };

        // Successful workspaces are removed; failing ones are left
        // behind for inspection.
        if status.is_success() && !config.keep_workspaces {
            let _ = std::fs::remove_dir_all(&workspace);
        }

        let duration = start.elapsed();
        tracing::info!(cell = %cell_name, status = %status, duration_ms = duration.as_millis(), "Cell finished");

        CellOutcome {
            job: job.name.clone(),
            cell: cell_name,
            status,
            failed_step,
            duration,
        }
    }

    /// Executes a single step inside a cell context
    fn execute_step(
        config: &ExecutorConfig,
        step: &Step,
        context: &mut CellContext,
    ) -> Result<(), WorkflowError> {
        match &step.step_type {
            StepType::Checkout => {
                artifacts::copy_tree(&config.checkout_source, &context.workspace)?;
                Ok(())
            }
            StepType::SetupRuntime { version } => {
                // The local runner does not provision interpreters; the
                // requested version is resolved and exported for the
                // following steps.
                let resolved = expand_variables(version, &context.env);
                context.set_env("RUNTIME_VERSION", resolved.clone());
                tracing::info!(version = %resolved, "Runtime requested");
                Ok(())
            }
            StepType::Run { command } => {
                let shell_config = ShellConfig {
                    cwd: context.workspace.clone(),
                    env: context.env.clone(),
                    shell: config.shell.clone(),
                };
                let result = ShellCommand::new(&shell_config).execute(command)?;
                if result.is_failure() {
                    return Err(WorkflowError::CommandFailed {
                        code: result.exit_code,
                        stderr: result.stderr,
                    });
                }
                Ok(())
            }
            StepType::InstallArtifact { pattern } => {
                let pattern = expand_variables(pattern, &context.env);
                let located = artifacts::locate(&context.workspace, &pattern)?;
                let artifact = located[0].to_string_lossy().to_string();
                context.set_env("GRIDLINE_ARTIFACT", artifact.clone());

                if let Some(install) = &config.install_command {
                    let shell_config = ShellConfig {
                        cwd: context.workspace.clone(),
                        env: context.env.clone(),
                        shell: config.shell.clone(),
                    };
                    let command = format!("{install} {artifact}");
                    let result = ShellCommand::new(&shell_config).execute(&command)?;
                    if result.is_failure() {
                        return Err(WorkflowError::CommandFailed {
                            code: result.exit_code,
                            stderr: result.stderr,
                        });
                    }
                }
                Ok(())
            }
            StepType::UploadArtifact { name, path } => {
                let name = expand_variables(name, &context.env);
                let path = expand_variables(path, &context.env);
                let source = context.workspace.join(path.trim_end_matches('/'));
                artifacts::stage(&config.artifacts_root, &name, &source)?;
                Ok(())
            }
        }
    }
}

/// Cell name used for outcomes, workspaces and logs; the implicit cell
/// of a matrix-less job borrows the job name.
fn cell_display_name(job: &Job, cell: &MatrixCell) -> String {
    if cell.is_empty() {
        job.name.clone()
    } else {
        cell.name()
    }
}

fn sanitize_path_component(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '.' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{Matrix, Trigger};
    use pretty_assertions::assert_eq;

    fn test_executor(tmp: &tempfile::TempDir) -> LocalExecutor {
        LocalExecutor::new()
            .with_workspace_root(tmp.path().join("work"))
            .with_artifacts_root(tmp.path().join("artifacts"))
            .with_checkout_source(tmp.path().join("repo"))
    }

    fn seed_repo(tmp: &tempfile::TempDir) {
        std::fs::create_dir_all(tmp.path().join("repo")).unwrap();
        std::fs::write(tmp.path().join("repo").join("README.md"), "hello\n").unwrap();
    }

    fn workflow_of(job: Job) -> Workflow {
        Workflow::builder()
            .name("Run unittests")
            .trigger(Trigger::Dispatch)
            .job(job)
            .build_unchecked()
    }

    #[test]
    fn test_execute_single_cell_success() {
        let tmp = tempfile::tempdir().unwrap();
        seed_repo(&tmp);
        let executor = test_executor(&tmp);

        let workflow = workflow_of(Job::new(
            "unittest",
            vec![Step::checkout(), Step::run("test -f README.md")],
        ));

        let run = executor.execute(&workflow).unwrap();
        assert!(run.is_success());
        assert_eq!(run.cells.len(), 1);
        assert_eq!(run.cells[0].cell, "unittest");
    }

    #[test]
    fn test_step_failure_stops_cell_and_reports_step() {
        let tmp = tempfile::tempdir().unwrap();
        seed_repo(&tmp);
        let executor = test_executor(&tmp);

        let workflow = workflow_of(Job::new(
            "unittest",
            vec![
                Step::checkout(),
                Step::run("exit 1").with_name("Run unittests"),
                Step::run("echo never-reached > marker.txt"),
            ],
        ));

        let run = executor.execute(&workflow).unwrap();
        assert!(!run.is_success());
        assert_eq!(
            run.cells[0].failed_step,
            Some("Run unittests".to_string())
        );
    }

    #[test]
    fn test_failing_cell_does_not_stop_siblings() {
        let tmp = tempfile::tempdir().unwrap();
        seed_repo(&tmp);
        let executor = test_executor(&tmp);

        let matrix = Matrix::new().axis(
            "mode",
            vec!["pass".to_string(), "fail".to_string(), "pass2".to_string()],
        );
        let workflow = workflow_of(
            Job::new(
                "unittest",
                vec![Step::run("test \"${MATRIX_MODE}\" != fail")],
            )
            .with_matrix(matrix),
        );

        let run = executor.execute(&workflow).unwrap();
        assert_eq!(run.cells.len(), 3);
        assert_eq!(run.failed_cells().len(), 1);
        assert_eq!(run.cells[0].status, CellStatus::Success);
        assert_eq!(run.cells[1].status, CellStatus::Failure);
        assert_eq!(run.cells[2].status, CellStatus::Success);
    }

    #[test]
    fn test_fail_fast_skips_remaining_cells() {
        let tmp = tempfile::tempdir().unwrap();
        seed_repo(&tmp);
        let executor = test_executor(&tmp);

        let matrix = Matrix::new()
            .axis(
                "mode",
                vec!["fail".to_string(), "pass".to_string(), "pass2".to_string()],
            )
            .with_fail_fast(true);
        let workflow = workflow_of(
            Job::new(
                "unittest",
                vec![Step::run("test \"${MATRIX_MODE}\" != fail")],
            )
            .with_matrix(matrix),
        );

        let run = executor.execute(&workflow).unwrap();
        assert_eq!(run.cells[0].status, CellStatus::Failure);
        assert_eq!(run.cells[1].status, CellStatus::Skipped);
        assert_eq!(run.cells[2].status, CellStatus::Skipped);
    }

    #[test]
    fn test_matrix_env_is_visible_to_steps() {
        let tmp = tempfile::tempdir().unwrap();
        seed_repo(&tmp);
        let executor = test_executor(&tmp);

        let matrix = Matrix::new().axis("python-version", vec!["3.11".to_string()]);
        let workflow = workflow_of(
            Job::new(
                "unittest",
                vec![Step::run("test \"${MATRIX_PYTHON_VERSION}\" = 3.11")],
            )
            .with_matrix(matrix),
        );

        assert!(executor.execute(&workflow).unwrap().is_success());
    }

    #[test]
    fn test_setup_runtime_exports_version() {
        let tmp = tempfile::tempdir().unwrap();
        seed_repo(&tmp);
        let executor = test_executor(&tmp);

        let matrix = Matrix::new().axis("python-version", vec!["3.12".to_string()]);
        let workflow = workflow_of(
            Job::new(
                "unittest",
                vec![
                    Step::setup_runtime("${MATRIX_PYTHON_VERSION}"),
                    Step::run("test \"${RUNTIME_VERSION}\" = 3.12"),
                ],
            )
            .with_matrix(matrix),
        );

        assert!(executor.execute(&workflow).unwrap().is_success());
    }

    #[test]
    fn test_install_artifact_exports_located_path() {
        let tmp = tempfile::tempdir().unwrap();
        seed_repo(&tmp);
        let executor = test_executor(&tmp);

        let workflow = workflow_of(Job::new(
            "unittest",
            vec![
                Step::run("mkdir dist && touch dist/pkg-1.0-py3-none-any.whl"),
                Step::install_artifact("dist/*.whl"),
                Step::run("test -f \"${GRIDLINE_ARTIFACT}\""),
            ],
        ));

        assert!(executor.execute(&workflow).unwrap().is_success());
    }

    #[test]
    fn test_missing_artifact_fails_only_its_cell() {
        let tmp = tempfile::tempdir().unwrap();
        seed_repo(&tmp);
        let executor = test_executor(&tmp);

        let workflow = workflow_of(Job::new(
            "unittest",
            vec![Step::install_artifact("dist/*.whl").with_name("Install built wheel")],
        ));

        let run = executor.execute(&workflow).unwrap();
        assert_eq!(run.cells[0].status, CellStatus::Failure);
        assert_eq!(
            run.cells[0].failed_step,
            Some("Install built wheel".to_string())
        );
    }

    #[test]
    fn test_upload_stages_per_cell_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        seed_repo(&tmp);
        let executor = test_executor(&tmp);

        let matrix = Matrix::new().axis("os", vec!["ubuntu-latest".to_string()]);
        let workflow = workflow_of(
            Job::new(
                "unittest",
                vec![
                    Step::run("mkdir reports && echo ok > reports/summary.txt"),
                    Step::upload_artifact("test-report-${MATRIX_OS}", "reports/"),
                ],
            )
            .with_matrix(matrix),
        );

        let run = executor.execute(&workflow).unwrap();
        assert!(run.is_success());
        let staged = tmp
            .path()
            .join("artifacts")
            .join("test-report-ubuntu-latest")
            .join("summary.txt");
        assert!(staged.exists());
    }

    #[test]
    fn test_dry_run_has_no_side_effects() {
        let tmp = tempfile::tempdir().unwrap();
        seed_repo(&tmp);
        let executor = test_executor(&tmp);

        let workflow = workflow_of(Job::new(
            "unittest",
            vec![Step::run("echo leaked > leak.txt")],
        ));

        let run = executor.dry_run(&workflow).unwrap();
        assert_eq!(run.cells.len(), 1);
        assert_eq!(run.cells[0].status, CellStatus::Skipped);
        assert!(!tmp.path().join("work").exists());
    }

    #[test]
    fn test_execute_records_run_metrics() {
        let tmp = tempfile::tempdir().unwrap();
        seed_repo(&tmp);
        let executor = test_executor(&tmp);

        let matrix = Matrix::new().axis(
            "mode",
            vec!["pass".to_string(), "fail".to_string()],
        );
        let workflow = workflow_of(
            Job::new(
                "unittest",
                vec![Step::run("test \"${MATRIX_MODE}\" != fail")],
            )
            .with_matrix(matrix),
        );

        executor.execute(&workflow).unwrap();
        let metrics = executor.metrics().get("Run unittests").unwrap();
        assert_eq!(metrics.cell_count, 2);
        assert_eq!(metrics.successful_cells, 1);
        assert_eq!(metrics.failed_cells, 1);
    }

    #[test]
    fn test_health_check_reports_shell() {
        let executor = LocalExecutor::new();
        assert!(executor.health_check().is_operational());
    }
}
