//! `gridline check` - Validate workflow structure and step ordering
//!
//! Beyond the model-level validation, `check` enforces the canonical
//! shape of a package test job: checkout comes first, runtime setup
//! precedes every command, artifact installation follows a build
//! command, and uploads come last.

use crate::infrastructure::load_workflow;
use crate::workflow::{Job, StepType, Validate, Workflow};
use anyhow::{Context, Result};
use std::path::Path;

/// Validates a workflow file, including step ordering.
pub fn check_workflow(file: &Path) -> Result<()> {
    let workflow = load_workflow(file)
        .with_context(|| format!("Failed to load workflow: {}", file.display()))?;

    let problems = check_structure(&workflow);
    if problems.is_empty() {
        println!(
            "OK: {} ({} jobs, {} cells)",
            workflow.name,
            workflow.jobs.len(),
            workflow.cell_count()
        );
        return Ok(());
    }

    for problem in &problems {
        eprintln!("error: {problem}");
    }
    anyhow::bail!("{} structural problem(s) found", problems.len());
}

/// Runs the structural checks on an already-loaded workflow.
#[must_use]
pub fn check_structure(workflow: &Workflow) -> Vec<String> {
    let mut problems = Vec::new();

    if let Err(e) = workflow.validate() {
        problems.push(e.to_string());
        return problems;
    }

    for job in &workflow.jobs {
        check_step_order(job, &mut problems);
    }
    problems
}

/// Step ordering rules for one job.
fn check_step_order(job: &Job, problems: &mut Vec<String>) {
    let kinds: Vec<&str> = job.steps.iter().map(|s| s.step_type.kind()).collect();

    for (index, step) in job.steps.iter().enumerate() {
        match &step.step_type {
            StepType::Checkout => {
                if index != 0 {
                    problems.push(format!(
                        "job `{}`: checkout must be the first step, found at position {}",
                        job.name,
                        index + 1
                    ));
                }
            }
            StepType::SetupRuntime { .. } => {
                if kinds[..index]
                    .iter()
                    .any(|k| matches!(*k, "run" | "install-artifact"))
                {
                    problems.push(format!(
                        "job `{}`: runtime setup must precede commands",
                        job.name
                    ));
                }
            }
            StepType::InstallArtifact { .. } => {
                if !kinds[..index].contains(&"run") {
                    problems.push(format!(
                        "job `{}`: install-artifact needs a preceding build command",
                        job.name
                    ));
                }
            }
            StepType::UploadArtifact { .. } => {
                if kinds[index + 1..].iter().any(|k| *k != "upload") {
                    problems.push(format!(
                        "job `{}`: uploads must be the last steps",
                        job.name
                    ));
                }
            }
            StepType::Run { .. } => {}
        }
    }

    if kinds.iter().filter(|k| **k == "checkout").count() > 1 {
        problems.push(format!("job `{}`: more than one checkout step", job.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{Step, Trigger, package_test_workflow};

    fn workflow_of(steps: Vec<Step>) -> Workflow {
        Workflow::builder()
            .name("Check")
            .trigger(Trigger::Dispatch)
            .job(Job::new("unittest", steps))
            .build_unchecked()
    }

    #[test]
    fn test_package_test_workflow_passes() {
        let problems = check_structure(&package_test_workflow());
        assert!(problems.is_empty(), "{problems:?}");
    }

    #[test]
    fn test_late_checkout_is_flagged() {
        let problems = check_structure(&workflow_of(vec![
            Step::run("echo first"),
            Step::checkout(),
        ]));
        assert!(problems.iter().any(|p| p.contains("checkout")));
    }

    #[test]
    fn test_setup_after_run_is_flagged() {
        let problems = check_structure(&workflow_of(vec![
            Step::checkout(),
            Step::run("python -m build"),
            Step::setup_runtime("3.11"),
        ]));
        assert!(problems.iter().any(|p| p.contains("runtime setup")));
    }

    #[test]
    fn test_install_without_build_is_flagged() {
        let problems = check_structure(&workflow_of(vec![
            Step::checkout(),
            Step::install_artifact("dist/*.whl"),
        ]));
        assert!(problems.iter().any(|p| p.contains("install-artifact")));
    }

    #[test]
    fn test_upload_not_last_is_flagged() {
        let problems = check_structure(&workflow_of(vec![
            Step::checkout(),
            Step::upload_artifact("report", "reports/"),
            Step::run("echo after"),
        ]));
        assert!(problems.iter().any(|p| p.contains("last")));
    }

    #[test]
    fn test_invalid_workflow_reports_validation_error() {
        let workflow = Workflow::builder().name("Empty").build_unchecked();
        let problems = check_structure(&workflow);
        assert_eq!(problems.len(), 1);
    }
}
