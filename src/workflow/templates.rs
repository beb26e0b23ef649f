//! Canonical workflow templates
//!
//! The package test template reproduces the classic wheel-testing
//! pipeline: check out, provision a runtime per matrix cell, install
//! declared dependencies, build a distributable, install the built
//! artifact by filename pattern, run the two test entry points and
//! persist the generated reports as a per-cell artifact.

use crate::workflow::job::{Job, Workflow};
use crate::workflow::matrix::Matrix;
use crate::workflow::steps::Step;
use crate::workflow::triggers::Trigger;

/// Branch the default push and pull request triggers filter on
pub const DEFAULT_BRANCH: &str = "master";

/// Operating systems the default matrix spans
pub const DEFAULT_OS_VALUES: &[&str] = &["ubuntu-latest", "macos-latest", "windows-latest"];

/// Runtime versions the default matrix spans
pub const DEFAULT_RUNTIME_VALUES: &[&str] = &["3.10", "3.11", "3.12"];

/// Filename pattern of the built distributable
pub const WHEEL_PATTERN: &str = "dist/*.whl";

/// Directory the test invocations write their reports into
pub const REPORTS_DIR: &str = "reports/";

/// Builds the canonical package test workflow.
///
/// Every matrix cell executes the same seven-phase sequence in order:
/// checkout, setup, install, build, install-artifact, test (twice),
/// upload. Fail-fast is disabled so each cell reports independently.
#[must_use]
pub fn package_test_workflow() -> Workflow {
    let matrix = Matrix::new()
        .axis(
            "os",
            DEFAULT_OS_VALUES.iter().map(ToString::to_string).collect(),
        )
        .axis(
            "python-version",
            DEFAULT_RUNTIME_VALUES
                .iter()
                .map(ToString::to_string)
                .collect(),
        )
        .with_fail_fast(false);

    let job = Job::new(
        "unittest",
        vec![
            Step::checkout().with_name("Checkout repository"),
            Step::setup_runtime("${MATRIX_PYTHON_VERSION}").with_name("Set up runtime"),
            Step::run("python -m pip install -r requirements.txt")
                .with_name("Install dependencies"),
            Step::run("python -m build").with_name("Build package"),
            Step::install_artifact(WHEEL_PATTERN).with_name("Install built wheel"),
            Step::run("python -m unittest discover --verbose").with_name("Run unittests"),
            Step::run("python -m tests.generate_report").with_name("Generate test report"),
            Step::upload_artifact(
                "test-report-${MATRIX_OS}-${MATRIX_PYTHON_VERSION}",
                REPORTS_DIR,
            )
            .with_name("Upload test report"),
        ],
    )
    .with_runs_on("${MATRIX_OS}")
    .with_matrix(matrix);

    Workflow::builder()
        .name("Run unittests")
        .trigger(Trigger::Dispatch)
        .trigger(Trigger::push(DEFAULT_BRANCH))
        .trigger(Trigger::pull_request(DEFAULT_BRANCH))
        .job(job)
        .build_unchecked()
}
