//! GitHub Actions backend
//!
//! Loads the GitHub-Actions-shaped subset of workflow YAML into the
//! typed model and renders a [`Workflow`] back to workflow YAML.
//!
//! The supported step forms are `uses: actions/checkout@*`,
//! `uses: actions/setup-*@*` (version taken from `with`),
//! `uses: actions/upload-artifact@*` (`with.name` and `with.path`),
//! plain `run:` lines, and the `install-artifact:` shorthand for
//! locating a previously built artifact by wildcard pattern. Matrix
//! expressions `${{ matrix.axis }}` are mapped to the runner's
//! `${MATRIX_AXIS}` variables on load and back on render.

use crate::workflow::{
    Environment, Job, Matrix, Step, Trigger, Workflow, WorkflowError, axis_env_key,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

static MATRIX_EXPR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{\{\s*matrix\.([A-Za-z0-9_.-]+)\s*\}\}").unwrap());

/// Loads a workflow from a YAML file
pub fn load_workflow(path: &Path) -> Result<Workflow, WorkflowError> {
    let source = std::fs::read_to_string(path)?;
    parse_workflow(&source)
}

/// Parses workflow YAML into the typed model
pub fn parse_workflow(source: &str) -> Result<Workflow, WorkflowError> {
    let file: WorkflowFile = serde_yaml::from_str(source)?;

    let mut builder = Workflow::builder().name(&file.name);
    for trigger in parse_triggers(&file.triggers)? {
        builder = builder.trigger(trigger);
    }
    builder = builder.env(|mut e| {
        for (key, value) in &file.env {
            e = e.set(key, value);
        }
        e
    });

    for (name, job) in &file.jobs {
        let name = name
            .as_str()
            .ok_or_else(|| WorkflowError::Parse("job names must be strings".to_string()))?;
        let job: JobFile = serde_yaml::from_value(job.clone())?;
        builder = builder.job(parse_job(name, &job)?);
    }

    Ok(builder.build()?)
}

fn parse_triggers(on: &serde_yaml::Value) -> Result<Vec<Trigger>, WorkflowError> {
    let mapping = on
        .as_mapping()
        .ok_or_else(|| WorkflowError::Parse("`on` must be a mapping of events".to_string()))?;

    let mut triggers = Vec::new();
    for (event, options) in mapping {
        let event = event
            .as_str()
            .ok_or_else(|| WorkflowError::Parse("event names must be strings".to_string()))?;
        let branches = match options {
            serde_yaml::Value::Null => Vec::new(),
            value => {
                let options: TriggerOptions = serde_yaml::from_value(value.clone())?;
                options.branches
            }
        };
        let trigger = match event {
            "workflow_dispatch" => Trigger::Dispatch,
            "push" => Trigger::Push { branches },
            "pull_request" => Trigger::PullRequest { branches },
            other => {
                return Err(WorkflowError::Parse(format!(
                    "unsupported trigger event `{other}`"
                )));
            }
        };
        triggers.push(trigger);
    }
    Ok(triggers)
}

fn parse_job(name: &str, file: &JobFile) -> Result<Job, WorkflowError> {
    let mut steps = Vec::with_capacity(file.steps.len());
    for step in &file.steps {
        steps.push(parse_step(step)?);
    }

    let mut job = Job::new(name, steps).with_runs_on(map_matrix_exprs(&file.runs_on));

    if let Some(strategy) = &file.strategy {
        let mut matrix = Matrix::new();
        for (axis, values) in &strategy.matrix {
            let axis = axis
                .as_str()
                .ok_or_else(|| WorkflowError::Parse("matrix axis names must be strings".to_string()))?;
            if axis == "exclude" {
                let excludes: Vec<BTreeMap<String, serde_yaml::Value>> =
                    serde_yaml::from_value(values.clone())?;
                for exclude in excludes {
                    let conditions = exclude
                        .into_iter()
                        .map(|(k, v)| (k, yaml_scalar(&v)))
                        .collect();
                    matrix = matrix.exclude(conditions);
                }
                continue;
            }
            let values: Vec<serde_yaml::Value> = serde_yaml::from_value(values.clone())?;
            matrix = matrix.axis(axis, values.iter().map(yaml_scalar).collect());
        }
        matrix = matrix.with_fail_fast(strategy.fail_fast.unwrap_or(false));
        job = job.with_matrix(matrix);
    }

    if !file.env.is_empty() {
        let mut env = Environment::new();
        for (key, value) in &file.env {
            env = env.set(key, value);
        }
        job = job.with_env(env);
    }

    Ok(job)
}

fn parse_step(file: &StepFile) -> Result<Step, WorkflowError> {
    let step = match (&file.uses, &file.run, &file.install_artifact) {
        (Some(uses), None, None) => parse_uses_step(uses, file.with.as_ref())?,
        (None, Some(run), None) => Step::run(map_matrix_exprs(run)),
        (None, None, Some(pattern)) => Step::install_artifact(map_matrix_exprs(pattern)),
        _ => {
            return Err(WorkflowError::Parse(
                "each step needs exactly one of `uses`, `run` or `install-artifact`".to_string(),
            ));
        }
    };

    Ok(match &file.name {
        Some(name) => step.with_name(name),
        None => step,
    })
}

fn parse_uses_step(uses: &str, with: Option<&StepWith>) -> Result<Step, WorkflowError> {
    let action = uses.split('@').next().unwrap_or(uses);
    match action {
        "actions/checkout" => Ok(Step::checkout()),
        _ if action.starts_with("actions/setup-") => {
            let version = with
                .and_then(|w| w.python_version.as_deref().or(w.version.as_deref()))
                .ok_or_else(|| {
                    WorkflowError::Parse(format!("`{uses}` needs a version in `with`"))
                })?;
            Ok(Step::setup_runtime(map_matrix_exprs(version)))
        }
        "actions/upload-artifact" => {
            let with = with.ok_or_else(|| {
                WorkflowError::Parse(format!("`{uses}` needs `with.name` and `with.path`"))
            })?;
            match (&with.name, &with.path) {
                (Some(name), Some(path)) => Ok(Step::upload_artifact(
                    map_matrix_exprs(name),
                    map_matrix_exprs(path),
                )),
                _ => Err(WorkflowError::Parse(format!(
                    "`{uses}` needs `with.name` and `with.path`"
                ))),
            }
        }
        other => Err(WorkflowError::Parse(format!(
            "unsupported action `{other}`"
        ))),
    }
}

/// Rewrites `${{ matrix.axis }}` expressions to `${MATRIX_AXIS}`
fn map_matrix_exprs(input: &str) -> String {
    MATRIX_EXPR
        .replace_all(input, |caps: &regex::Captures<'_>| {
            format!("${{{}}}", axis_env_key(&caps[1]))
        })
        .into_owned()
}

fn yaml_scalar(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        other => serde_yaml::to_string(other)
            .unwrap_or_default()
            .trim_end()
            .to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct WorkflowFile {
    name: String,
    #[serde(rename = "on")]
    triggers: serde_yaml::Value,
    #[serde(default)]
    env: BTreeMap<String, String>,
    jobs: serde_yaml::Mapping,
}

#[derive(Debug, Deserialize)]
struct TriggerOptions {
    #[serde(default)]
    branches: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct JobFile {
    #[serde(rename = "runs-on", default = "default_runs_on")]
    runs_on: String,
    #[serde(default)]
    strategy: Option<StrategyFile>,
    #[serde(default)]
    env: BTreeMap<String, String>,
    #[serde(default)]
    steps: Vec<StepFile>,
}

fn default_runs_on() -> String {
    "ubuntu-latest".to_string()
}

#[derive(Debug, Deserialize)]
struct StrategyFile {
    #[serde(rename = "fail-fast", default)]
    fail_fast: Option<bool>,
    // A mapping rather than a map type: axis order drives cell naming.
    #[serde(default)]
    matrix: serde_yaml::Mapping,
}

#[derive(Debug, Deserialize)]
struct StepFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    uses: Option<String>,
    #[serde(default)]
    run: Option<String>,
    #[serde(rename = "install-artifact", default)]
    install_artifact: Option<String>,
    #[serde(default)]
    with: Option<StepWith>,
}

#[derive(Debug, Deserialize)]
struct StepWith {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(rename = "python-version", default)]
    python_version: Option<String>,
}

/// Backend for rendering workflows as GitHub Actions YAML
pub struct GitHubActionsBackend;

impl GitHubActionsBackend {
    /// Creates a new GitHub Actions backend
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders a workflow to GitHub Actions workflow YAML
    #[allow(clippy::unused_self, clippy::missing_errors_doc)]
    pub fn render(&self, workflow: &Workflow) -> Result<String, WorkflowError> {
        let mut yaml = String::new();

        yaml.push_str(&format!("name: {}\n\n", workflow.name));

        yaml.push_str("on:\n");
        for trigger in &workflow.triggers {
            match trigger {
                Trigger::Dispatch => yaml.push_str("  workflow_dispatch:\n"),
                Trigger::Push { branches } => {
                    yaml.push_str("  push:\n");
                    render_branches(&mut yaml, branches);
                }
                Trigger::PullRequest { branches } => {
                    yaml.push_str("  pull_request:\n");
                    render_branches(&mut yaml, branches);
                }
            }
        }
        yaml.push('\n');

        if !workflow.env.vars.is_empty() {
            yaml.push_str("env:\n");
            for (key, value) in &workflow.env.vars {
                yaml.push_str(&format!("  {key}: {value}\n"));
            }
            yaml.push('\n');
        }

        yaml.push_str("jobs:\n");
        for job in &workflow.jobs {
            yaml.push_str(&self.render_job(job));
        }

        Ok(yaml)
    }

    fn render_job(&self, job: &Job) -> String {
        let axes: Vec<String> = job
            .matrix
            .as_ref()
            .map(|m| m.axes.iter().map(|a| a.name.clone()).collect())
            .unwrap_or_default();

        let mut out = String::new();
        out.push_str(&format!("  {}:\n", sanitize_job_name(&job.name)));
        out.push_str(&format!(
            "    runs-on: {}\n",
            unmap_matrix_exprs(&job.runs_on, &axes)
        ));

        if let Some(matrix) = &job.matrix {
            out.push_str("    strategy:\n");
            out.push_str(&format!("      fail-fast: {}\n", matrix.fail_fast));
            out.push_str("      matrix:\n");
            for axis in &matrix.axes {
                let values = axis
                    .values
                    .iter()
                    .map(|v| format!("'{v}'"))
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push_str(&format!("        {}: [{values}]\n", axis.name));
            }
            if !matrix.excludes.is_empty() {
                out.push_str("        exclude:\n");
                for exclude in &matrix.excludes {
                    for (i, (key, value)) in exclude.conditions.iter().enumerate() {
                        let bullet = if i == 0 { "- " } else { "  " };
                        out.push_str(&format!("          {bullet}{key}: '{value}'\n"));
                    }
                }
            }
        }

        if !job.env.vars.is_empty() {
            out.push_str("    env:\n");
            for (key, value) in &job.env.vars {
                out.push_str(&format!("      {key}: {value}\n"));
            }
        }

        out.push_str("    steps:\n");
        for step in &job.steps {
            out.push_str(&self.render_step(step, &axes));
        }
        out
    }

    #[allow(clippy::unused_self)]
    fn render_step(&self, step: &Step, axes: &[String]) -> String {
        use crate::workflow::StepType;

        let mut out = String::new();
        if let Some(name) = &step.name {
            out.push_str(&format!("      - name: {name}\n"));
        }
        let lead = if step.name.is_some() {
            "        "
        } else {
            "      - "
        };
        match &step.step_type {
            StepType::Checkout => {
                out.push_str(&format!("{lead}uses: actions/checkout@v4\n"));
            }
            StepType::SetupRuntime { version } => {
                out.push_str(&format!("{lead}uses: actions/setup-python@v5\n"));
                out.push_str("        with:\n");
                out.push_str(&format!(
                    "          python-version: '{}'\n",
                    unmap_matrix_exprs(version, axes)
                ));
            }
            StepType::Run { command } => {
                out.push_str(&format!("{lead}run: {}\n", unmap_matrix_exprs(command, axes)));
            }
            StepType::InstallArtifact { pattern } => {
                out.push_str(&format!(
                    "{lead}install-artifact: {}\n",
                    unmap_matrix_exprs(pattern, axes)
                ));
            }
            StepType::UploadArtifact { name, path } => {
                out.push_str(&format!("{lead}uses: actions/upload-artifact@v4\n"));
                out.push_str("        with:\n");
                out.push_str(&format!(
                    "          name: {}\n",
                    unmap_matrix_exprs(name, axes)
                ));
                out.push_str(&format!(
                    "          path: {}\n",
                    unmap_matrix_exprs(path, axes)
                ));
            }
        }
        out
    }
}

impl Default for GitHubActionsBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn render_branches(yaml: &mut String, branches: &[String]) {
    if branches.is_empty() {
        return;
    }
    let list = branches
        .iter()
        .map(|b| format!("'{b}'"))
        .collect::<Vec<_>>()
        .join(", ");
    yaml.push_str(&format!("    branches: [{list}]\n"));
}

/// Rewrites `${MATRIX_AXIS}` variables back to `${{ matrix.axis }}`
/// expressions, matching against the job's actual axis names.
fn unmap_matrix_exprs(input: &str, axes: &[String]) -> String {
    let mut out = input.to_string();
    for axis in axes {
        let var = format!("${{{}}}", axis_env_key(axis));
        let expr = format!("${{{{ matrix.{axis} }}}}");
        out = out.replace(&var, &expr);
    }
    out
}

/// Sanitizes job name for GitHub Actions
fn sanitize_job_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{StepType, package_test_workflow};
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r"
name: Run unittests
on:
  workflow_dispatch:
  push:
    branches: [master]
  pull_request:
    branches: [master]
jobs:
  unittest:
    runs-on: ${{ matrix.os }}
    strategy:
      fail-fast: false
      matrix:
        os: [ubuntu-latest, macos-latest, windows-latest]
        python-version: ['3.10', '3.11', '3.12']
    steps:
      - uses: actions/checkout@v4
      - name: Setup Python
        uses: actions/setup-python@v5
        with:
          python-version: ${{ matrix.python-version }}
      - name: Install dependencies
        run: python -m pip install -r requirements.txt
      - name: Build wheel
        run: python -m build
      - name: Install built wheel
        install-artifact: dist/*.whl
      - name: Run unittests
        run: python -m unittest discover --verbose
      - name: Generate report
        run: python -m tests.generate_report
      - name: Upload test report
        uses: actions/upload-artifact@v4
        with:
          name: test-report-${{ matrix.os }}-${{ matrix.python-version }}
          path: reports/
";

    #[test]
    fn test_parse_sample_workflow() {
        let workflow = parse_workflow(SAMPLE).unwrap();

        assert_eq!(workflow.name, "Run unittests");
        assert_eq!(workflow.triggers.len(), 3);
        assert_eq!(workflow.jobs.len(), 1);

        let job = &workflow.jobs[0];
        assert_eq!(job.name, "unittest");
        assert_eq!(job.runs_on, "${MATRIX_OS}");
        assert_eq!(job.cells().len(), 9);
        assert!(!job.fail_fast());
        assert_eq!(job.steps.len(), 8);
    }

    #[test]
    fn test_parse_maps_matrix_expressions() {
        let workflow = parse_workflow(SAMPLE).unwrap();
        let job = &workflow.jobs[0];

        match &job.steps[1].step_type {
            StepType::SetupRuntime { version } => {
                assert_eq!(version, "${MATRIX_PYTHON_VERSION}");
            }
            other => panic!("expected setup step, got {other:?}"),
        }
        match &job.steps[7].step_type {
            StepType::UploadArtifact { name, path } => {
                assert_eq!(name, "test-report-${MATRIX_OS}-${MATRIX_PYTHON_VERSION}");
                assert_eq!(path, "reports/");
            }
            other => panic!("expected upload step, got {other:?}"),
        }
    }

    #[test]
    fn test_load_demo_workflow_file() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/unittest.yml");
        let workflow = load_workflow(&path).unwrap();
        assert_eq!(workflow.name, "Run unittests");
        assert_eq!(workflow.cell_count(), 9);
    }

    #[test]
    fn test_parse_trigger_branch_filters() {
        let workflow = parse_workflow(SAMPLE).unwrap();

        assert!(workflow.triggers.contains(&Trigger::Dispatch));
        assert!(workflow.triggers.contains(&Trigger::push("master")));
        assert!(workflow.triggers.contains(&Trigger::pull_request("master")));
    }

    #[test]
    fn test_unsupported_action_is_a_parse_error() {
        let source = r"
name: Bad
on:
  workflow_dispatch:
jobs:
  build:
    steps:
      - uses: docker/build-push-action@v5
";
        let err = parse_workflow(source).unwrap_err();
        assert!(matches!(err, WorkflowError::Parse(_)));
        assert!(err.to_string().contains("docker/build-push-action"));
    }

    #[test]
    fn test_setup_without_version_is_a_parse_error() {
        let source = r"
name: Bad
on:
  workflow_dispatch:
jobs:
  build:
    steps:
      - uses: actions/setup-python@v5
";
        let err = parse_workflow(source).unwrap_err();
        assert!(matches!(err, WorkflowError::Parse(_)));
    }

    #[test]
    fn test_unquoted_matrix_versions_keep_yaml_semantics() {
        // 3.10 without quotes is a YAML float and truncates; the
        // loader keeps what YAML actually says.
        let source = r"
name: Versions
on:
  workflow_dispatch:
jobs:
  build:
    strategy:
      matrix:
        python-version: [3.1, 3.11]
    steps:
      - run: echo test
";
        let workflow = parse_workflow(source).unwrap();
        let matrix = workflow.jobs[0].matrix.as_ref().unwrap();
        assert_eq!(matrix.axes[0].values, vec!["3.1", "3.11"]);
    }

    #[test]
    fn test_matrix_axis_order_follows_declaration() {
        // Cell names follow axis declaration order, not alphabetical.
        let source = r"
name: Ordered
on:
  workflow_dispatch:
jobs:
  build:
    strategy:
      matrix:
        python-version: ['3.11']
        os: [ubuntu-latest]
    steps:
      - run: echo test
";
        let workflow = parse_workflow(source).unwrap();
        let cells = workflow.jobs[0].cells();
        assert_eq!(cells[0].name(), "3.11-ubuntu-latest");
    }

    #[test]
    fn test_render_package_test_workflow() {
        let workflow = package_test_workflow();
        let yaml = GitHubActionsBackend::new().render(&workflow).unwrap();

        assert!(yaml.starts_with("name: Run unittests\n"));
        assert!(yaml.contains("  workflow_dispatch:\n"));
        assert!(yaml.contains("  push:\n    branches: ['master']\n"));
        assert!(yaml.contains("  pull_request:\n    branches: ['master']\n"));
        assert!(yaml.contains("      fail-fast: false\n"));
        assert!(yaml.contains("runs-on: ${{ matrix.os }}"));
        assert!(yaml.contains("python-version: '${{ matrix.python-version }}'"));
        assert!(yaml.contains("name: test-report-${{ matrix.os }}-${{ matrix.python-version }}"));
        assert!(yaml.contains("path: reports/"));
    }

    #[test]
    fn test_render_then_parse_preserves_structure() {
        let workflow = package_test_workflow();
        let yaml = GitHubActionsBackend::new().render(&workflow).unwrap();
        let reparsed = parse_workflow(&yaml).unwrap();

        assert_eq!(reparsed.name, workflow.name);
        assert_eq!(reparsed.triggers, workflow.triggers);
        assert_eq!(reparsed.cell_count(), workflow.cell_count());
        let kinds: Vec<&str> = reparsed.jobs[0]
            .steps
            .iter()
            .map(|s| s.step_type.kind())
            .collect();
        let expected: Vec<&str> = workflow.jobs[0]
            .steps
            .iter()
            .map(|s| s.step_type.kind())
            .collect();
        assert_eq!(kinds, expected);
    }
}
