//! CLI tools for gridline
//!
//! Provides the commands exposed by the `gridline` binary:
//! - `run`: Execute a workflow's matrix locally
//! - `check`: Validate workflow structure and step ordering
//! - `lint`: Analyze workflows for common problems
//! - `export`: Render a workflow as GitHub Actions YAML
//! - `init`: Write the built-in package test workflow
//! - `completions`: Generate shell completions

pub mod check;
pub mod completions;
pub mod export;
pub mod lint;
pub mod run;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for gridline
#[derive(Parser, Debug)]
#[command(name = "gridline")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a workflow's matrix cells locally
    Run {
        /// Workflow file to run
        file: PathBuf,
        /// Only run the named job
        #[arg(short, long)]
        job: Option<String>,
        /// Directory uploaded artifacts are staged into
        #[arg(short, long)]
        artifacts_dir: Option<PathBuf>,
        /// Directory cell workspaces are created under
        #[arg(short, long)]
        workspace_dir: Option<PathBuf>,
        /// Command prefix used to install located artifacts
        #[arg(long)]
        install_command: Option<String>,
        /// Print the execution plan without running anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate workflow structure and step ordering
    Check {
        /// Workflow file to validate
        file: PathBuf,
    },

    /// Analyze workflow for common problems
    Lint {
        /// Workflow file to lint
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<LintFormat>,
        /// Minimum severity to show
        #[arg(short, long, value_enum)]
        severity: Option<LintSeverityArg>,
        /// Show suggestions
        #[arg(long)]
        suggestions: bool,
    },

    /// Render a workflow as GitHub Actions YAML
    Export {
        /// Workflow file to export
        file: PathBuf,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the built-in package test workflow
    Init {
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: ShellArg,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LintFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LintSeverityArg {
    Info,
    Warning,
    Error,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ShellArg {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Build the CLI command for completion generation
pub fn build_cli() -> clap::Command {
    Args::command()
}

/// Parse and execute CLI arguments
pub fn run() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Run {
            file,
            job,
            artifacts_dir,
            workspace_dir,
            install_command,
            dry_run,
        } => {
            let options = run::RunOptions {
                job,
                artifacts_dir,
                workspace_dir,
                install_command,
                dry_run,
            };
            run::run_workflow(&file, &options)?;
        }
        Command::Check { file } => {
            check::check_workflow(&file)?;
        }
        Command::Lint {
            file,
            format,
            severity,
            suggestions,
        } => {
            let config = lint::LintConfig {
                min_severity: match severity {
                    Some(LintSeverityArg::Warning) => lint::LintSeverity::Warning,
                    Some(LintSeverityArg::Error) => lint::LintSeverity::Error,
                    Some(LintSeverityArg::Info) | None => lint::LintSeverity::Info,
                },
                show_suggestions: suggestions,
                format: match format {
                    Some(LintFormat::Json) => lint::OutputFormat::Json,
                    Some(LintFormat::Text) | None => lint::OutputFormat::Text,
                },
            };

            let messages = lint::lint_workflow(&file, &config)?;
            let output = lint::format_lint_messages(&messages, &config);
            println!("{output}");
        }
        Command::Export { file, output } => {
            let exported = export::export_workflow(&file)?;
            if let Some(output_path) = output {
                export::save_export(&exported, &output_path)?;
            } else {
                println!("{exported}");
            }
        }
        Command::Init { output } => {
            let rendered = export::render_template()?;
            if let Some(output_path) = output {
                export::save_export(&rendered, &output_path)?;
            } else {
                println!("{rendered}");
            }
        }
        Command::Completions { shell, output } => {
            use clap_complete::Shell;

            let shell_enum = match shell {
                ShellArg::Bash => Shell::Bash,
                ShellArg::Zsh => Shell::Zsh,
                ShellArg::Fish => Shell::Fish,
                ShellArg::PowerShell => Shell::PowerShell,
            };

            let generated = completions::generate_completions(shell_enum)?;
            if let Some(output_path) = output {
                completions::save_completions(&generated, &output_path)?;
            } else {
                println!("{generated}");
            }
        }
    }

    Ok(())
}
