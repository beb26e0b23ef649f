//! gridline - Run matrix test workflows locally
//!
//! ## Commands
//!
//! - `gridline run` - Execute a workflow's matrix cells locally
//! - `gridline check` - Validate workflow structure and step ordering
//! - `gridline lint` - Analyze workflows for common problems
//! - `gridline export` - Render a workflow as GitHub Actions YAML
//! - `gridline init` - Write the built-in package test workflow
//! - `gridline completions` - Generate shell completions
//!
//! ## Quick Start
//!
//! ```bash
//! # Scaffold the default test workflow
//! gridline init -o .github/workflows/test.yml
//!
//! # Validate it
//! gridline check .github/workflows/test.yml
//!
//! # Run the full matrix locally
//! gridline run .github/workflows/test.yml
//! ```

use gridline::cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Initialize tracing for debugging
    if std::env::var("GRIDLINE_DEBUG").is_ok() {
        gridline::init_logging("debug");
    }

    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if std::env::var("GRIDLINE_VERBOSE").is_ok() {
                eprintln!("{e:?}");
            }
            ExitCode::FAILURE
        }
    }
}
