//! Command execution and outcome reporting

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::CommandFactory;

use crate::cli::output::{create_spinner, print_error, print_info, print_progress, print_success};
use crate::cli::Cli;
use crate::core::dispatch::{Command, Dispatcher, Report};
use crate::core::global_config::GlobalConfig;
use crate::core::options::RunFlags;
use crate::core::package::ProgressSink;
use crate::core::workspace::Workspace;

/// Execute `command` in the current directory and report every outcome
pub async fn execute(command: Command, flags: &RunFlags, config: GlobalConfig) -> Result<()> {
    let root = std::env::current_dir().context("Failed to determine the working directory")?;
    let progress: ProgressSink = Arc::new(print_progress);
    let mut dispatcher = Dispatcher::open(Workspace::new(root), config, progress).await;

    let unknown = matches!(command, Command::Unknown { .. });
    let spinner = matches!(
        command,
        Command::Build { .. } | Command::Package | Command::Bootstrap
    )
    .then(|| create_spinner(&format!("Running {command}...")));

    let report = dispatcher.run(command, flags).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if report.show_usage {
        if unknown {
            print_info(&format!("Unknown command '{}'", report.command));
        }
        Cli::command().print_help()?;
        return Ok(());
    }

    render(&report);

    if report.is_success() {
        Ok(())
    } else {
        bail!(
            "{} of {} targets failed",
            report.failures(),
            report.outcomes.len()
        )
    }
}

/// One line per target, in argument order
fn render(report: &Report) {
    if report.outcomes.is_empty() {
        print_info(&format!("{}: nothing to do", report.command));
    }

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(summary) => print_success(&format!("{}: {summary}", outcome.target)),
            Err(e) => print_error(&format!("{} {}: {e}", report.command, outcome.target)),
        }
    }
}
