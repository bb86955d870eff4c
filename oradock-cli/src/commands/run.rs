//! Run command handler

use anyhow::Result;
use colored::*;
use oradock_core::config::RunConfig;
use oradock_core::domain::import::ImportState;
use oradock_runner::{ImportOutcome, RunContext, RunOutcome};
use std::process::ExitCode;

use super::cancel_on_ctrl_c;

/// Runs the full migration
pub async fn handle_run(config: RunConfig) -> Result<ExitCode> {
    let ctx = RunContext::new(config);
    let mut cancel = cancel_on_ctrl_c();

    let outcome = oradock_runner::run(&ctx, &mut cancel).await?;

    let code = match &outcome {
        RunOutcome::NothingToExport => {
            println!("{}", "⚠ No schemas given, nothing to export.".yellow());
            ExitCode::SUCCESS
        }
        RunOutcome::Cancelled { before } => {
            println!(
                "{}",
                format!("✗ Run cancelled before the {} stage.", before).yellow()
            );
            ExitCode::from(130)
        }
        RunOutcome::Finished(import) => {
            print_import_outcome(import);
            exit_code(&import.state)
        }
    };

    println!(
        "  Journal:     {}",
        ctx.layout.journal_file().display().to_string().dimmed()
    );
    Ok(code)
}

/// Print how the import wait ended
pub fn print_import_outcome(outcome: &ImportOutcome) {
    let state = match &outcome.state {
        ImportState::Done => "✓ Import completed".green().bold(),
        ImportState::Failed(_) => "✗ Import failed".red().bold(),
        ImportState::TimedOut => "✗ Import timed out".red().bold(),
        ImportState::Cancelled => "✗ Wait cancelled".yellow().bold(),
        ImportState::Waiting => "… Import still running".normal(),
    };

    println!("{}", state);
    if let ImportState::Failed(reason) = &outcome.state {
        println!("  Reason:      {}", reason.red());
    }
    println!("  Polls:       {}", outcome.polls);
    println!("  Elapsed:     {}s", outcome.elapsed.as_secs());
}

/// Process exit code for a finished wait
pub fn exit_code(state: &ImportState) -> ExitCode {
    match state {
        ImportState::Done => ExitCode::SUCCESS,
        ImportState::Cancelled => ExitCode::from(130),
        ImportState::TimedOut => ExitCode::from(2),
        ImportState::Failed(_) | ImportState::Waiting => ExitCode::FAILURE,
    }
}
