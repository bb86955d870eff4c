//! Init command handler
//!
//! Validates the configuration and writes the build file and scripts into
//! the workspace without touching the database or container engine. Files
//! that already exist are kept.

use anyhow::{Context, Result};
use colored::*;
use oradock_core::config::RunConfig;
use oradock_runner::RunContext;
use oradock_runner::stages::artifacts::{ArtifactStatus, generate};
use oradock_runner::stages::preflight::{Checks, Preflight, verify};
use std::process::ExitCode;

/// Generates the workspace artifacts
pub async fn handle_init(config: RunConfig) -> Result<ExitCode> {
    let ctx = RunContext::new(config);

    if verify(&ctx, Checks::Artifacts).await? == Preflight::NothingToExport {
        println!("{}", "⚠ No schemas given, nothing to generate.".yellow());
        return Ok(ExitCode::SUCCESS);
    }

    ctx.layout
        .ensure_dirs()
        .context("Failed to create workspace directories")?;
    ctx.journal.attach()?;

    let artifacts = generate(&ctx.config, &ctx.layout, &ctx.journal)?;

    println!("{}", "✓ Workspace prepared".green().bold());
    for artifact in &artifacts {
        let status = match artifact.status {
            ArtifactStatus::Created => "created".green(),
            ArtifactStatus::Kept => "kept".dimmed(),
        };
        println!(
            "  {} {:<8} {}",
            "▸".cyan(),
            status,
            artifact.path.display()
        );
    }
    println!();
    println!("{}", "Next steps:".bold());
    println!("  1. Review or edit the generated files");
    println!("  2. Use {} to migrate", "oradock run".cyan());

    Ok(ExitCode::SUCCESS)
}
