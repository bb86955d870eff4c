//! Reset command handler

use anyhow::Result;
use colored::*;
use oradock_core::config::{ResetScope, RunConfig};
use oradock_runner::RunContext;
use oradock_runner::stages::preflight::{Checks, verify};
use oradock_runner::stages::reset::reset_environment;
use std::process::ExitCode;

/// Clears the dump directory and removes containers and images
pub async fn handle_reset(config: RunConfig) -> Result<ExitCode> {
    let ctx = RunContext::new(config);
    verify(&ctx, Checks::Engine).await?;

    ctx.layout.ensure_dirs()?;
    ctx.journal.attach()?;

    if ctx.config.reset_scope == ResetScope::Host {
        println!(
            "{}",
            "⚠ Host scope: removing every container and image on this host".yellow()
        );
    }

    let summary = reset_environment(&ctx).await?;

    println!("{}", "✓ Environment reset".green().bold());
    println!("  Dump entries removed: {}", summary.dump_entries_removed);
    println!("  Containers stopped:   {}", summary.containers_stopped);
    println!("  Containers removed:   {}", summary.containers_removed);
    println!("  Images removed:       {}", summary.images_removed);

    Ok(ExitCode::SUCCESS)
}
