//! Wait command handler
//!
//! Re-attaches to a container started by an earlier run, for example after
//! that run was interrupted while waiting.

use anyhow::Result;
use oradock_core::config::RunConfig;
use oradock_runner::RunContext;
use oradock_runner::stages::preflight::{Checks, verify};
use oradock_runner::stages::provision::await_import;
use std::process::ExitCode;

use super::cancel_on_ctrl_c;
use super::run::{exit_code, print_import_outcome};

pub async fn handle_wait(config: RunConfig) -> Result<ExitCode> {
    let ctx = RunContext::new(config);
    verify(&ctx, Checks::Engine).await?;

    ctx.layout.ensure_dirs()?;
    ctx.journal.attach()?;

    let mut cancel = cancel_on_ctrl_c();
    let outcome = await_import(&ctx, &mut cancel).await?;

    print_import_outcome(&outcome);
    Ok(exit_code(&outcome.state))
}
