//! Target-side provisioning
//!
//! Builds the database image from the workspace, starts the container and
//! waits for the in-container import to report its result.

use anyhow::{Context, Result};
use oradock_core::domain::container::{ContainerSpec, ImageBuild};

use crate::context::RunContext;
use crate::poller::{CancelSignal, CompletionPoller, ContainerLogs, ImportOutcome};

/// Builds the image and starts the container; returns the container id
pub async fn build_and_launch(ctx: &RunContext) -> Result<String> {
    let spec = ContainerSpec::from_config(&ctx.config)?;
    let build = ImageBuild::from_config(&ctx.config);
    ctx.journal.info(format!(
        "Building image {} from {}",
        build.tag,
        build.build_file.display()
    ));
    ctx.engine
        .build_image(&build)
        .await
        .inspect_err(|e| ctx.journal.error(format!("Image build failed: {:#}", e)))
        .context("Failed to build the database image")?;

    ctx.journal.info(format!(
        "Starting container {} on port {} (locale {})",
        spec.name, spec.host_port, ctx.config.locale
    ));
    let id = ctx
        .engine
        .run_container(&spec)
        .await
        .inspect_err(|e| ctx.journal.error(format!("Container start failed: {:#}", e)))
        .context("Failed to start the database container")?;

    ctx.journal.info(format!("Container {} started ({})", spec.name, id));
    Ok(id)
}

/// Waits for the import in the configured container
pub async fn await_import(ctx: &RunContext, cancel: &mut CancelSignal) -> Result<ImportOutcome> {
    let source = ContainerLogs::new(ctx.engine.as_ref(), ctx.config.container_name.clone());
    let poller = CompletionPoller::new(ctx.config.poll_interval, ctx.config.import_timeout);

    let outcome = poller.wait(&source, &ctx.journal, cancel).await?;

    let summary = format!(
        "Import {} after {} poll(s) in {:?}",
        outcome.state, outcome.polls, outcome.elapsed
    );
    if outcome.state.is_success() {
        ctx.journal.info(summary);
    } else {
        ctx.journal.error(summary);
    }

    Ok(outcome)
}

/// Build, launch and wait
pub async fn provision(ctx: &RunContext, cancel: &mut CancelSignal) -> Result<ImportOutcome> {
    build_and_launch(ctx).await?;
    await_import(ctx, cancel).await
}
