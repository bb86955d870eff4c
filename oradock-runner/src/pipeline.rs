//! Migration pipeline
//!
//! Runs a migration from start to finish:
//! - Validating configuration and prerequisites
//! - Preparing the workspace and journal
//! - Executing the stages one by one, stopping at the first failure

use anyhow::Result;
use std::fmt;
use tracing::{error, info};

use crate::context::RunContext;
use crate::poller::{CancelSignal, ImportOutcome};
use crate::stages::preflight::{Checks, Preflight, prepare_workspace, verify};
use crate::stages::{artifacts, export, provision, reset};

/// Pipeline stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Artifacts,
    Reset,
    Export,
    Provision,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Artifacts, Stage::Reset, Stage::Export, Stage::Provision];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Artifacts => "artifacts",
            Stage::Reset => "reset",
            Stage::Export => "export",
            Stage::Provision => "provision",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a run ended without an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The schema list was empty
    NothingToExport,
    /// Cancellation arrived before this stage started
    Cancelled { before: Stage },
    /// The container was started and the wait ended
    Finished(ImportOutcome),
}

/// Runs the whole migration
pub async fn run(ctx: &RunContext, cancel: &mut CancelSignal) -> Result<RunOutcome> {
    if verify(ctx, Checks::Migration).await? == Preflight::NothingToExport {
        return Ok(RunOutcome::NothingToExport);
    }
    prepare_workspace(ctx)?;

    let mut finished = None;
    for (idx, stage) in Stage::ALL.iter().copied().enumerate() {
        if cancel.is_cancelled() {
            ctx.journal
                .warning(format!("Run cancelled before stage: {}", stage));
            return Ok(RunOutcome::Cancelled { before: stage });
        }

        info!("Executing stage {}/{}: {}", idx + 1, Stage::ALL.len(), stage);
        ctx.journal.info(format!("Starting stage: {}", stage));

        match execute_stage(ctx, stage, cancel).await {
            Ok(outcome) => finished = outcome.or(finished),
            Err(e) => {
                error!("Stage '{}' failed: {:#}", stage, e);
                ctx.journal
                    .error(format!("Stage '{}' failed: {:#}", stage, e));
                return Err(e.context(format!("Stage '{}' failed", stage)));
            }
        }

        ctx.journal.info(format!("Stage '{}' completed", stage));
    }

    match finished {
        Some(outcome) => Ok(RunOutcome::Finished(outcome)),
        None => anyhow::bail!("Provisioning finished without an import outcome"),
    }
}

/// Executes a single stage
async fn execute_stage(
    ctx: &RunContext,
    stage: Stage,
    cancel: &mut CancelSignal,
) -> Result<Option<ImportOutcome>> {
    match stage {
        Stage::Artifacts => {
            artifacts::generate(&ctx.config, &ctx.layout, &ctx.journal)?;
        }
        Stage::Reset => {
            reset::reset_environment(ctx).await?;
        }
        Stage::Export => {
            export::ensure_export_account(ctx).await?;
            export::export_schemas(ctx).await?;
        }
        Stage::Provision => return provision::provision(ctx, cancel).await.map(Some),
    }
    Ok(None)
}
