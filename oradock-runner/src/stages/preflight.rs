//! Configuration and environment validation
//!
//! Rejects the run before any external side effect. Failures are journaled
//! only when a journal file from an earlier run already exists; no file is
//! created here.

use anyhow::{Context, Result};
use oradock_core::domain::manifest::RunManifest;
use oradock_core::error::ConfigError;

use crate::context::RunContext;
use crate::oracle::{EXPDP_PROGRAM, SQLPLUS_PROGRAM};
use crate::tools::missing_tools;

/// What a command needs checked before it starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checks {
    /// Full configuration, container engine and source-side tools
    Migration,
    /// Full configuration only; nothing external is invoked
    Artifacts,
    /// Output directory and container engine
    Engine,
}

/// Result of a successful preflight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preflight {
    Ready,
    /// The schema list was empty; the run ends without exporting
    NothingToExport,
}

/// Validates configuration and prerequisites
pub async fn verify(ctx: &RunContext, checks: Checks) -> Result<Preflight> {
    if ctx.layout.root().is_dir() {
        // an unwritable journal must not hide the validation result
        if let Err(e) = ctx.journal.attach_if_exists() {
            tracing::warn!("Journal unavailable: {:#}", e);
        }
    }

    let validation = match checks {
        Checks::Migration | Checks::Artifacts => ctx.config.validate(),
        Checks::Engine => ctx.config.validate_output_dir(),
    };

    if let Err(e) = validation {
        if !e.is_fatal() {
            ctx.journal
                .warning(format!("{}; nothing to export, stopping", e));
            return Ok(Preflight::NothingToExport);
        }
        ctx.journal.error(format!("Validation failed: {}", e));
        return Err(anyhow::Error::new(e));
    }

    let engine = ctx.config.engine.program();
    let required = match checks {
        Checks::Migration => vec![engine, SQLPLUS_PROGRAM, EXPDP_PROGRAM],
        Checks::Artifacts => Vec::new(),
        Checks::Engine => vec![engine],
    };

    let missing = missing_tools(ctx.tools.as_ref(), &required);
    if !missing.is_empty() {
        let message = format!("Required executable(s) not found: {}", missing.join(", "));
        ctx.journal.error(&message);
        anyhow::bail!(message);
    }

    if matches!(checks, Checks::Migration | Checks::Engine) {
        let version = ctx.engine.version().await.inspect_err(|e| {
            ctx.journal
                .error(format!("Container engine is not usable: {:#}", e));
        })?;
        ctx.journal.info(format!("Container engine: {}", version));
    }

    Ok(Preflight::Ready)
}

/// Creates the workspace directories, opens the journal and records the manifest
///
/// Only called after [`verify`] succeeded.
pub fn prepare_workspace(ctx: &RunContext) -> Result<RunManifest> {
    ctx.layout
        .ensure_dirs()
        .context("Failed to create workspace directories")?;
    ctx.journal.attach()?;

    let manifest = RunManifest::new(&ctx.config);
    let json = manifest
        .to_json()
        .context("Failed to serialize run manifest")?;
    std::fs::write(ctx.layout.manifest_file(), json)
        .context("Failed to write run manifest")?;

    ctx.journal.info(format!(
        "Run {} started: schemas={}, port={}, output={}",
        manifest.run_id,
        ctx.config.schemas.joined(),
        ctx.config.port,
        ctx.layout.root().display()
    ));

    Ok(manifest)
}

/// Whether an error came from configuration validation
pub fn is_config_error(error: &anyhow::Error) -> bool {
    error.downcast_ref::<ConfigError>().is_some()
}
