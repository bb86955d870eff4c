//! Data pump export
//!
//! Success of an export is judged by the dump file it leaves behind, not by
//! the utility's exit status, so the exit status is only logged.

use anyhow::{Context, Result};
use async_trait::async_trait;
use oradock_core::domain::export::ExportRequest;
use tracing::{info, warn};

use crate::process::{CommandOutput, Invocation};

pub const EXPDP_PROGRAM: &str = "expdp";

#[async_trait]
pub trait DataPump: Send + Sync {
    async fn export(&self, request: &ExportRequest) -> Result<CommandOutput>;
}

/// The `expdp` command-line utility
pub struct ExpdpDataPump {
    program: String,
}

impl ExpdpDataPump {
    pub fn new() -> Self {
        Self {
            program: EXPDP_PROGRAM.to_string(),
        }
    }

    fn invocation(&self, request: &ExportRequest) -> Invocation {
        Invocation::new(&self.program)
            .secret_arg(request.userid())
            .args(request.parameters())
    }
}

impl Default for ExpdpDataPump {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataPump for ExpdpDataPump {
    async fn export(&self, request: &ExportRequest) -> Result<CommandOutput> {
        let invocation = self.invocation(request);
        info!("Running export: {}", invocation.display());

        let output = invocation
            .output()
            .await
            .context("Failed to run the export utility")?;

        if !output.success() {
            warn!(
                "Export utility exited with code {}: {}",
                output.exit_code,
                output.stderr.trim()
            );
        }

        Ok(output)
    }
}
