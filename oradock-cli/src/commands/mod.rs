//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod args;
mod init;
mod reset;
mod run;
mod wait;

use anyhow::Result;
use clap::Subcommand;
use oradock_runner::CancelSignal;
use std::process::ExitCode;
use tokio::sync::watch;
use tracing::warn;

use args::{MigrationArgs, PollArgs, ResetScopeArg, WorkspaceArgs};

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the full migration: validate, generate, reset, export, provision
    Run {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        #[command(flatten)]
        migration: MigrationArgs,
        #[command(flatten)]
        poll: PollArgs,
        /// Which containers and images the reset removes
        #[arg(long, env = "ORADOCK_RESET_SCOPE", value_enum, default_value = "namespace")]
        reset_scope: ResetScopeArg,
    },
    /// Validate and generate the build file and scripts only
    Init {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        #[command(flatten)]
        migration: MigrationArgs,
    },
    /// Clear the dump directory and remove containers and images
    Reset {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        #[arg(long, env = "ORADOCK_RESET_SCOPE", value_enum, default_value = "namespace")]
        reset_scope: ResetScopeArg,
    },
    /// Wait for the import in an already running container
    Wait {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        #[command(flatten)]
        poll: PollArgs,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Run {
            workspace,
            migration,
            poll,
            reset_scope,
        } => {
            let mut config = migration.to_config(&workspace);
            poll.apply(&mut config);
            config.reset_scope = reset_scope.into();
            run::handle_run(config).await
        }
        Commands::Init {
            workspace,
            migration,
        } => init::handle_init(migration.to_config(&workspace)).await,
        Commands::Reset {
            workspace,
            reset_scope,
        } => {
            let mut config = workspace.engine_config();
            config.reset_scope = reset_scope.into();
            reset::handle_reset(config).await
        }
        Commands::Wait { workspace, poll } => {
            let mut config = workspace.engine_config();
            poll.apply(&mut config);
            wait::handle_wait(config).await
        }
    }
}

/// Cancellation signal fired by Ctrl-C
fn cancel_on_ctrl_c() -> CancelSignal {
    let (sender, receiver) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping");
            let _ = sender.send(true);
        }
    });
    CancelSignal::new(receiver)
}
