//! Run context
//!
//! Everything a stage needs while the migration runs:
//! - The immutable run configuration and the workspace layout
//! - The run journal
//! - The external tools: container engine, database client, export utility
//! - The executable locator used by the preflight checks

use oradock_core::config::RunConfig;
use oradock_core::layout::WorkspaceLayout;
use std::sync::Arc;

use crate::engine::{CliContainerEngine, ContainerEngine};
use crate::journal::RunJournal;
use crate::oracle::{DataPump, ExpdpDataPump, SqlClient, SqlPlusClient};
use crate::tools::{PathLocator, ToolLocator};

/// Shared state of one migration run
pub struct RunContext {
    pub config: RunConfig,
    pub layout: WorkspaceLayout,
    pub journal: RunJournal,
    pub engine: Arc<dyn ContainerEngine>,
    pub sql: Arc<dyn SqlClient>,
    pub pump: Arc<dyn DataPump>,
    pub tools: Arc<dyn ToolLocator>,
}

impl RunContext {
    /// Context driving the real executables
    pub fn new(config: RunConfig) -> Self {
        let engine = Arc::new(CliContainerEngine::new(config.engine));
        let sql = Arc::new(SqlPlusClient::new(config.source.clone()));
        Self::with_tools(
            config,
            engine,
            sql,
            Arc::new(ExpdpDataPump::new()),
            Arc::new(PathLocator),
        )
    }

    /// Context with explicit tool implementations
    ///
    /// A relative output directory is resolved against the current directory
    /// here, since the database server resolves directory objects on its own.
    pub fn with_tools(
        mut config: RunConfig,
        engine: Arc<dyn ContainerEngine>,
        sql: Arc<dyn SqlClient>,
        pump: Arc<dyn DataPump>,
        tools: Arc<dyn ToolLocator>,
    ) -> Self {
        if let Ok(absolute) = std::path::absolute(&config.output_dir) {
            config.output_dir = absolute;
        }
        let layout = WorkspaceLayout::new(&config.output_dir);
        let journal = RunJournal::detached(layout.journal_file());
        Self {
            config,
            layout,
            journal,
            engine,
            sql,
            pump,
            tools,
        }
    }
}
