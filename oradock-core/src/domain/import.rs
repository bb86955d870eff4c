//! Import domain types
//!
//! The import runs inside the container on first start. Its progress is only
//! observable through the container log, where the generated import script
//! prints one of two markers when the import utility returns.

use std::fmt;

/// Path inside the container that receives the host dump directory
pub const IN_CONTAINER_EXPORT_PATH: &str = "/opt/oracle/export";

/// Scripts in this directory run once, when the database is first created
pub const INITDB_DIR: &str = "/docker-entrypoint-initdb.d";

/// Directory object created in the container database
pub const IMPORT_DIRECTORY_OBJECT: &str = "ORADOCK_IMPORT_DIR";

/// Printed by the import script when the import utility succeeded
pub const COMPLETION_MARKER: &str = "ORADOCK: import completed";

/// Printed by the import script when the import utility failed
pub const FAILURE_MARKER: &str = "ORADOCK: import failed";

/// State of the in-container import as seen from the host
///
/// `Waiting` is the only non-terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportState {
    Waiting,
    Done,
    Failed(String),
    TimedOut,
    Cancelled,
}

impl ImportState {
    /// Classifies a combined log snapshot
    ///
    /// The markers are matched as plain substrings anywhere in the log. The
    /// completion marker wins when both appear.
    pub fn observe(logs: &str) -> Self {
        if logs.contains(COMPLETION_MARKER) {
            return ImportState::Done;
        }

        match logs.lines().find(|line| line.contains(FAILURE_MARKER)) {
            Some(line) => ImportState::Failed(line.trim().to_string()),
            None => ImportState::Waiting,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ImportState::Waiting)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ImportState::Done)
    }
}

impl fmt::Display for ImportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportState::Waiting => f.write_str("waiting"),
            ImportState::Done => f.write_str("done"),
            ImportState::Failed(reason) => write!(f, "failed ({})", reason),
            ImportState::TimedOut => f.write_str("timed out"),
            ImportState::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Last `n` lines of a log, for journaling progress without the whole log
pub fn tail_lines(logs: &str, n: usize) -> String {
    let lines: Vec<&str> = logs.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
