//! Journal domain types

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Timestamp format of journal lines
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One event recorded in the run journal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message: message.into(),
        }
    }

    /// Journal line: `<timestamp> - <message>`, without the trailing newline
    ///
    /// Multi-line messages are folded onto one line so the journal keeps one
    /// line per event.
    pub fn render(&self) -> String {
        let message = self
            .message
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join(" | ");
        format!("{} - {}", self.timestamp.format(TIMESTAMP_FORMAT), message)
    }
}
