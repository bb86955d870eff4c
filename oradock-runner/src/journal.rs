//! Run journal
//!
//! The append-only log file under `logs/`, one line per event in the form
//! `<timestamp> - <message>`. Every entry is also emitted as a tracing event.
//!
//! The journal starts detached so validation can run before anything is
//! written. It attaches to the file once the file exists or may be created.

use anyhow::{Context, Result};
use oradock_core::domain::log::{LogEntry, LogLevel};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Append-only journal of a migration run
pub struct RunJournal {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl RunJournal {
    /// Journal for `path` that does not write until attached
    pub fn detached(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_attached(&self) -> bool {
        self.file.lock().map(|f| f.is_some()).unwrap_or(false)
    }

    /// Starts writing if the journal file is already there
    ///
    /// Used before validation: an earlier run's journal receives the failure,
    /// but no file is created.
    pub fn attach_if_exists(&self) -> Result<bool> {
        if !self.path.is_file() {
            return Ok(false);
        }
        self.attach()?;
        Ok(true)
    }

    /// Opens the journal for appending, creating it if needed
    pub fn attach(&self) -> Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to lock journal: {}", e))?;
        if guard.is_some() {
            return Ok(());
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open journal {}", self.path.display()))?;

        *guard = Some(file);
        debug!("Journal attached: {}", self.path.display());
        Ok(())
    }

    /// Records an entry
    ///
    /// A failed write is reported through tracing and never aborts the run.
    pub fn record(&self, entry: LogEntry) {
        match entry.level {
            LogLevel::Debug => debug!("{}", entry.message),
            LogLevel::Info => info!("{}", entry.message),
            LogLevel::Warning => warn!("{}", entry.message),
            LogLevel::Error => error!("{}", entry.message),
        }

        let Ok(mut guard) = self.file.lock() else {
            return;
        };
        if let Some(file) = guard.as_mut() {
            if let Err(e) = writeln!(file, "{}", entry.render()) {
                warn!("Failed to write journal {}: {}", self.path.display(), e);
            }
        }
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.record(LogEntry::new(LogLevel::Debug, message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.record(LogEntry::new(LogLevel::Info, message));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.record(LogEntry::new(LogLevel::Warning, message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.record(LogEntry::new(LogLevel::Error, message));
    }
}
