//! Prerequisite executables
//!
//! Looks up the external tools a command needs before anything runs.

use std::path::PathBuf;
use tracing::debug;

/// Finds executables by name
pub trait ToolLocator: Send + Sync {
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

/// Searches `PATH`
#[derive(Debug, Clone, Copy, Default)]
pub struct PathLocator;

impl ToolLocator for PathLocator {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        let found = which::which(program).ok();
        debug!("Locating {}: {:?}", program, found);
        found
    }
}

/// Programs from `required` that cannot be found, in order
pub fn missing_tools(locator: &dyn ToolLocator, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|program| locator.locate(program).is_none())
        .map(|program| program.to_string())
        .collect()
}
