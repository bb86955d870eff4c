//! Workspace layout
//!
//! Every file the tool reads or writes lives at a fixed path under the
//! operator-provisioned output directory:
//!
//! ```text
//! <output_dir>/
//!   Dockerfile          build specification
//!   init.sql            first-start SQL (import user, directory object)
//!   import.sh           first-start import script
//!   logs/oradock.log    append-only run journal
//!   logs/last-run.json  manifest of the latest run
//!   dump/EXPORT.DMP     exported schema data
//!   dump/export.log     export utility log
//! ```

use std::io;
use std::path::{Path, PathBuf};

use crate::template::ArtifactKind;

pub const LOGS_DIR: &str = "logs";
pub const DUMP_DIR: &str = "dump";
pub const JOURNAL_FILE_NAME: &str = "oradock.log";
pub const MANIFEST_FILE_NAME: &str = "last-run.json";

/// Fixed name of the dump file, shared by export and import
pub const DUMP_FILE_NAME: &str = "EXPORT.DMP";
pub const EXPORT_LOG_NAME: &str = "export.log";
pub const IMPORT_LOG_NAME: &str = "import.log";

/// Paths of the workspace tree under one output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    root: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    pub fn journal_file(&self) -> PathBuf {
        self.logs_dir().join(JOURNAL_FILE_NAME)
    }

    pub fn manifest_file(&self) -> PathBuf {
        self.logs_dir().join(MANIFEST_FILE_NAME)
    }

    pub fn dump_dir(&self) -> PathBuf {
        self.root.join(DUMP_DIR)
    }

    pub fn dump_file(&self) -> PathBuf {
        self.dump_dir().join(DUMP_FILE_NAME)
    }

    /// Where a generated artifact lives
    pub fn artifact(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.file_name())
    }

    /// Creates the logs and dump subdirectories if they are missing
    pub fn ensure_dirs(&self) -> io::Result<()> {
        std::fs::create_dir_all(self.logs_dir())?;
        std::fs::create_dir_all(self.dump_dir())?;
        Ok(())
    }
}

/// Renders a host path the way the database expects it in a directory object
///
/// Backslash separators are translated to forward slashes.
pub fn to_db_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_paths() {
        let layout = WorkspaceLayout::new("/srv/migrate");
        assert_eq!(layout.journal_file(), Path::new("/srv/migrate/logs/oradock.log"));
        assert_eq!(layout.dump_file(), Path::new("/srv/migrate/dump/EXPORT.DMP"));
        assert_eq!(
            layout.artifact(ArtifactKind::BuildSpec),
            Path::new("/srv/migrate/Dockerfile")
        );
        assert_eq!(
            layout.artifact(ArtifactKind::InitScript),
            Path::new("/srv/migrate/init.sql")
        );
        assert_eq!(
            layout.artifact(ArtifactKind::ImportScript),
            Path::new("/srv/migrate/import.sh")
        );
    }

    #[test]
    fn test_db_path_uses_forward_slashes() {
        assert_eq!(
            to_db_path(Path::new(r"C:\oracle\migrate\dump")),
            "C:/oracle/migrate/dump"
        );
        assert_eq!(to_db_path(Path::new("/srv/migrate/dump")), "/srv/migrate/dump");
    }

    #[test]
    fn test_ensure_dirs() {
        let tmp = tempfile::tempdir().unwrap();

        let layout = WorkspaceLayout::new(tmp.path());
        layout.ensure_dirs().unwrap();
        assert!(layout.logs_dir().is_dir());
        assert!(layout.dump_dir().is_dir());

        // second call is a no-op
        layout.ensure_dirs().unwrap();
    }
}
