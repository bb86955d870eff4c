//! Artifact generation
//!
//! Writes the build specification, init script and import script into the
//! workspace when they are absent. Existing files are never overwritten, so
//! operator edits survive later runs.

use anyhow::{Context, Result};
use oradock_core::config::RunConfig;
use oradock_core::layout::WorkspaceLayout;
use oradock_core::template::{ArtifactKind, render_all};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use crate::journal::RunJournal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStatus {
    Created,
    /// Already present; left untouched
    Kept,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub status: ArtifactStatus,
}

/// Materializes every missing artifact
pub fn generate(
    config: &RunConfig,
    layout: &WorkspaceLayout,
    journal: &RunJournal,
) -> Result<Vec<GeneratedArtifact>> {
    let mut generated = Vec::new();

    for template in render_all(config) {
        let path = layout.artifact(template.kind);

        // create_new keeps the check and the write atomic
        let status = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(&template.to_bytes())
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                journal.info(format!(
                    "Created {}: {}",
                    template.kind.description(),
                    path.display()
                ));
                ArtifactStatus::Created
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                journal.info(format!(
                    "Keeping existing {}: {}",
                    template.kind.description(),
                    path.display()
                ));
                ArtifactStatus::Kept
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create {}", path.display()));
            }
        };

        generated.push(GeneratedArtifact {
            kind: template.kind,
            path,
            status,
        });
    }

    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::config;

    fn journal(layout: &WorkspaceLayout) -> RunJournal {
        RunJournal::detached(layout.journal_file())
    }

    #[test]
    fn test_generates_all_three() {
        let dir = tempfile::tempdir().unwrap();
        let layout = WorkspaceLayout::new(dir.path());

        let generated = generate(&config(dir.path()), &layout, &journal(&layout)).unwrap();

        assert_eq!(generated.len(), 3);
        assert!(generated.iter().all(|a| a.status == ArtifactStatus::Created));
        for kind in ArtifactKind::ALL {
            assert!(layout.artifact(kind).is_file());
        }

        let script = std::fs::read(layout.artifact(ArtifactKind::ImportScript)).unwrap();
        assert!(script.starts_with(b"#!/bin/bash\n"));
    }

    #[test]
    fn test_second_run_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let layout = WorkspaceLayout::new(dir.path());
        let mut cfg = config(dir.path());

        generate(&cfg, &layout, &journal(&layout)).unwrap();
        let first: Vec<Vec<u8>> = ArtifactKind::ALL
            .iter()
            .map(|k| std::fs::read(layout.artifact(*k)).unwrap())
            .collect();

        // different inputs must not leak into existing files
        cfg.base_image = "other/image:1".to_string();
        cfg.schemas = oradock_core::config::SchemaList::parse("scott");
        let generated = generate(&cfg, &layout, &journal(&layout)).unwrap();

        assert!(generated.iter().all(|a| a.status == ArtifactStatus::Kept));
        let second: Vec<Vec<u8>> = ArtifactKind::ALL
            .iter()
            .map(|k| std::fs::read(layout.artifact(*k)).unwrap())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_operator_edits_survive() {
        let dir = tempfile::tempdir().unwrap();
        let layout = WorkspaceLayout::new(dir.path());
        let custom = "FROM my-registry/oracle:custom\n";
        std::fs::write(layout.artifact(ArtifactKind::BuildSpec), custom).unwrap();

        let generated = generate(&config(dir.path()), &layout, &journal(&layout)).unwrap();

        assert_eq!(generated[0].kind, ArtifactKind::BuildSpec);
        assert_eq!(generated[0].status, ArtifactStatus::Kept);
        assert_eq!(generated[1].status, ArtifactStatus::Created);
        assert_eq!(
            std::fs::read_to_string(layout.artifact(ArtifactKind::BuildSpec)).unwrap(),
            custom
        );
    }
}
