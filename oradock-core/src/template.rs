//! Generated artifacts
//!
//! The three files the container build consumes: a build specification, an
//! SQL script run on first start, and a shell script running the import.
//!
//! Each artifact is kept as a list of lines plus an explicit encoding and
//! line ending. Bytes are only produced by [`ArtifactTemplate::to_bytes`], so
//! the on-disk form is fully determined by the template. The import script
//! is consumed by a shell that rejects a byte-order mark and carriage
//! returns, hence UTF-8 without BOM and LF endings throughout.

use crate::config::RunConfig;
use crate::domain::container::NAMESPACE_LABEL;
use crate::domain::import::{
    COMPLETION_MARKER, FAILURE_MARKER, IMPORT_DIRECTORY_OBJECT, IN_CONTAINER_EXPORT_PATH,
    INITDB_DIR,
};
use crate::layout::{DUMP_DIR, DUMP_FILE_NAME, IMPORT_LOG_NAME};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Which artifact a template produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    BuildSpec,
    InitScript,
    ImportScript,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::BuildSpec,
        ArtifactKind::InitScript,
        ArtifactKind::ImportScript,
    ];

    /// File name relative to the workspace root
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::BuildSpec => "Dockerfile",
            ArtifactKind::InitScript => "init.sql",
            ArtifactKind::ImportScript => "import.sh",
        }
    }

    /// Name given to the script in the image's first-start directory
    ///
    /// Scripts run in lexical order, so the init script sorts first.
    pub fn initdb_name(&self) -> Option<&'static str> {
        match self {
            ArtifactKind::BuildSpec => None,
            ArtifactKind::InitScript => Some("01_init.sql"),
            ArtifactKind::ImportScript => Some("02_import.sh"),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ArtifactKind::BuildSpec => "build specification",
            ArtifactKind::InitScript => "initialization script",
            ArtifactKind::ImportScript => "import script",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf8WithBom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// A rendered artifact, not yet written
#[derive(Debug, Clone)]
pub struct ArtifactTemplate {
    pub kind: ArtifactKind,
    pub lines: Vec<String>,
    pub encoding: TextEncoding,
    pub line_ending: LineEnding,
}

impl ArtifactTemplate {
    fn new(kind: ArtifactKind, lines: Vec<String>) -> Self {
        Self {
            kind,
            lines,
            encoding: TextEncoding::Utf8,
            line_ending: LineEnding::Lf,
        }
    }

    /// File contents; every line, including the last, is terminated
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        if self.encoding == TextEncoding::Utf8WithBom {
            bytes.extend_from_slice(UTF8_BOM);
        }
        let eol = self.line_ending.as_str();
        for line in &self.lines {
            // stray carriage returns would survive into the shell script otherwise
            bytes.extend_from_slice(line.trim_end_matches(['\r', '\n']).as_bytes());
            bytes.extend_from_slice(eol.as_bytes());
        }
        bytes
    }
}

/// Renders all three artifacts for a run
pub fn render_all(config: &RunConfig) -> Vec<ArtifactTemplate> {
    ArtifactKind::ALL
        .iter()
        .map(|kind| render(*kind, config))
        .collect()
}

pub fn render(kind: ArtifactKind, config: &RunConfig) -> ArtifactTemplate {
    match kind {
        ArtifactKind::BuildSpec => build_spec(config),
        ArtifactKind::InitScript => init_script(config),
        ArtifactKind::ImportScript => import_script(config),
    }
}

fn build_spec(config: &RunConfig) -> ArtifactTemplate {
    let init = ArtifactKind::InitScript;
    let import = ArtifactKind::ImportScript;
    let init_target = format!("{}/{}", INITDB_DIR, init.initdb_name().unwrap_or(init.file_name()));
    let import_target = format!(
        "{}/{}",
        INITDB_DIR,
        import.initdb_name().unwrap_or(import.file_name())
    );

    ArtifactTemplate::new(
        ArtifactKind::BuildSpec,
        vec![
            format!("FROM {}", config.base_image),
            format!("LABEL {}=\"{}\"", NAMESPACE_LABEL, config.namespace),
            String::new(),
            format!("COPY {}/ {}/", DUMP_DIR, IN_CONTAINER_EXPORT_PATH),
            format!("COPY {} {}", init.file_name(), init_target),
            format!("COPY {} {}", import.file_name(), import_target),
            format!("RUN chmod +x {}", import_target),
        ],
    )
}

fn init_script(config: &RunConfig) -> ArtifactTemplate {
    let user = &config.import_account.username;
    ArtifactTemplate::new(
        ArtifactKind::InitScript,
        vec![
            format!(
                "CREATE USER {} IDENTIFIED BY \"{}\";",
                user, config.import_account.password
            ),
            format!("GRANT CREATE SESSION, UNLIMITED TABLESPACE TO {};", user),
            format!("GRANT IMP_FULL_DATABASE TO {};", user),
            format!(
                "CREATE OR REPLACE DIRECTORY {} AS '{}';",
                IMPORT_DIRECTORY_OBJECT, IN_CONTAINER_EXPORT_PATH
            ),
            format!(
                "GRANT READ, WRITE ON DIRECTORY {} TO {};",
                IMPORT_DIRECTORY_OBJECT, user
            ),
            "EXIT;".to_string(),
        ],
    )
}

/// The connect string is single-quoted so the shell passes the password
/// through untouched, double quotes included
fn import_script(config: &RunConfig) -> ArtifactTemplate {
    ArtifactTemplate::new(
        ArtifactKind::ImportScript,
        vec![
            "#!/bin/bash".to_string(),
            format!("chmod -R 777 {}", IN_CONTAINER_EXPORT_PATH),
            format!(
                "\"$ORACLE_HOME/bin/impdp\" '{}/\"{}\"' DIRECTORY={} DUMPFILE={} LOGFILE={} SCHEMAS={}",
                config.import_account.username,
                config.import_account.password,
                IMPORT_DIRECTORY_OBJECT,
                DUMP_FILE_NAME,
                IMPORT_LOG_NAME,
                config.schemas.joined()
            ),
            "rc=$?".to_string(),
            // impdp exits 5 when it finished with warnings
            "if [ \"$rc\" -eq 0 ] || [ \"$rc\" -eq 5 ]; then".to_string(),
            format!("  echo \"{} (impdp exit $rc)\"", COMPLETION_MARKER),
            "else".to_string(),
            format!("  echo \"{} (impdp exit $rc)\"", FAILURE_MARKER),
            "fi".to_string(),
        ],
    )
}
