//! Run configuration
//!
//! Defines every parameter of a migration run: the operator-supplied inputs
//! (output directory, port, schemas, locale, source credentials) and the
//! tunables that have sensible defaults (engine, image names, accounts,
//! polling).
//!
//! The configuration is immutable for the duration of a run.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Lowest accepted host port
pub const MIN_PORT: u16 = 1000;

/// Highest accepted host port
pub const MAX_PORT: u16 = 9999;

/// Default interval between container log polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default base image; runs `/docker-entrypoint-initdb.d` scripts on first start
pub const DEFAULT_BASE_IMAGE: &str = "wnameless/oracle-xe-11g-r2";

pub const DEFAULT_IMAGE_TAG: &str = "oradock/oracle-import:latest";
pub const DEFAULT_CONTAINER_NAME: &str = "oradock-oracle";
pub const DEFAULT_NAMESPACE: &str = "oradock";
pub const DEFAULT_LOCALE: &str = "AMERICAN_AMERICA.AL32UTF8";

pub const DEFAULT_EXPORT_USER: &str = "ORADOCK_EXP";
pub const DEFAULT_IMPORT_USER: &str = "ORADOCK_IMP";

/// Database account credentials
///
/// The password is never serialized and is redacted from `Debug` output.
#[derive(Clone, Default, Serialize)]
pub struct Credentials {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Whether the account authenticates through the operating system
    /// (`CONNECT / AS SYSDBA`) instead of a password
    pub fn uses_os_auth(&self) -> bool {
        self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

/// Which container engine executable to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Docker,
    Podman,
}

impl EngineKind {
    /// Executable name looked up on `PATH`
    pub fn program(&self) -> &'static str {
        match self {
            EngineKind::Docker => "docker",
            EngineKind::Podman => "podman",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Which containers and images the reset stage removes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetScope {
    /// Only resources labelled with the run namespace
    Namespace,
    /// Every container and image on the host
    Host,
}

/// Schema names to export, normalized
///
/// Parsed from a single comma-joined parameter. Entries are trimmed and
/// upper-cased; blank entries are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaList(Vec<String>);

impl SchemaList {
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_uppercase)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Comma-joined form passed to the export and import utilities
    pub fn joined(&self) -> String {
        self.0.join(",")
    }
}

/// Migration run configuration
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    /// Operator-provisioned workspace root
    pub output_dir: PathBuf,

    /// Host port mapped to the database listener inside the container
    pub port: u32,

    pub schemas: SchemaList,

    /// Passed to the container as `NLS_LANG`
    pub locale: String,

    /// Privileged (SYSDBA) identity on the source database
    pub source: Credentials,

    /// Account created on the source database to run the export
    pub export_account: Credentials,

    /// Account created inside the container to run the import
    pub import_account: Credentials,

    /// Optional `VERSION=` for the export, for targets older than the source
    pub export_version: Option<String>,

    pub engine: EngineKind,
    pub base_image: String,
    pub image_tag: String,
    pub container_name: String,

    /// Label value scoping every image and container this tool creates
    pub namespace: String,

    pub reset_scope: ResetScope,

    #[serde(with = "duration_secs")]
    pub poll_interval: Duration,

    /// Give up waiting for the import after this long; `None` waits indefinitely
    #[serde(with = "opt_duration_secs")]
    pub import_timeout: Option<Duration>,
}

impl RunConfig {
    /// Creates a configuration from the operator inputs, with defaults for the rest
    pub fn new(
        output_dir: impl Into<PathBuf>,
        port: u32,
        schemas: &str,
        locale: impl Into<String>,
        source: Credentials,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            port,
            schemas: SchemaList::parse(schemas),
            locale: locale.into(),
            source,
            export_account: Credentials::new(DEFAULT_EXPORT_USER, DEFAULT_EXPORT_USER.to_lowercase()),
            import_account: Credentials::new(DEFAULT_IMPORT_USER, DEFAULT_IMPORT_USER.to_lowercase()),
            export_version: None,
            engine: EngineKind::Docker,
            base_image: DEFAULT_BASE_IMAGE.to_string(),
            image_tag: DEFAULT_IMAGE_TAG.to_string(),
            container_name: DEFAULT_CONTAINER_NAME.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            reset_scope: ResetScope::Namespace,
            poll_interval: DEFAULT_POLL_INTERVAL,
            import_timeout: None,
        }
    }

    /// Host port, checked against the allowed range
    pub fn host_port(&self) -> Result<u16, ConfigError> {
        u16::try_from(self.port)
            .ok()
            .filter(|port| (MIN_PORT..=MAX_PORT).contains(port))
            .ok_or(ConfigError::PortOutOfRange {
                port: self.port,
                min: MIN_PORT,
                max: MAX_PORT,
            })
    }

    /// Checks only that the output directory exists
    ///
    /// Enough for commands that neither export nor build.
    pub fn validate_output_dir(&self) -> Result<(), ConfigError> {
        if !self.output_dir.is_dir() {
            return Err(ConfigError::OutputDirMissing(self.output_dir.clone()));
        }
        Ok(())
    }

    /// Validates the configuration
    ///
    /// Checks run in a fixed order: output directory, port, schemas, then the
    /// remaining settings. Only reads the filesystem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_output_dir()?;

        self.host_port()?;

        if self.schemas.is_empty() {
            return Err(ConfigError::EmptySchemas);
        }

        for schema in self.schemas.names() {
            check_identifier("schema name", schema)?;
        }

        check_identifier("export user", &self.export_account.username)?;
        check_identifier("import user", &self.import_account.username)?;
        check_password("export user", &self.export_account.password)?;
        check_password("import user", &self.import_account.password)?;
        check_password("source user", &self.source.password)?;

        if self.export_account.password.is_empty() {
            return Err(ConfigError::Empty("export user password"));
        }
        if self.import_account.password.is_empty() {
            return Err(ConfigError::Empty("import user password"));
        }

        if self.locale.trim().is_empty() {
            return Err(ConfigError::Empty("locale"));
        }
        if self.base_image.trim().is_empty() {
            return Err(ConfigError::Empty("base image"));
        }
        if self.image_tag.trim().is_empty() {
            return Err(ConfigError::Empty("image tag"));
        }
        if self.container_name.trim().is_empty() {
            return Err(ConfigError::Empty("container name"));
        }
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::Empty("namespace"));
        }
        if !self
            .namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(ConfigError::InvalidNamespace(self.namespace.clone()));
        }

        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("poll interval"));
        }
        if self.import_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroDuration("import timeout"));
        }

        Ok(())
    }
}

/// Oracle unquoted identifier: letter first, then letters, digits, `_`, `$`, `#`
fn check_identifier(what: &'static str, value: &str) -> Result<(), ConfigError> {
    let mut chars = value.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '#'));

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            what,
            value: value.to_string(),
        })
    }
}

/// Passwords end up inside `"..."` in SQL and inside `'...'` in the import script
fn check_password(what: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.contains(['"', '\'', '\n', '\r']) {
        return Err(ConfigError::InvalidPassword(what));
    }
    Ok(())
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }
}

mod opt_duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }
}
