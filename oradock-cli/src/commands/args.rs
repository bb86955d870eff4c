//! Shared command-line arguments
//!
//! Every flag can also be supplied through an `ORADOCK_*` environment
//! variable; passwords are best passed that way.

use clap::{Args, ValueEnum};
use oradock_core::config::{
    Credentials, DEFAULT_BASE_IMAGE, DEFAULT_CONTAINER_NAME, DEFAULT_EXPORT_USER,
    DEFAULT_IMAGE_TAG, DEFAULT_IMPORT_USER, DEFAULT_LOCALE, DEFAULT_NAMESPACE, EngineKind,
    MIN_PORT, ResetScope, RunConfig,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineArg {
    Docker,
    Podman,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Docker => EngineKind::Docker,
            EngineArg::Podman => EngineKind::Podman,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResetScopeArg {
    /// Only containers and images labelled with the namespace
    Namespace,
    /// Every container and image on the host (destructive)
    Host,
}

impl From<ResetScopeArg> for ResetScope {
    fn from(arg: ResetScopeArg) -> Self {
        match arg {
            ResetScopeArg::Namespace => ResetScope::Namespace,
            ResetScopeArg::Host => ResetScope::Host,
        }
    }
}

/// Workspace and container engine selection
#[derive(Debug, Clone, Args)]
pub struct WorkspaceArgs {
    /// Workspace directory; must already exist
    #[arg(short, long, env = "ORADOCK_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Container engine executable
    #[arg(long, env = "ORADOCK_ENGINE", value_enum, default_value = "docker")]
    pub engine: EngineArg,

    /// Label value marking the containers and images this tool creates
    #[arg(long, env = "ORADOCK_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Database container name
    #[arg(long, env = "ORADOCK_CONTAINER_NAME", default_value = DEFAULT_CONTAINER_NAME)]
    pub container_name: String,

    /// Tag of the built database image
    #[arg(long, env = "ORADOCK_IMAGE_TAG", default_value = DEFAULT_IMAGE_TAG)]
    pub image_tag: String,
}

/// What to migrate and how the target is built
#[derive(Debug, Clone, Args)]
pub struct MigrationArgs {
    /// Host port mapped to the database listener (1000-9999)
    #[arg(short, long, env = "ORADOCK_PORT")]
    pub port: u32,

    /// Comma-separated schema names
    #[arg(short, long, env = "ORADOCK_SCHEMAS")]
    pub schemas: String,

    /// NLS_LANG value for the target database
    #[arg(long, env = "ORADOCK_LOCALE", default_value = DEFAULT_LOCALE)]
    pub locale: String,

    /// SYSDBA user on the source database
    #[arg(long, env = "ORADOCK_SOURCE_USER", default_value = "sys")]
    pub source_user: String,

    /// SYSDBA password; leave empty for operating-system authentication
    #[arg(long, env = "ORADOCK_SOURCE_PASSWORD", default_value = "", hide_env_values = true)]
    pub source_password: String,

    #[arg(long, env = "ORADOCK_EXPORT_USER", default_value = DEFAULT_EXPORT_USER)]
    pub export_user: String,

    /// Defaults to the lower-cased export user name
    #[arg(long, env = "ORADOCK_EXPORT_PASSWORD", hide_env_values = true)]
    pub export_password: Option<String>,

    #[arg(long, env = "ORADOCK_IMPORT_USER", default_value = DEFAULT_IMPORT_USER)]
    pub import_user: String,

    /// Defaults to the lower-cased import user name
    #[arg(long, env = "ORADOCK_IMPORT_PASSWORD", hide_env_values = true)]
    pub import_password: Option<String>,

    /// Export VERSION parameter, for targets older than the source
    #[arg(long, env = "ORADOCK_EXPORT_VERSION")]
    pub export_version: Option<String>,

    /// Image the generated build file starts from
    #[arg(long, env = "ORADOCK_BASE_IMAGE", default_value = DEFAULT_BASE_IMAGE)]
    pub base_image: String,
}

/// Completion polling
#[derive(Debug, Clone, Args)]
pub struct PollArgs {
    /// Seconds between container log checks
    #[arg(long, env = "ORADOCK_POLL_INTERVAL", default_value_t = 10)]
    pub poll_interval: u64,

    /// Give up waiting after this many seconds; waits forever when unset
    #[arg(long, env = "ORADOCK_IMPORT_TIMEOUT")]
    pub import_timeout: Option<u64>,
}

impl WorkspaceArgs {
    /// Configuration for commands that only touch the workspace and engine
    ///
    /// The port and schema list are placeholders; these commands only
    /// validate the output directory.
    pub fn engine_config(&self) -> RunConfig {
        let mut config = RunConfig::new(
            &self.output_dir,
            u32::from(MIN_PORT),
            "",
            DEFAULT_LOCALE,
            Credentials::default(),
        );
        self.apply(&mut config);
        config
    }

    fn apply(&self, config: &mut RunConfig) {
        config.engine = self.engine.into();
        config.namespace = self.namespace.clone();
        config.container_name = self.container_name.clone();
        config.image_tag = self.image_tag.clone();
    }
}

impl MigrationArgs {
    pub fn to_config(&self, workspace: &WorkspaceArgs) -> RunConfig {
        let mut config = RunConfig::new(
            &workspace.output_dir,
            self.port,
            &self.schemas,
            &self.locale,
            Credentials::new(&self.source_user, &self.source_password),
        );
        workspace.apply(&mut config);

        config.export_account = account(&self.export_user, self.export_password.as_deref());
        config.import_account = account(&self.import_user, self.import_password.as_deref());
        config.export_version = self.export_version.clone();
        config.base_image = self.base_image.clone();
        config
    }
}

impl PollArgs {
    pub fn apply(&self, config: &mut RunConfig) {
        config.poll_interval = Duration::from_secs(self.poll_interval);
        config.import_timeout = self.import_timeout.map(Duration::from_secs);
    }
}

fn account(username: &str, password: Option<&str>) -> Credentials {
    let username = username.to_uppercase();
    let password = password
        .map(str::to_string)
        .unwrap_or_else(|| username.to_lowercase());
    Credentials::new(username, password)
}
