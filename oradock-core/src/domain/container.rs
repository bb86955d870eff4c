//! Container domain types
//!
//! Describes the image build and the container launch as plain data, and
//! renders each into container-engine arguments. Works for both `docker` and
//! `podman`, which accept the same flags for these operations.

use std::path::PathBuf;

use crate::config::{ResetScope, RunConfig};
use crate::error::ConfigError;
use crate::template::ArtifactKind;

/// Label key carrying the run namespace on every image and container we create
pub const NAMESPACE_LABEL: &str = "oradock.namespace";

/// Database listener port inside the container
pub const ORACLE_LISTENER_PORT: u16 = 1521;

/// Which resources a list operation should return
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceFilter {
    /// Everything on the host
    All,
    /// Resources labelled `oradock.namespace=<value>`
    Namespace(String),
}

impl ResourceFilter {
    /// Filter matching the configured reset scope
    pub fn for_reset(scope: ResetScope, namespace: &str) -> Self {
        match scope {
            ResetScope::Namespace => ResourceFilter::Namespace(namespace.to_string()),
            ResetScope::Host => ResourceFilter::All,
        }
    }

    /// `--filter` arguments for `ps` / `images`
    pub fn to_args(&self) -> Vec<String> {
        match self {
            ResourceFilter::All => Vec::new(),
            ResourceFilter::Namespace(ns) => {
                vec!["--filter".to_string(), format!("label={}={}", NAMESPACE_LABEL, ns)]
            }
        }
    }
}

/// Image build request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuild {
    pub tag: String,
    pub build_file: PathBuf,
    /// Build context; the workspace root, so the dump and scripts are included
    pub context_dir: PathBuf,
    pub labels: Vec<(String, String)>,
}

impl ImageBuild {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            tag: config.image_tag.clone(),
            build_file: config.output_dir.join(ArtifactKind::BuildSpec.file_name()),
            context_dir: config.output_dir.clone(),
            labels: vec![(NAMESPACE_LABEL.to_string(), config.namespace.clone())],
        }
    }

    /// Arguments after the engine executable
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "build".to_string(),
            "-t".to_string(),
            self.tag.clone(),
            "-f".to_string(),
            self.build_file.to_string_lossy().to_string(),
        ];
        for (key, value) in &self.labels {
            args.push("--label".to_string());
            args.push(format!("{}={}", key, value));
        }
        args.push(self.context_dir.to_string_lossy().to_string());
        args
    }
}

/// Container launch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub host_port: u16,
    pub container_port: u16,
    pub env: Vec<(String, String)>,
    pub labels: Vec<(String, String)>,
}

impl ContainerSpec {
    /// Detached database container with remote access enabled and the
    /// configured locale
    pub fn from_config(config: &RunConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            name: config.container_name.clone(),
            image: config.image_tag.clone(),
            host_port: config.host_port()?,
            container_port: ORACLE_LISTENER_PORT,
            env: vec![
                ("ORACLE_ALLOW_REMOTE".to_string(), "true".to_string()),
                ("NLS_LANG".to_string(), config.locale.clone()),
            ],
            labels: vec![(NAMESPACE_LABEL.to_string(), config.namespace.clone())],
        })
    }

    /// Arguments after the engine executable
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            self.name.clone(),
            "-p".to_string(),
            format!("{}:{}", self.host_port, self.container_port),
        ];
        for (key, value) in &self.labels {
            args.push("--label".to_string());
            args.push(format!("{}={}", key, value));
        }
        for (key, value) in &self.env {
            args.push("-e".to_string());
            args.push(format!("{}={}", key, value));
        }
        args.push(self.image.clone());
        args
    }
}
