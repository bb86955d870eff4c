//! Container engine management
//!
//! Drives the `docker` or `podman` executable for the target side:
//! - Checking engine availability
//! - Listing, stopping and removing containers and images
//! - Building the import image and launching the database container
//! - Reading the container's combined log output

use anyhow::{Context, Result};
use async_trait::async_trait;
use oradock_core::config::EngineKind;
use oradock_core::domain::container::{ContainerSpec, ImageBuild, ResourceFilter};
use tracing::{debug, info};

use crate::process::Invocation;

/// Operations the migration needs from a container engine
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Engine version string; fails when the engine is unusable
    async fn version(&self) -> Result<String>;

    /// Container ids matching the filter; running only unless `all`
    async fn list_containers(&self, filter: &ResourceFilter, all: bool) -> Result<Vec<String>>;

    async fn stop_containers(&self, ids: &[String]) -> Result<()>;

    async fn remove_containers(&self, ids: &[String]) -> Result<()>;

    /// Image ids matching the filter
    async fn list_images(&self, filter: &ResourceFilter) -> Result<Vec<String>>;

    /// Force-removes images
    async fn remove_images(&self, ids: &[String]) -> Result<()>;

    async fn build_image(&self, build: &ImageBuild) -> Result<()>;

    /// Starts a detached container and returns its id
    async fn run_container(&self, spec: &ContainerSpec) -> Result<String>;

    /// Combined stdout and stderr of a container
    async fn logs(&self, container: &str) -> Result<String>;

    /// Whether the container exists and is running
    async fn is_running(&self, container: &str) -> Result<bool>;

    /// Whether a container with this name exists, whatever its labels
    async fn container_exists(&self, name: &str) -> Result<bool>;

    /// Whether an image with this tag exists locally
    async fn image_exists(&self, tag: &str) -> Result<bool>;
}

/// Container engine backed by the `docker` or `podman` command line
#[derive(Debug, Clone)]
pub struct CliContainerEngine {
    kind: EngineKind,
}

impl CliContainerEngine {
    pub fn new(kind: EngineKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    fn invocation(&self) -> Invocation {
        Invocation::new(self.kind.program())
    }
}

/// One id per non-empty output line
fn parse_ids(stdout: &str) -> Vec<String> {
    let mut ids: Vec<String> = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    // `images -q` repeats an id once per tag
    ids.dedup();
    ids
}

#[async_trait]
impl ContainerEngine for CliContainerEngine {
    async fn version(&self) -> Result<String> {
        let output = self
            .invocation()
            .arg("--version")
            .output()
            .await
            .with_context(|| format!("Failed to execute '{} --version'. Is {} installed?", self.kind, self.kind))?;

        if !output.success() {
            anyhow::bail!("{} is not working correctly", self.kind);
        }

        let version = output.stdout.trim().to_string();
        info!("{} is available: {}", self.kind, version);
        Ok(version)
    }

    async fn list_containers(&self, filter: &ResourceFilter, all: bool) -> Result<Vec<String>> {
        let mut invocation = self.invocation().arg("ps").arg("-q");
        if all {
            invocation = invocation.arg("-a");
        }
        let output = invocation
            .args(filter.to_args())
            .output_checked()
            .await
            .context("Failed to list containers")?;

        Ok(parse_ids(&output.stdout))
    }

    async fn stop_containers(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.invocation()
            .arg("stop")
            .args(ids.iter().cloned())
            .output_checked()
            .await
            .context("Failed to stop containers")?;
        debug!("Stopped {} container(s)", ids.len());
        Ok(())
    }

    async fn remove_containers(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.invocation()
            .arg("rm")
            .arg("-f")
            .args(ids.iter().cloned())
            .output_checked()
            .await
            .context("Failed to remove containers")?;
        debug!("Removed {} container(s)", ids.len());
        Ok(())
    }

    async fn list_images(&self, filter: &ResourceFilter) -> Result<Vec<String>> {
        let output = self
            .invocation()
            .arg("images")
            .arg("-q")
            .args(filter.to_args())
            .output_checked()
            .await
            .context("Failed to list images")?;

        Ok(parse_ids(&output.stdout))
    }

    async fn remove_images(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.invocation()
            .arg("rmi")
            .arg("-f")
            .args(ids.iter().cloned())
            .output_checked()
            .await
            .context("Failed to remove images")?;
        debug!("Removed {} image(s)", ids.len());
        Ok(())
    }

    async fn build_image(&self, build: &ImageBuild) -> Result<()> {
        info!("Building image {} from {}", build.tag, build.build_file.display());

        self.invocation()
            .args(build.to_args())
            .output_checked()
            .await
            .with_context(|| format!("Failed to build image {}", build.tag))?;

        info!("Image {} built", build.tag);
        Ok(())
    }

    async fn run_container(&self, spec: &ContainerSpec) -> Result<String> {
        info!("Creating container {} from image {}", spec.name, spec.image);

        let output = self
            .invocation()
            .args(spec.to_args())
            .output_checked()
            .await
            .with_context(|| format!("Failed to start container {}", spec.name))?;

        let container_id = output.stdout.trim().to_string();
        info!(
            "Container {} started successfully with ID: {}",
            spec.name, container_id
        );
        Ok(container_id)
    }

    async fn logs(&self, container: &str) -> Result<String> {
        let output = self
            .invocation()
            .arg("logs")
            .arg(container)
            .output_checked()
            .await
            .with_context(|| format!("Failed to read logs of container {}", container))?;

        Ok(output.combined())
    }

    async fn is_running(&self, container: &str) -> Result<bool> {
        let output = self
            .invocation()
            .args(["inspect", "-f", "{{.State.Running}}", container])
            .output()
            .await
            .with_context(|| format!("Failed to inspect container {}", container))?;

        Ok(output.success() && output.stdout.trim() == "true")
    }

    async fn container_exists(&self, name: &str) -> Result<bool> {
        let output = self
            .invocation()
            .args(["container", "inspect", "-f", "{{.Id}}", name])
            .output()
            .await
            .with_context(|| format!("Failed to inspect container {}", name))?;

        Ok(output.success())
    }

    async fn image_exists(&self, tag: &str) -> Result<bool> {
        let output = self
            .invocation()
            .args(["image", "inspect", "-f", "{{.Id}}", tag])
            .output()
            .await
            .with_context(|| format!("Failed to inspect image {}", tag))?;

        Ok(output.success())
    }
}
