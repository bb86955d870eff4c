//! In-memory stand-ins for the external tools, shared by stage tests

use anyhow::Result;
use async_trait::async_trait;
use oradock_core::config::{Credentials, RunConfig};
use oradock_core::domain::container::{ContainerSpec, ImageBuild, ResourceFilter};
use oradock_core::domain::export::ExportRequest;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::context::RunContext;
use crate::engine::ContainerEngine;
use crate::oracle::{DataPump, SqlClient};
use crate::process::CommandOutput;
use crate::tools::ToolLocator;

/// Records every call; container log snapshots are served in order
#[derive(Default)]
pub struct FakeEngine {
    pub calls: Mutex<Vec<String>>,
    pub running: Vec<String>,
    pub stopped: Vec<String>,
    pub images: Vec<String>,
    /// Container names and image tags present regardless of labels
    pub existing: Vec<String>,
    pub log_snapshots: Mutex<Vec<String>>,
    pub fail_listing: bool,
}

impl FakeEngine {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    async fn version(&self) -> Result<String> {
        self.record("version".to_string());
        Ok("Docker version 27.0.0".to_string())
    }

    async fn list_containers(&self, filter: &ResourceFilter, all: bool) -> Result<Vec<String>> {
        self.record(format!("ps all={} {:?}", all, filter));
        if self.fail_listing {
            anyhow::bail!("engine unavailable");
        }
        let mut ids = self.running.clone();
        if all {
            ids.extend(self.stopped.iter().cloned());
        }
        Ok(ids)
    }

    async fn stop_containers(&self, ids: &[String]) -> Result<()> {
        self.record(format!("stop {}", ids.join(",")));
        Ok(())
    }

    async fn remove_containers(&self, ids: &[String]) -> Result<()> {
        self.record(format!("rm {}", ids.join(",")));
        Ok(())
    }

    async fn list_images(&self, filter: &ResourceFilter) -> Result<Vec<String>> {
        self.record(format!("images {:?}", filter));
        if self.fail_listing {
            anyhow::bail!("engine unavailable");
        }
        Ok(self.images.clone())
    }

    async fn remove_images(&self, ids: &[String]) -> Result<()> {
        self.record(format!("rmi {}", ids.join(",")));
        Ok(())
    }

    async fn build_image(&self, build: &ImageBuild) -> Result<()> {
        self.record(format!("build {}", build.tag));
        Ok(())
    }

    async fn run_container(&self, spec: &ContainerSpec) -> Result<String> {
        self.record(format!("run {} {}:{}", spec.name, spec.host_port, spec.container_port));
        Ok("c0ffee".to_string())
    }

    async fn logs(&self, container: &str) -> Result<String> {
        self.record(format!("logs {}", container));
        let mut snapshots = self.log_snapshots.lock().unwrap();
        if snapshots.len() > 1 {
            Ok(snapshots.remove(0))
        } else {
            Ok(snapshots.first().cloned().unwrap_or_default())
        }
    }

    async fn is_running(&self, _container: &str) -> Result<bool> {
        Ok(true)
    }

    async fn container_exists(&self, name: &str) -> Result<bool> {
        self.record(format!("exists container {}", name));
        Ok(self.existing.iter().any(|entry| entry == name))
    }

    async fn image_exists(&self, tag: &str) -> Result<bool> {
        self.record(format!("exists image {}", tag));
        Ok(self.existing.iter().any(|entry| entry == tag))
    }
}

/// Answers the export-user query with a fixed count and records statements
pub struct FakeSql {
    pub user_count: u64,
    pub queries: Mutex<Vec<String>>,
    pub executed: Mutex<Vec<String>>,
}

impl FakeSql {
    pub fn with_user_count(user_count: u64) -> Self {
        Self {
            user_count,
            queries: Mutex::new(Vec::new()),
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl SqlClient for FakeSql {
    async fn query_count(&self, sql: &str) -> Result<u64> {
        self.queries.lock().unwrap().push(sql.to_string());
        Ok(self.user_count)
    }

    async fn execute(&self, statements: &[String]) -> Result<()> {
        self.executed.lock().unwrap().extend(statements.iter().cloned());
        Ok(())
    }
}

/// Writes the dump file into `dump_dir` unless told not to
pub struct FakePump {
    pub dump_dir: PathBuf,
    pub produce_dump: bool,
    pub requests: Mutex<Vec<String>>,
}

impl FakePump {
    pub fn new(dump_dir: &Path, produce_dump: bool) -> Self {
        Self {
            dump_dir: dump_dir.to_path_buf(),
            produce_dump,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DataPump for FakePump {
    async fn export(&self, request: &ExportRequest) -> Result<CommandOutput> {
        self.requests.lock().unwrap().push(request.parameters().join(" "));
        if self.produce_dump {
            std::fs::create_dir_all(&self.dump_dir)?;
            std::fs::write(self.dump_dir.join(&request.dump_file), b"dump")?;
        }
        Ok(CommandOutput::default())
    }
}

/// Every executable is present
pub struct AllTools;

impl ToolLocator for AllTools {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        Some(PathBuf::from("/usr/bin").join(program))
    }
}

/// No executable is present
pub struct NoTools;

impl ToolLocator for NoTools {
    fn locate(&self, _program: &str) -> Option<PathBuf> {
        None
    }
}

pub fn config(dir: &Path) -> RunConfig {
    RunConfig::new(
        dir,
        1522,
        "hr",
        "AMERICAN_AMERICA.AL32UTF8",
        Credentials::new("sys", "pw"),
    )
}

/// Context wired to fakes
pub fn context(
    config: RunConfig,
    engine: Arc<FakeEngine>,
    sql: Arc<FakeSql>,
    produce_dump: bool,
) -> (RunContext, Arc<FakePump>) {
    let pump = Arc::new(FakePump::new(&config.output_dir.join("dump"), produce_dump));
    let ctx = RunContext::with_tools(config, engine, sql, pump.clone(), Arc::new(AllTools));
    (ctx, pump)
}
