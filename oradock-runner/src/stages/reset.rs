//! Environment reset
//!
//! Clears the dump directory and removes the containers and images left by
//! earlier runs, so the new run starts from a clean slate.
//!
//! With [`ResetScope::Namespace`] only resources labelled with the run
//! namespace are touched, plus the configured container name and image tag:
//! the new run reuses both, so they go even when an older build left them
//! with another label or none. [`ResetScope::Host`] removes every container
//! and image on the host, including ones this tool never created.
//!
//! Container-engine failures are journaled as warnings and do not stop the
//! reset.

use anyhow::{Context, Result};
use oradock_core::config::{ResetScope, RunConfig};
use oradock_core::domain::container::ResourceFilter;
use oradock_core::layout::WorkspaceLayout;
use std::fs;
use std::slice;

use crate::context::RunContext;
use crate::engine::ContainerEngine;
use crate::journal::RunJournal;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetSummary {
    pub dump_entries_removed: usize,
    pub containers_stopped: usize,
    pub containers_removed: usize,
    pub images_removed: usize,
}

/// Runs the whole reset
pub async fn reset_environment(ctx: &RunContext) -> Result<ResetSummary> {
    let dump_entries_removed = clear_dump_dir(&ctx.layout)?;
    ctx.journal.info(format!(
        "Cleared dump directory {} ({} entries removed)",
        ctx.layout.dump_dir().display(),
        dump_entries_removed
    ));

    let mut summary = reset_containers(ctx.engine.as_ref(), &ctx.config, &ctx.journal).await;
    summary.dump_entries_removed = dump_entries_removed;

    Ok(summary)
}

/// Deletes everything inside the dump directory, keeping the directory
///
/// Returns the number of top-level entries removed.
pub fn clear_dump_dir(layout: &WorkspaceLayout) -> Result<usize> {
    let dump_dir = layout.dump_dir();
    fs::create_dir_all(&dump_dir)
        .with_context(|| format!("Failed to create {}", dump_dir.display()))?;

    let mut removed = 0;
    for entry in fs::read_dir(&dump_dir)
        .with_context(|| format!("Failed to read {}", dump_dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        }
        .with_context(|| format!("Failed to remove {}", path.display()))?;

        removed += 1;
    }

    Ok(removed)
}

/// Stops running containers, removes containers, force-removes images
pub async fn reset_containers(
    engine: &dyn ContainerEngine,
    config: &RunConfig,
    journal: &RunJournal,
) -> ResetSummary {
    let scope = config.reset_scope;
    let namespace = config.namespace.as_str();
    let filter = ResourceFilter::for_reset(scope, namespace);
    let mut summary = ResetSummary::default();

    match scope {
        ResetScope::Namespace => journal.info(format!(
            "Resetting containers and images in namespace '{}'",
            namespace
        )),
        ResetScope::Host => {
            journal.warning("Resetting ALL containers and images on this host")
        }
    }

    match engine.list_containers(&filter, false).await {
        Ok(running) if !running.is_empty() => match engine.stop_containers(&running).await {
            Ok(()) => summary.containers_stopped = running.len(),
            Err(e) => journal.warning(format!("Failed to stop containers: {:#}", e)),
        },
        Ok(_) => {}
        Err(e) => journal.warning(format!("Failed to list running containers: {:#}", e)),
    }

    match engine.list_containers(&filter, true).await {
        Ok(all) if !all.is_empty() => match engine.remove_containers(&all).await {
            Ok(()) => summary.containers_removed = all.len(),
            Err(e) => journal.warning(format!("Failed to remove containers: {:#}", e)),
        },
        Ok(_) => {}
        Err(e) => journal.warning(format!("Failed to list containers: {:#}", e)),
    }

    if scope == ResetScope::Namespace {
        let name = &config.container_name;
        match engine.container_exists(name).await {
            Ok(true) => match engine.remove_containers(slice::from_ref(name)).await {
                Ok(()) => summary.containers_removed += 1,
                Err(e) => journal.warning(format!("Failed to remove container {}: {:#}", name, e)),
            },
            Ok(false) => {}
            Err(e) => journal.warning(format!("Failed to look up container {}: {:#}", name, e)),
        }
    }

    match engine.list_images(&filter).await {
        Ok(images) if !images.is_empty() => match engine.remove_images(&images).await {
            Ok(()) => summary.images_removed = images.len(),
            Err(e) => journal.warning(format!("Failed to remove images: {:#}", e)),
        },
        Ok(_) => {}
        Err(e) => journal.warning(format!("Failed to list images: {:#}", e)),
    }

    if scope == ResetScope::Namespace {
        let tag = &config.image_tag;
        match engine.image_exists(tag).await {
            Ok(true) => match engine.remove_images(slice::from_ref(tag)).await {
                Ok(()) => summary.images_removed += 1,
                Err(e) => journal.warning(format!("Failed to remove image {}: {:#}", tag, e)),
            },
            Ok(false) => {}
            Err(e) => journal.warning(format!("Failed to look up image {}: {:#}", tag, e)),
        }
    }

    journal.info(format!(
        "Container reset done: {} stopped, {} removed, {} image(s) removed",
        summary.containers_stopped, summary.containers_removed, summary.images_removed
    ));

    summary
}
