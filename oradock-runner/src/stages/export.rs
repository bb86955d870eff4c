//! Source-side export
//!
//! Makes sure the export account and its directory object exist on the
//! source database, runs the schema export and checks that the dump file
//! landed in the workspace.

use anyhow::{Context, Result};
use oradock_core::domain::export::{EXPORT_DIRECTORY_OBJECT, ExportRequest};
use oradock_core::sql::{export_account_statements, user_exists_query};
use std::path::PathBuf;

use crate::context::RunContext;

/// Creates the export account when it is missing
///
/// Returns `true` when the account was created by this call.
pub async fn ensure_export_account(ctx: &RunContext) -> Result<bool> {
    let account = &ctx.config.export_account;

    let count = ctx
        .sql
        .query_count(&user_exists_query(&account.username))
        .await
        .context("Failed to check for the export account")?;

    if count > 0 {
        ctx.journal
            .info(format!("Export account {} already exists", account.username));
        return Ok(false);
    }

    ctx.journal.info(format!(
        "Creating export account {} with directory {}",
        account.username, EXPORT_DIRECTORY_OBJECT
    ));
    let statements =
        export_account_statements(account, EXPORT_DIRECTORY_OBJECT, &ctx.layout.dump_dir());
    ctx.sql
        .execute(&statements)
        .await
        .context("Failed to create the export account")?;

    Ok(true)
}

/// Exports the configured schemas and returns the dump file path
pub async fn export_schemas(ctx: &RunContext) -> Result<PathBuf> {
    let request = ExportRequest::from_config(&ctx.config);
    ctx.journal
        .info(format!("Exporting schemas: {}", request.schemas));

    let output = ctx.pump.export(&request).await?;
    if !output.stderr.trim().is_empty() {
        ctx.journal.debug(format!("expdp stderr:\n{}", output.stderr.trim()));
    }

    let dump_file = ctx.layout.dump_file();
    if !dump_file.is_file() {
        let message = format!(
            "Dump file not found after export: {} (see {})",
            dump_file.display(),
            ctx.layout.dump_dir().join(&request.log_file).display()
        );
        ctx.journal.error(&message);
        anyhow::bail!(message);
    }

    ctx.journal
        .info(format!("Export written to {}", dump_file.display()));
    Ok(dump_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeEngine, FakeSql, config, context};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_existing_account_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let sql = Arc::new(FakeSql::with_user_count(1));
        let (ctx, _) = context(config(dir.path()), Arc::new(FakeEngine::default()), sql.clone(), true);

        assert!(!ensure_export_account(&ctx).await.unwrap());
        assert!(sql.executed().is_empty());
        assert_eq!(
            sql.queries.lock().unwrap().as_slice(),
            ["SELECT COUNT(*) FROM dba_users WHERE username = 'ORADOCK_EXP';"]
        );
    }

    #[tokio::test]
    async fn test_missing_account_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let sql = Arc::new(FakeSql::with_user_count(0));
        let (ctx, _) = context(config(dir.path()), Arc::new(FakeEngine::default()), sql.clone(), true);

        assert!(ensure_export_account(&ctx).await.unwrap());

        let executed = sql.executed();
        assert_eq!(executed.len(), 5);
        assert!(executed[0].starts_with("CREATE USER ORADOCK_EXP"));
        assert!(executed[3].starts_with("CREATE OR REPLACE DIRECTORY ORADOCK_EXPORT_DIR AS '"));
        assert!(executed[3].ends_with("/dump';"));
    }

    #[tokio::test]
    async fn test_directory_object_path_is_absolute() {
        let sql = Arc::new(FakeSql::with_user_count(0));
        let (ctx, _) = context(
            config(std::path::Path::new("./migrate")),
            Arc::new(FakeEngine::default()),
            sql.clone(),
            true,
        );

        ensure_export_account(&ctx).await.unwrap();

        let dump_dir = std::env::current_dir().unwrap().join("migrate").join("dump");
        let expected = format!(
            "CREATE OR REPLACE DIRECTORY ORADOCK_EXPORT_DIR AS '{}';",
            oradock_core::layout::to_db_path(&dump_dir)
        );
        assert_eq!(sql.executed()[3], expected);
    }

    #[tokio::test]
    async fn test_export_returns_dump_path() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, pump) = context(
            config(dir.path()),
            Arc::new(FakeEngine::default()),
            Arc::new(FakeSql::with_user_count(1)),
            true,
        );

        let dump = export_schemas(&ctx).await.unwrap();

        assert_eq!(dump, ctx.layout.dump_file());
        let requests = pump.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].contains("SCHEMAS=HR"));
    }

    #[tokio::test]
    async fn test_missing_dump_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _) = context(
            config(dir.path()),
            Arc::new(FakeEngine::default()),
            Arc::new(FakeSql::with_user_count(1)),
            false,
        );
        ctx.layout.ensure_dirs().unwrap();
        ctx.journal.attach().unwrap();

        let err = export_schemas(&ctx).await.unwrap_err();

        assert!(err.to_string().contains("Dump file not found"));
        let journal = std::fs::read_to_string(ctx.layout.journal_file()).unwrap();
        assert!(journal.contains("Dump file not found after export"));
    }
}
