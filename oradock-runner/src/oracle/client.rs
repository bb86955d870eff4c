//! Database client
//!
//! Runs SYSDBA sessions against the local database through `sqlplus`.
//! Scripts, credentials included, go through standard input.

use anyhow::{Context, Result};
use async_trait::async_trait;
use oradock_core::config::Credentials;
use oradock_core::sql::{SqlSession, parse_count};
use tracing::debug;

use crate::process::Invocation;

pub const SQLPLUS_PROGRAM: &str = "sqlplus";

/// Typed access to the source database
#[async_trait]
pub trait SqlClient: Send + Sync {
    /// Runs a query returning a single count
    async fn query_count(&self, sql: &str) -> Result<u64>;

    /// Runs statements in one session, stopping at the first SQL error
    async fn execute(&self, statements: &[String]) -> Result<()>;
}

/// `sqlplus -S /nolog` with a SYSDBA `CONNECT` fed on stdin
pub struct SqlPlusClient {
    program: String,
    credentials: Credentials,
}

impl SqlPlusClient {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            program: SQLPLUS_PROGRAM.to_string(),
            credentials,
        }
    }

    async fn run_session(&self, session: SqlSession) -> Result<String> {
        let output = Invocation::new(&self.program)
            .args(["-S", "-L", "/nolog"])
            .stdin(session.render())
            .output_checked()
            .await
            .context("Database client session failed")?;

        Ok(output.stdout)
    }
}

#[async_trait]
impl SqlClient for SqlPlusClient {
    async fn query_count(&self, sql: &str) -> Result<u64> {
        let stdout = self
            .run_session(SqlSession::sysdba(&self.credentials).statement(sql))
            .await?;

        let count = parse_count(&stdout)
            .with_context(|| format!("Unexpected result for query: {}", sql))?;

        debug!("Query returned {}", count);
        Ok(count)
    }

    async fn execute(&self, statements: &[String]) -> Result<()> {
        let stdout = self
            .run_session(SqlSession::sysdba(&self.credentials).statements(statements.iter().cloned()))
            .await?;

        if let Some(line) = stdout
            .lines()
            .find(|line| line.contains("ORA-") || line.contains("SP2-"))
        {
            anyhow::bail!("Database client reported an error: {}", line.trim());
        }

        debug!("Executed {} statement(s)", statements.len());
        Ok(())
    }
}
