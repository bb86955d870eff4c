//! External process invocation
//!
//! Every external tool (container engine, database client, export utility)
//! is started through [`Invocation`]. Arguments flagged as secret are masked
//! in everything that gets logged.

use anyhow::{Context, Result};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error};

const MASK: &str = "****";

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        let mut combined = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !combined.is_empty() && !combined.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(&self.stderr);
        }
        combined
    }
}

/// A command line to run, with optional standard input
#[derive(Debug, Clone)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    secret: Vec<bool>,
    stdin: Option<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            secret: Vec::new(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self.secret.push(false);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Argument masked in logs
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self.secret.push(true);
        self
    }

    /// Text written to the process's standard input, then closed
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Command line for logging, secrets masked
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for (arg, secret) in self.args.iter().zip(&self.secret) {
            line.push(' ');
            line.push_str(if *secret { MASK } else { arg });
        }
        line
    }

    /// Runs to completion and captures output, whatever the exit status
    pub async fn output(&self) -> Result<CommandOutput> {
        debug!("Running: {}", self.display());

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(if self.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to execute '{}'. Is it installed?", self.program))?;

        if let Some(input) = &self.stdin {
            let mut stdin = child
                .stdin
                .take()
                .context("Child process has no standard input")?;
            stdin
                .write_all(input.as_bytes())
                .await
                .with_context(|| format!("Failed to write to '{}' standard input", self.program))?;
            // closing stdin lets interactive clients see end of input
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .with_context(|| format!("Failed to wait for '{}'", self.program))?;

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        };

        if !result.stdout.trim().is_empty() {
            debug!("{} stdout: {}", self.program, result.stdout.trim());
        }
        if !result.stderr.trim().is_empty() {
            debug!("{} stderr: {}", self.program, result.stderr.trim());
        }

        Ok(result)
    }

    /// Runs to completion and fails on a non-zero exit status
    pub async fn output_checked(&self) -> Result<CommandOutput> {
        let output = self.output().await?;

        if !output.success() {
            let error_msg = format!(
                "Command '{}' failed: exit_code={}, stdout='{}', stderr='{}'",
                self.display(),
                output.exit_code,
                output.stdout.trim(),
                output.stderr.trim()
            );
            error!("{}", error_msg);
            anyhow::bail!("{}", error_msg);
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_masks_secrets() {
        let invocation = Invocation::new("expdp")
            .secret_arg("scott/\"tiger\"")
            .args(["DIRECTORY=D", "SCHEMAS=HR"]);
        assert_eq!(invocation.display(), "expdp **** DIRECTORY=D SCHEMAS=HR");
    }

    #[test]
    fn test_combined_output() {
        let output = CommandOutput {
            stdout: "out".to_string(),
            stderr: "err\n".to_string(),
            exit_code: 0,
        };
        assert_eq!(output.combined(), "out\nerr\n");
        assert!(output.success());

        let only_err = CommandOutput {
            stdout: String::new(),
            stderr: "err".to_string(),
            exit_code: 3,
        };
        assert_eq!(only_err.combined(), "err");
        assert!(!only_err.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_with_stdin() {
        let output = Invocation::new("cat").stdin("hello\n").output().await.unwrap();
        assert_eq!(output.stdout, "hello\n");
        assert!(output.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_checked_fails_on_exit_code() {
        let result = Invocation::new("sh")
            .args(["-c", "echo nope >&2; exit 3"])
            .output_checked()
            .await;
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("exit_code=3"));
        assert!(message.contains("nope"));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let result = Invocation::new("oradock-no-such-program").output().await;
        assert!(result.is_err());
    }
}
