//! Import completion poller
//!
//! Watches the container log until the import script reports a result.
//! Each cycle fetches the combined log and classifies it; while the import
//! is still running the tail of the log is journaled and the poller sleeps
//! for a fixed interval. There is no backoff.
//!
//! The wait ends in one of four states: done, failed, timed out (when a
//! deadline is configured) or cancelled.

use anyhow::{Context, Result};
use async_trait::async_trait;
use oradock_core::domain::import::{ImportState, tail_lines};
use tokio::sync::watch;
use tokio::time::{self, Duration, Instant};
use tracing::debug;

use crate::engine::ContainerEngine;
use crate::journal::RunJournal;

/// Lines of container output journaled per poll
const SNAPSHOT_LINES: usize = 20;

/// Where the poller reads import progress from
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Current combined log output
    async fn fetch(&self) -> Result<String>;

    /// Whether the producer is still running
    async fn is_alive(&self) -> Result<bool>;
}

/// Log output of one container
pub struct ContainerLogs<'a> {
    engine: &'a dyn ContainerEngine,
    container: String,
}

impl<'a> ContainerLogs<'a> {
    pub fn new(engine: &'a dyn ContainerEngine, container: impl Into<String>) -> Self {
        Self {
            engine,
            container: container.into(),
        }
    }
}

#[async_trait]
impl LogSource for ContainerLogs<'_> {
    async fn fetch(&self) -> Result<String> {
        self.engine.logs(&self.container).await
    }

    async fn is_alive(&self) -> Result<bool> {
        self.engine.is_running(&self.container).await
    }
}

/// Cancellation signal for the wait
///
/// Cancelled once the paired sender publishes `true`. A signal whose sender
/// is gone can no longer be cancelled.
pub struct CancelSignal {
    receiver: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn new(receiver: watch::Receiver<bool>) -> Self {
        Self { receiver }
    }

    /// Signal that never fires
    pub fn never() -> Self {
        let (_sender, receiver) = watch::channel(false);
        Self { receiver }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves when cancellation is requested
    pub async fn cancelled(&mut self) {
        if self.receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// How a wait ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub state: ImportState,
    /// Log fetches performed
    pub polls: u32,
    pub elapsed: Duration,
}

/// Polls a log source until the import reaches a terminal state
#[derive(Debug, Clone)]
pub struct CompletionPoller {
    interval: Duration,
    timeout: Option<Duration>,
}

impl CompletionPoller {
    pub fn new(interval: Duration, timeout: Option<Duration>) -> Self {
        Self { interval, timeout }
    }

    /// Runs the polling loop
    ///
    /// A source error aborts the wait. With N polls that find no marker, the
    /// loop sleeps exactly N times and returns on poll N+1.
    pub async fn wait(
        &self,
        source: &dyn LogSource,
        journal: &RunJournal,
        cancel: &mut CancelSignal,
    ) -> Result<ImportOutcome> {
        let started = Instant::now();
        let deadline = self.timeout.map(|timeout| started + timeout);
        let mut polls = 0u32;

        journal.info(format!(
            "Waiting for import to complete (poll interval: {:?}, timeout: {})",
            self.interval,
            self.timeout
                .map(|t| format!("{:?}", t))
                .unwrap_or_else(|| "none".to_string())
        ));

        let finish = |state: ImportState, polls: u32| ImportOutcome {
            state,
            polls,
            elapsed: started.elapsed(),
        };

        loop {
            if cancel.is_cancelled() {
                return Ok(finish(ImportState::Cancelled, polls));
            }

            polls += 1;
            debug!("Polling container log (poll {})", polls);

            let logs = source.fetch().await.context("Failed to fetch import log")?;
            let state = ImportState::observe(&logs);
            if state.is_terminal() {
                return Ok(finish(state, polls));
            }

            if !source.is_alive().await? {
                // the marker may have been written just before the exit
                let logs = source.fetch().await.context("Failed to fetch import log")?;
                let state = match ImportState::observe(&logs) {
                    ImportState::Waiting => ImportState::Failed(
                        "container stopped before the import completed".to_string(),
                    ),
                    terminal => terminal,
                };
                return Ok(finish(state, polls));
            }

            journal.info(format!(
                "Import not finished yet (poll {}). Latest output:\n{}",
                polls,
                tail_lines(&logs, SNAPSHOT_LINES)
            ));

            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Ok(finish(ImportState::TimedOut, polls));
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(finish(ImportState::Cancelled, polls)),
                _ = deadline_reached(deadline) => return Ok(finish(ImportState::TimedOut, polls)),
                _ = time::sleep(self.interval) => {}
            }
        }
    }
}

async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oradock_core::domain::import::{COMPLETION_MARKER, FAILURE_MARKER};
    use std::sync::Mutex;

    /// Yields queued snapshots in order, repeating the last one
    struct ScriptedLogs {
        snapshots: Mutex<Vec<String>>,
        fetches: Mutex<u32>,
        alive: bool,
    }

    impl ScriptedLogs {
        fn new(snapshots: Vec<String>) -> Self {
            Self {
                snapshots: Mutex::new(snapshots),
                fetches: Mutex::new(0),
                alive: true,
            }
        }

        fn waiting_then(n: usize, last: &str) -> Self {
            let mut snapshots: Vec<String> =
                (0..n).map(|i| format!("database starting... step {}", i)).collect();
            snapshots.push(last.to_string());
            Self::new(snapshots)
        }

        fn fetches(&self) -> u32 {
            *self.fetches.lock().unwrap()
        }
    }

    #[async_trait]
    impl LogSource for ScriptedLogs {
        async fn fetch(&self) -> Result<String> {
            *self.fetches.lock().unwrap() += 1;
            let mut snapshots = self.snapshots.lock().unwrap();
            if snapshots.len() > 1 {
                Ok(snapshots.remove(0))
            } else {
                Ok(snapshots[0].clone())
            }
        }

        async fn is_alive(&self) -> Result<bool> {
            Ok(self.alive)
        }
    }

    fn journal() -> RunJournal {
        RunJournal::detached(std::env::temp_dir().join("oradock-poller-unused.log"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleeps_exactly_n_times_before_completion() {
        for n in [0usize, 1, 4] {
            let source = ScriptedLogs::waiting_then(n, &format!("{} (impdp exit 0)", COMPLETION_MARKER));
            let poller = CompletionPoller::new(Duration::from_secs(10), None);

            let outcome = poller
                .wait(&source, &journal(), &mut CancelSignal::never())
                .await
                .unwrap();

            assert_eq!(outcome.state, ImportState::Done);
            assert_eq!(outcome.polls, n as u32 + 1);
            assert_eq!(source.fetches(), n as u32 + 1);
            assert_eq!(outcome.elapsed, Duration::from_secs(10 * n as u64));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_marker_ends_wait() {
        let source = ScriptedLogs::waiting_then(2, &format!("{} (impdp exit 1)", FAILURE_MARKER));
        let poller = CompletionPoller::new(Duration::from_secs(10), None);

        let outcome = poller
            .wait(&source, &journal(), &mut CancelSignal::never())
            .await
            .unwrap();

        assert!(matches!(outcome.state, ImportState::Failed(ref line) if line.contains("exit 1")));
        assert_eq!(outcome.polls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_times_out() {
        let source = ScriptedLogs::new(vec!["still starting".to_string()]);
        let poller = CompletionPoller::new(Duration::from_secs(10), Some(Duration::from_secs(35)));

        let outcome = poller
            .wait(&source, &journal(), &mut CancelSignal::never())
            .await
            .unwrap();

        assert_eq!(outcome.state, ImportState::TimedOut);
        assert_eq!(outcome.polls, 4);
        assert_eq!(outcome.elapsed, Duration::from_secs(35));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_sleep() {
        let source = ScriptedLogs::new(vec!["still starting".to_string()]);
        let poller = CompletionPoller::new(Duration::from_secs(10), None);
        let (sender, receiver) = watch::channel(false);
        let mut cancel = CancelSignal::new(receiver);

        tokio::spawn(async move {
            time::sleep(Duration::from_secs(25)).await;
            let _ = sender.send(true);
        });

        let outcome = poller.wait(&source, &journal(), &mut cancel).await.unwrap();

        assert_eq!(outcome.state, ImportState::Cancelled);
        assert_eq!(outcome.polls, 3);
        assert_eq!(outcome.elapsed, Duration::from_secs(25));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_container_fails_wait() {
        let mut source = ScriptedLogs::new(vec!["ORA-00600 internal error".to_string()]);
        source.alive = false;
        let poller = CompletionPoller::new(Duration::from_secs(10), None);

        let outcome = poller
            .wait(&source, &journal(), &mut CancelSignal::never())
            .await
            .unwrap();

        assert!(matches!(outcome.state, ImportState::Failed(_)));
        assert_eq!(outcome.polls, 1);
        assert_eq!(outcome.elapsed, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshots_are_journaled() {
        let dir = tempfile::tempdir().unwrap();
        let journal = RunJournal::detached(dir.path().join("oradock.log"));
        journal.attach().unwrap();

        let source = ScriptedLogs::waiting_then(2, COMPLETION_MARKER);
        let poller = CompletionPoller::new(Duration::from_secs(10), None);
        poller
            .wait(&source, &journal, &mut CancelSignal::never())
            .await
            .unwrap();

        let written = std::fs::read_to_string(journal.path()).unwrap();
        assert!(written.contains("Import not finished yet (poll 1)"));
        assert!(written.contains("database starting... step 1"));
        assert!(!written.contains("(poll 3)"));
    }
}
