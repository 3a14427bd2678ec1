//! Move detector loop and the filesystem watcher around it.
//!
//! Accepted moves run as independent tasks in a [`JoinSet`], so a slow
//! confirmation poll never delays delivery of later notifications. On
//! shutdown the detector stops reading notifications, waits up to the
//! [`ShutdownPolicy`] grace period for in-flight workflows, then aborts the
//! rest. An aborted workflow leaves `origin` as it was.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{recommended_watcher, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;

use orgmirror_core::types::is_git_working_copy;
use orgmirror_core::Reporter;

use crate::debounce::{DebounceMap, MoveKey};
use crate::error::{io_err, WatchError};
use crate::event::{FsNotification, RenamePairer};
use crate::filter::{classify, MoveDecision};
use crate::transfer::{TransferOrchestrator, TransferWorkflow};

/// How often stale debounce entries are dropped.
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(30);

/// Finished workflows kept in [`DetectorSummary::recent`].
pub const RECENT_WORKFLOWS: usize = 16;

/// What happens to in-flight workflows when the detector stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownPolicy {
    /// Time allowed for in-flight workflows to finish before they are aborted.
    pub grace: Duration,
}

impl Default for ShutdownPolicy {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(10),
        }
    }
}

impl ShutdownPolicy {
    /// Abort everything in flight immediately.
    pub fn abandon() -> Self {
        Self {
            grace: Duration::ZERO,
        }
    }
}

/// Totals for one detector run.
#[derive(Debug, Default)]
pub struct DetectorSummary {
    pub dispatched: usize,
    /// Workflows that reached a terminal state.
    pub finished: usize,
    /// Finished workflows that ended in `RemoteUrlUpdated`.
    pub succeeded: usize,
    /// Workflows aborted at shutdown or lost to a panic.
    pub abandoned: usize,
    /// The last [`RECENT_WORKFLOWS`] finished workflows, oldest first.
    pub recent: VecDeque<TransferWorkflow>,
}

impl DetectorSummary {
    fn record(&mut self, joined: Result<TransferWorkflow, JoinError>) {
        match joined {
            Ok(workflow) => {
                self.finished += 1;
                if workflow.state().is_success() {
                    self.succeeded += 1;
                }
                if self.recent.len() == RECENT_WORKFLOWS {
                    self.recent.pop_front();
                }
                self.recent.push_back(workflow);
            }
            Err(err) => {
                if err.is_panic() {
                    tracing::error!(error = %err, "transfer workflow panicked");
                }
                self.abandoned += 1;
            }
        }
    }
}

/// Filters and debounces notifications, dispatching accepted moves.
pub struct MoveDetector {
    base: PathBuf,
    debounce: DebounceMap,
    orchestrator: Arc<TransferOrchestrator>,
    reporter: Arc<dyn Reporter>,
    is_working_copy: fn(&Path) -> bool,
}

impl MoveDetector {
    pub fn new(
        base: impl Into<PathBuf>,
        orchestrator: Arc<TransferOrchestrator>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            base: base.into(),
            debounce: DebounceMap::default(),
            orchestrator,
            reporter,
            is_working_copy: is_git_working_copy,
        }
    }

    pub fn with_debounce(mut self, debounce: DebounceMap) -> Self {
        self.debounce = debounce;
        self
    }

    /// Consume notifications until `rx` closes or `shutdown` fires.
    pub async fn run(
        self,
        mut rx: mpsc::UnboundedReceiver<FsNotification>,
        mut shutdown: broadcast::Receiver<()>,
        policy: ShutdownPolicy,
    ) -> DetectorSummary {
        let mut tasks = JoinSet::new();
        let mut summary = DetectorSummary::default();

        let mut prune = tokio::time::interval(PRUNE_INTERVAL);
        prune.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        prune.tick().await; // consume the first immediate tick

        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                notification = rx.recv() => {
                    let Some(notification) = notification else { break };
                    if self.dispatch(notification, Instant::now(), &mut tasks) {
                        summary.dispatched += 1;
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    summary.record(joined);
                }
                _ = prune.tick() => {
                    let removed = self.debounce.prune(Instant::now());
                    if removed > 0 {
                        tracing::debug!(removed, "pruned debounce entries");
                    }
                }
            }
        }

        drain(tasks, policy, &mut summary).await;
        summary
    }

    /// Apply the filter and debounce to one notification, spawning a workflow
    /// when it is accepted. Returns whether a workflow was spawned.
    pub fn dispatch(
        &self,
        notification: FsNotification,
        now: Instant,
        tasks: &mut JoinSet<TransferWorkflow>,
    ) -> bool {
        let FsNotification::DirectoryMoved { from, to } = notification else {
            return false;
        };

        let accepted = match classify(&self.base, &from, &to, self.is_working_copy) {
            MoveDecision::Accept(accepted) => accepted,
            MoveDecision::Ignored => return false,
            MoveDecision::RenamedWithinOrg {
                org,
                from_name,
                to_name,
            } => {
                self.reporter
                    .info(&format!("Repo renamed within {org}: {from_name} -> {to_name}"));
                return false;
            }
            MoveDecision::NotAWorkingCopy { path } => {
                self.reporter.warning(&format!(
                    "Moved folder is not a git repo: {}",
                    path.display()
                ));
                return false;
            }
        };

        if !self
            .debounce
            .check_and_record(MoveKey::new(&accepted.from, &accepted.to), now)
        {
            tracing::debug!(from = %accepted.from.display(), to = %accepted.to.display(), "duplicate move suppressed");
            return false;
        }

        let orchestrator = Arc::clone(&self.orchestrator);
        tasks.spawn(async move { orchestrator.run(accepted).await });
        true
    }
}

async fn drain(
    mut tasks: JoinSet<TransferWorkflow>,
    policy: ShutdownPolicy,
    summary: &mut DetectorSummary,
) {
    if tasks.is_empty() {
        return;
    }
    tracing::info!(in_flight = tasks.len(), "waiting for in-flight transfers");

    let waited = tokio::time::timeout(policy.grace, async {
        while let Some(joined) = tasks.join_next().await {
            summary.record(joined);
        }
    })
    .await;

    if waited.is_err() {
        tracing::warn!(
            in_flight = tasks.len(),
            "grace period elapsed, abandoning transfers"
        );
        tasks.abort_all();
        while let Some(joined) = tasks.join_next().await {
            summary.record(joined);
        }
    }
}

/// Watch `base` until ctrl-c or a message on `shutdown`.
///
/// Completed transfers are published by `orchestrator`; subscribe before
/// calling this. A shutdown sent once this call has started is never lost.
pub async fn watch(
    base: &Path,
    orchestrator: Arc<TransferOrchestrator>,
    reporter: Arc<dyn Reporter>,
    shutdown: broadcast::Sender<()>,
    policy: ShutdownPolicy,
) -> Result<DetectorSummary, WatchError> {
    let detector_shutdown = shutdown.subscribe();
    let mut signal_shutdown = shutdown.subscribe();

    if !base.is_dir() {
        return Err(WatchError::BasePathMissing {
            path: base.to_path_buf(),
        });
    }
    // Events arrive with real paths; canonicalize so prefix checks match.
    let base = fs::canonicalize(base).map_err(|e| io_err(base, e))?;

    let (tx, rx) = mpsc::unbounded_channel::<FsNotification>();
    let mut pairer = RenamePairer::default();
    let mut watcher: RecommendedWatcher =
        recommended_watcher(move |event: notify::Result<Event>| match event {
            Ok(event) => {
                let notification = pairer.feed(&event, std::time::Instant::now());
                if notification != FsNotification::Other {
                    let _ = tx.send(notification);
                }
            }
            Err(err) => tracing::warn!(error = %err, "watcher event error"),
        })?;
    watcher.watch(&base, RecursiveMode::Recursive)?;

    reporter.success(&format!("Watching for repo moves in: {}", base.display()));
    reporter.info("Move a repo folder between org directories to trigger a transfer");

    let signal_handle = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = signal_shutdown.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => match signal {
                    Ok(()) => {
                        tracing::info!("received ctrl-c, stopping watcher");
                        let _ = shutdown.send(());
                        Ok(())
                    }
                    Err(err) => {
                        let _ = shutdown.send(());
                        Err(WatchError::Signal(err.to_string()))
                    }
                },
            }
        })
    };

    let detector = MoveDetector::new(base, orchestrator, Arc::clone(&reporter));
    let summary = detector.run(rx, detector_shutdown, policy).await;
    drop(watcher);
    // Unblock the signal task when the detector ended on its own.
    let _ = shutdown.send(());

    match signal_handle.await {
        Ok(result) => result?,
        Err(err) => {
            return Err(WatchError::Join {
                task: "signal_handler",
                message: err.to_string(),
            })
        }
    }

    reporter.info("Watcher stopped");
    Ok(summary)
}
