//! Transfer workflow driven by an accepted organization move.
//!
//! ```text
//! Detected → RemoteResolving → OwnershipVerified → TransferRequested
//!   → TransferPolling → TransferConfirmed → RemoteUrlUpdated
//!                     ↘ TransferTimedOut
//!   ↘ TransferRejected(Cooldown)
//!   ↘ Failed(reason)
//! ```
//!
//! Only `RemoteUrlUpdated` publishes a [`TransferCompleted`] event. A timed
//! out transfer leaves `origin` untouched.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::time::Instant;

use orgmirror_core::types::{CloneProtocol, OrgName, RepoName};
use orgmirror_core::{
    build_clone_url, parse_remote_url, Config, Lookup, RemoteHost, RemoteUrlError, Reporter,
    TransferRequestError, WorkingCopies,
};

use crate::filter::OrgMove;

pub const POLL_INTERVAL: Duration = Duration::from_secs(2);
const COMPLETED_CHANNEL_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// Why a workflow ended in [`TransferState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// `origin` could not be read or is not a github.com URL.
    CannotResolveRemote(String),
    /// `origin` names an owner other than the folder the copy left.
    OwnershipMismatch {
        recorded_owner: OrgName,
        source_org: OrgName,
    },
    TransferRequest(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::CannotResolveRemote(msg) => write!(f, "cannot resolve remote: {msg}"),
            FailureReason::OwnershipMismatch {
                recorded_owner,
                source_org,
            } => write!(
                f,
                "remote owner is {recorded_owner} but the folder was moved from {source_org}"
            ),
            FailureReason::TransferRequest(msg) => write!(f, "transfer request failed: {msg}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Cooldown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferState {
    Detected,
    RemoteResolving,
    OwnershipVerified,
    TransferRequested,
    TransferPolling,
    TransferConfirmed,
    RemoteUrlUpdated,
    TransferTimedOut,
    TransferRejected(Rejection),
    Failed(FailureReason),
}

impl TransferState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferState::RemoteUrlUpdated
                | TransferState::TransferTimedOut
                | TransferState::TransferRejected(_)
                | TransferState::Failed(_)
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TransferState::RemoteUrlUpdated)
    }
}

// ---------------------------------------------------------------------------
// Workflow record
// ---------------------------------------------------------------------------

/// One move's progress through the state machine.
#[derive(Debug, Clone)]
pub struct TransferWorkflow {
    pub origin: OrgMove,
    /// Repository name as recorded in `origin`, once resolved.
    pub repo: Option<RepoName>,
    /// URL written to `origin` after confirmation, if any.
    pub new_remote_url: Option<String>,
    trail: Vec<TransferState>,
}

impl TransferWorkflow {
    pub fn new(origin: OrgMove) -> Self {
        Self {
            origin,
            repo: None,
            new_remote_url: None,
            trail: vec![TransferState::Detected],
        }
    }

    pub fn state(&self) -> &TransferState {
        // The trail always starts with `Detected`.
        self.trail.last().unwrap_or(&TransferState::Detected)
    }

    /// Every state visited, in order.
    pub fn trail(&self) -> &[TransferState] {
        &self.trail
    }

    fn advance(&mut self, next: TransferState) {
        tracing::debug!(
            from = %self.origin.source_org,
            to = %self.origin.dest_org,
            state = ?next,
            "transfer state",
        );
        self.trail.push(next);
    }
}

/// Published once per successful transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferCompleted {
    pub source_org: OrgName,
    pub dest_org: OrgName,
    pub repo: RepoName,
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPolicy {
    pub poll_interval: Duration,
    /// Bound on the confirmation poll.
    pub timeout: Duration,
    pub auto_update_remotes: bool,
    pub clone_protocol: CloneProtocol,
}

impl TransferPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            timeout: Duration::from_secs(config.transfer_timeout),
            auto_update_remotes: config.auto_update_remotes,
            clone_protocol: config.clone_protocol,
        }
    }
}

impl Default for TransferPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Runs [`TransferWorkflow`]s against the injected collaborators.
pub struct TransferOrchestrator {
    host: Arc<dyn RemoteHost>,
    copies: Arc<dyn WorkingCopies>,
    reporter: Arc<dyn Reporter>,
    policy: TransferPolicy,
    completed: broadcast::Sender<TransferCompleted>,
}

impl TransferOrchestrator {
    pub fn new(
        host: Arc<dyn RemoteHost>,
        copies: Arc<dyn WorkingCopies>,
        reporter: Arc<dyn Reporter>,
        policy: TransferPolicy,
    ) -> Self {
        let (completed, _) = broadcast::channel(COMPLETED_CHANNEL_CAPACITY);
        Self {
            host,
            copies,
            reporter,
            policy,
            completed,
        }
    }

    /// Register an observer of completed transfers.
    pub fn subscribe(&self) -> broadcast::Receiver<TransferCompleted> {
        self.completed.subscribe()
    }

    pub fn policy(&self) -> &TransferPolicy {
        &self.policy
    }

    /// Drive one move to a terminal state.
    pub async fn run(&self, origin: OrgMove) -> TransferWorkflow {
        let mut workflow = TransferWorkflow::new(origin);
        self.drive(&mut workflow).await;
        debug_assert!(workflow.state().is_terminal());
        workflow
    }

    async fn drive(&self, wf: &mut TransferWorkflow) {
        let source_org = wf.origin.source_org.clone();
        let dest_org = wf.origin.dest_org.clone();

        wf.advance(TransferState::RemoteResolving);
        let dest = wf.origin.to.clone();
        let read = self.with_copies(move |copies| copies.remote_url(&dest)).await;
        let slug = match read {
            Ok(url) => match parse_remote_url(&url) {
                Some(slug) => slug,
                None => {
                    return self.fail(
                        wf,
                        FailureReason::CannotResolveRemote(format!(
                            "not a GitHub remote URL: {url}"
                        )),
                    )
                }
            },
            Err(message) => return self.fail(wf, FailureReason::CannotResolveRemote(message)),
        };
        let repo = slug.repo.clone();
        wf.repo = Some(repo.clone());

        if slug.owner != source_org {
            let reason = FailureReason::OwnershipMismatch {
                recorded_owner: slug.owner.clone(),
                source_org: source_org.clone(),
            };
            self.reporter.warning(&format!(
                "Repo {repo} remote shows owner as {}, but was moved from {source_org}. Skipping transfer.",
                slug.owner
            ));
            wf.advance(TransferState::Failed(reason));
            return;
        }
        wf.advance(TransferState::OwnershipVerified);
        self.reporter.info(&format!(
            "Detected move: {source_org}/{repo} -> {dest_org}/{repo}"
        ));

        wf.advance(TransferState::TransferRequested);
        match self
            .host
            .request_transfer(&source_org, &repo, &dest_org)
            .await
        {
            Ok(()) => {
                self.reporter.success(&format!(
                    "Transfer initiated: {source_org}/{repo} -> {dest_org}/{repo}"
                ));
            }
            Err(TransferRequestError::AlreadyPending { .. }) => {
                self.reporter
                    .info(&format!("Transfer already pending for {source_org}/{repo}"));
            }
            Err(TransferRequestError::Cooldown { .. }) => {
                self.reporter.warning(&format!(
                    "Transfer cooldown active for {source_org}/{repo}. Try again later."
                ));
                wf.advance(TransferState::TransferRejected(Rejection::Cooldown));
                return;
            }
            Err(e) => return self.fail(wf, FailureReason::TransferRequest(e.to_string())),
        }

        wf.advance(TransferState::TransferPolling);
        if !self.await_confirmation(&dest_org, &repo).await {
            self.reporter.warning(&format!(
                "Transfer of {source_org}/{repo} not confirmed within {}s. It may still be processing; remote URL not updated - do this manually if needed.",
                self.policy.timeout.as_secs()
            ));
            wf.advance(TransferState::TransferTimedOut);
            return;
        }
        wf.advance(TransferState::TransferConfirmed);
        self.reporter
            .success(&format!("Transfer complete: {dest_org}/{repo}"));

        if self.policy.auto_update_remotes {
            let url = build_clone_url(&dest_org, &repo, self.policy.clone_protocol);
            let (dest, new_url) = (wf.origin.to.clone(), url.clone());
            let write = self
                .with_copies(move |copies| copies.set_remote_url(&dest, &new_url))
                .await;
            match write {
                Ok(()) => {
                    self.reporter
                        .success(&format!("Updated remote URL to {url}"));
                    wf.new_remote_url = Some(url);
                }
                Err(message) => {
                    tracing::warn!(repo = %repo, error = %message, "remote URL rewrite failed");
                    self.reporter
                        .warning("Could not update remote URL automatically");
                }
            }
        }
        wf.advance(TransferState::RemoteUrlUpdated);

        let _ = self.completed.send(TransferCompleted {
            source_org,
            dest_org,
            repo,
        });
    }

    /// Poll until the repository is visible under `owner` or the timeout
    /// elapses. Lookup errors count as "not yet".
    async fn await_confirmation(&self, owner: &OrgName, repo: &RepoName) -> bool {
        let deadline = Instant::now() + self.policy.timeout;
        self.reporter
            .info(&format!("Waiting for transfer to complete: {owner}/{repo}"));
        while Instant::now() < deadline {
            match self.host.lookup_repository(owner, repo).await {
                Ok(Lookup::Found) => return true,
                Ok(Lookup::NotFound) => {}
                Err(e) => tracing::debug!(error = %e, "confirmation lookup failed"),
            }
            tokio::time::sleep(self.policy.poll_interval).await;
        }
        false
    }

    /// Run a git working-copy call on the blocking pool.
    async fn with_copies<T, F>(&self, call: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&dyn WorkingCopies) -> Result<T, RemoteUrlError> + Send + 'static,
    {
        let copies = Arc::clone(&self.copies);
        match tokio::task::spawn_blocking(move || call(copies.as_ref())).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(err) => Err(format!("git task failed: {err}")),
        }
    }

    fn fail(&self, wf: &mut TransferWorkflow, reason: FailureReason) {
        self.reporter.error(&format!(
            "Transfer of {} from {} to {} failed: {reason}",
            wf.origin.to.display(),
            wf.origin.source_org,
            wf.origin.dest_org
        ));
        wf.advance(TransferState::Failed(reason));
    }
}
