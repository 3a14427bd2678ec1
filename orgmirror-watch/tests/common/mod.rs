//! In-memory collaborators for watch-mode tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

use async_trait::async_trait;
use orgmirror_core::{
    error::{CloneError, LookupError, RemoteListError, RemoteUrlError, TransferRequestError},
    types::{CloneProtocol, OrgName, RepoName, RepositoryDescriptor},
    CloneOutcome, Lookup, RecordingReporter, RemoteHost, WorkingCopies,
};
use orgmirror_watch::{OrgMove, TransferOrchestrator, TransferPolicy};

/// How the fake host answers a transfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferAnswer {
    Accepted,
    AlreadyPending,
    Cooldown,
    Broken,
}

pub struct FakeHost {
    pub answer: TransferAnswer,
    /// Lookups return `Found` from this attempt on (1-based); `None` never.
    pub visible_after: Option<usize>,
    pub transfer_requests: Mutex<Vec<(String, String, String)>>,
    pub lookups: AtomicUsize,
}

impl FakeHost {
    pub fn new(answer: TransferAnswer, visible_after: Option<usize>) -> Self {
        Self {
            answer,
            visible_after,
            transfer_requests: Mutex::new(Vec::new()),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> Vec<(String, String, String)> {
        self.transfer_requests.lock().expect("lock").clone()
    }
}

#[async_trait]
impl RemoteHost for FakeHost {
    async fn list_repositories(
        &self,
        _org: &OrgName,
    ) -> Result<Vec<RepositoryDescriptor>, RemoteListError> {
        Ok(Vec::new())
    }

    async fn request_transfer(
        &self,
        owner: &OrgName,
        repo: &RepoName,
        new_owner: &OrgName,
    ) -> Result<(), TransferRequestError> {
        self.transfer_requests.lock().expect("lock").push((
            owner.to_string(),
            repo.to_string(),
            new_owner.to_string(),
        ));
        let (owner, repo) = (owner.clone(), repo.clone());
        match self.answer {
            TransferAnswer::Accepted => Ok(()),
            TransferAnswer::AlreadyPending => Err(TransferRequestError::AlreadyPending { owner, repo }),
            TransferAnswer::Cooldown => Err(TransferRequestError::Cooldown { owner, repo }),
            TransferAnswer::Broken => Err(TransferRequestError::Failed {
                owner,
                repo,
                message: "HTTP 403: Must have admin rights".to_string(),
            }),
        }
    }

    async fn lookup_repository(
        &self,
        _owner: &OrgName,
        _repo: &RepoName,
    ) -> Result<Lookup, LookupError> {
        let attempt = self.lookups.fetch_add(1, Ordering::SeqCst) + 1;
        match self.visible_after {
            Some(n) if attempt >= n => Ok(Lookup::Found),
            _ => Ok(Lookup::NotFound),
        }
    }
}

/// Remote URLs kept in memory, keyed by working copy path.
#[derive(Default)]
pub struct FakeCopies {
    pub remotes: Mutex<BTreeMap<PathBuf, String>>,
    pub fail_updates: bool,
    /// Thread of every `remote_url` / `set_remote_url` call.
    pub git_threads: Mutex<Vec<ThreadId>>,
}

impl FakeCopies {
    pub fn with_remote(path: &Path, url: &str) -> Self {
        let copies = Self::default();
        copies
            .remotes
            .lock()
            .expect("lock")
            .insert(path.to_path_buf(), url.to_string());
        copies
    }

    pub fn remote_for(&self, path: &Path) -> Option<String> {
        self.remotes.lock().expect("lock").get(path).cloned()
    }

    pub fn git_threads(&self) -> Vec<ThreadId> {
        self.git_threads.lock().expect("lock").clone()
    }

    fn note_thread(&self) {
        self.git_threads
            .lock()
            .expect("lock")
            .push(std::thread::current().id());
    }
}

#[async_trait]
impl WorkingCopies for FakeCopies {
    async fn clone_repository(
        &self,
        _owner: &OrgName,
        _repo: &RepoName,
        _dest: &Path,
        _protocol: CloneProtocol,
    ) -> Result<CloneOutcome, CloneError> {
        Ok(CloneOutcome::Cloned)
    }

    fn remote_url(&self, path: &Path) -> Result<String, RemoteUrlError> {
        self.note_thread();
        self.remote_for(path).ok_or_else(|| RemoteUrlError::NotAGitFolder {
            path: path.to_path_buf(),
        })
    }

    fn set_remote_url(&self, path: &Path, url: &str) -> Result<(), RemoteUrlError> {
        self.note_thread();
        if self.fail_updates {
            return Err(RemoteUrlError::Git {
                path: path.to_path_buf(),
                message: "could not lock config file".to_string(),
            });
        }
        self.remotes
            .lock()
            .expect("lock")
            .insert(path.to_path_buf(), url.to_string());
        Ok(())
    }
}

pub fn org_move(base: &Path, from_org: &str, to_org: &str, name: &str) -> OrgMove {
    OrgMove {
        source_org: OrgName::from(from_org),
        dest_org: OrgName::from(to_org),
        from: base.join(from_org).join(name),
        to: base.join(to_org).join(name),
    }
}

pub struct Harness {
    pub host: Arc<FakeHost>,
    pub copies: Arc<FakeCopies>,
    pub reporter: Arc<RecordingReporter>,
    pub orchestrator: Arc<TransferOrchestrator>,
}

pub fn harness(host: FakeHost, copies: FakeCopies, policy: TransferPolicy) -> Harness {
    let host = Arc::new(host);
    let copies = Arc::new(copies);
    let reporter = Arc::new(RecordingReporter::new());
    let orchestrator = Arc::new(TransferOrchestrator::new(
        host.clone(),
        copies.clone(),
        reporter.clone(),
        policy,
    ));
    Harness {
        host,
        copies,
        reporter,
        orchestrator,
    }
}
