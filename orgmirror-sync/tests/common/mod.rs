//! In-memory collaborators shared by the pipeline tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use orgmirror_core::{
    error::{CloneError, LookupError, RemoteListError, RemoteUrlError, TransferRequestError},
    types::{CloneProtocol, OrgName, RepoName, RepositoryDescriptor},
    CloneOutcome, Config, Lookup, RemoteHost, WorkingCopies,
};

pub fn descriptor(org: &str, name: &str) -> RepositoryDescriptor {
    RepositoryDescriptor {
        name: RepoName::from(name),
        owner: OrgName::from(org),
        full_name: format!("{org}/{name}"),
        clone_url: format!("https://github.com/{org}/{name}.git"),
        ssh_url: format!("git@github.com:{org}/{name}.git"),
        is_private: false,
        is_archived: false,
        default_branch: "main".to_string(),
    }
}

pub fn config_at(base: &Path, orgs: &[&str]) -> Config {
    Config {
        base_path: base.to_path_buf(),
        organizations: orgs.iter().map(|o| OrgName::from(*o)).collect(),
        ..Config::default()
    }
}

/// Create `<base>/<org>/<name>/.git`.
pub fn working_copy(base: &Path, org: &str, name: &str) -> PathBuf {
    let path = base.join(org).join(name);
    std::fs::create_dir_all(path.join(".git")).expect("create working copy");
    path
}

// ---------------------------------------------------------------------------
// Remote host
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeHost {
    pub listings: BTreeMap<OrgName, Vec<RepositoryDescriptor>>,
    pub failing: BTreeSet<OrgName>,
}

impl FakeHost {
    pub fn with_repos(entries: &[(&str, &str)]) -> Self {
        let mut host = Self::default();
        for (org, name) in entries {
            host.listings
                .entry(OrgName::from(*org))
                .or_default()
                .push(descriptor(org, name));
        }
        host
    }

    pub fn failing(mut self, org: &str) -> Self {
        self.failing.insert(OrgName::from(org));
        self
    }
}

#[async_trait]
impl RemoteHost for FakeHost {
    async fn list_repositories(
        &self,
        org: &OrgName,
    ) -> Result<Vec<RepositoryDescriptor>, RemoteListError> {
        if self.failing.contains(org) {
            return Err(RemoteListError {
                org: org.clone(),
                message: "HTTP 502".to_string(),
            });
        }
        Ok(self.listings.get(org).cloned().unwrap_or_default())
    }

    async fn request_transfer(
        &self,
        _owner: &OrgName,
        _repo: &RepoName,
        _new_owner: &OrgName,
    ) -> Result<(), TransferRequestError> {
        Ok(())
    }

    async fn lookup_repository(
        &self,
        _owner: &OrgName,
        _repo: &RepoName,
    ) -> Result<Lookup, LookupError> {
        Ok(Lookup::Found)
    }
}

// ---------------------------------------------------------------------------
// Working copies
// ---------------------------------------------------------------------------

/// Clones by creating `<dest>/.git`; remote URLs live in memory.
#[derive(Default)]
pub struct FakeCopies {
    pub clones: Mutex<Vec<(String, PathBuf, CloneProtocol)>>,
    pub remotes: Mutex<BTreeMap<PathBuf, String>>,
    pub failing_clones: BTreeSet<RepoName>,
    pub failing_remote_updates: bool,
}

impl FakeCopies {
    pub fn clones(&self) -> Vec<(String, PathBuf, CloneProtocol)> {
        self.clones.lock().expect("lock").clone()
    }

    pub fn remote_for(&self, path: &Path) -> Option<String> {
        self.remotes.lock().expect("lock").get(path).cloned()
    }
}

#[async_trait]
impl WorkingCopies for FakeCopies {
    async fn clone_repository(
        &self,
        owner: &OrgName,
        repo: &RepoName,
        dest: &Path,
        protocol: CloneProtocol,
    ) -> Result<CloneOutcome, CloneError> {
        if self.failing_clones.contains(repo) {
            return Err(CloneError {
                owner: owner.clone(),
                repo: repo.clone(),
                dest: dest.to_path_buf(),
                message: "Repository not found".to_string(),
            });
        }
        if dest.exists() {
            return Ok(CloneOutcome::AlreadyExists);
        }
        std::fs::create_dir_all(dest.join(".git")).expect("fake clone");
        self.clones
            .lock()
            .expect("lock")
            .push((format!("{owner}/{repo}"), dest.to_path_buf(), protocol));
        Ok(CloneOutcome::Cloned)
    }

    fn remote_url(&self, path: &Path) -> Result<String, RemoteUrlError> {
        self.remote_for(path).ok_or_else(|| RemoteUrlError::NoOrigin {
            path: path.to_path_buf(),
        })
    }

    fn set_remote_url(&self, path: &Path, url: &str) -> Result<(), RemoteUrlError> {
        if self.failing_remote_updates {
            return Err(RemoteUrlError::Git {
                path: path.to_path_buf(),
                message: "config file locked".to_string(),
            });
        }
        self.remotes
            .lock()
            .expect("lock")
            .insert(path.to_path_buf(), url.to_string());
        Ok(())
    }
}
