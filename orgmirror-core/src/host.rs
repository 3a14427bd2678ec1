//! Collaborator interfaces consumed by the sync coordinator and the watcher.
//!
//! The concrete `gh` / git implementations live in `orgmirror-github`; tests
//! substitute in-memory fakes.

use std::path::Path;

use async_trait::async_trait;

use crate::error::{CloneError, LookupError, RemoteListError, RemoteUrlError, TransferRequestError};
use crate::types::{CloneProtocol, OrgName, RepoName, RepositoryDescriptor};

/// Result of looking a repository up on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Found,
    NotFound,
}

/// Successful outcomes of a clone request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneOutcome {
    Cloned,
    /// Destination already held a checkout; treated as success on re-runs.
    AlreadyExists,
}

/// Remote hosting service operations.
#[async_trait]
pub trait RemoteHost: Send + Sync {
    /// Every repository owned by `org`.
    async fn list_repositories(
        &self,
        org: &OrgName,
    ) -> Result<Vec<RepositoryDescriptor>, RemoteListError>;

    /// Ask the host to move `owner/repo` to `new_owner`.
    async fn request_transfer(
        &self,
        owner: &OrgName,
        repo: &RepoName,
        new_owner: &OrgName,
    ) -> Result<(), TransferRequestError>;

    /// Whether `owner/repo` is currently visible.
    async fn lookup_repository(&self, owner: &OrgName, repo: &RepoName)
        -> Result<Lookup, LookupError>;
}

/// Local working copy operations.
#[async_trait]
pub trait WorkingCopies: Send + Sync {
    async fn clone_repository(
        &self,
        owner: &OrgName,
        repo: &RepoName,
        dest: &Path,
        protocol: CloneProtocol,
    ) -> Result<CloneOutcome, CloneError>;

    /// URL of the `origin` remote of the working copy at `path`.
    fn remote_url(&self, path: &Path) -> Result<String, RemoteUrlError>;

    /// Point the `origin` remote of the working copy at `path` to `url`.
    fn set_remote_url(&self, path: &Path, url: &str) -> Result<(), RemoteUrlError>;
}
