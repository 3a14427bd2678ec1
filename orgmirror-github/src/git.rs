//! [`WorkingCopies`] backed by git.
//!
//! Remote URLs are read and written through `git2` on the `origin` remote.
//! Cloning runs `git clone` so the user's credential helpers and SSH agent
//! apply unchanged.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use git2::{ErrorCode, Repository};

use orgmirror_core::types::{CloneProtocol, OrgName, RepoName};
use orgmirror_core::{build_clone_url, CloneError, CloneOutcome, RemoteUrlError, WorkingCopies};

const ORIGIN: &str = "origin";

#[derive(Debug, Clone)]
pub struct LocalGit {
    program: String,
}

impl Default for LocalGit {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl LocalGit {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkingCopies for LocalGit {
    async fn clone_repository(
        &self,
        owner: &OrgName,
        repo: &RepoName,
        dest: &Path,
        protocol: CloneProtocol,
    ) -> Result<CloneOutcome, CloneError> {
        let clone_err = |message: String| CloneError {
            owner: owner.clone(),
            repo: repo.clone(),
            dest: dest.to_path_buf(),
            message,
        };

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| clone_err(e.to_string()))?;
        }

        let url = build_clone_url(owner, repo, protocol);
        tracing::debug!(url = %url, dest = %dest.display(), "cloning");
        let output = tokio::process::Command::new(&self.program)
            .arg("clone")
            .arg(&url)
            .arg(dest)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| clone_err(format!("failed to run {}: {e}", self.program)))?;

        if output.status.success() {
            return Ok(CloneOutcome::Cloned);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_already_exists(&stderr) {
            return Ok(CloneOutcome::AlreadyExists);
        }
        Err(clone_err(stderr.trim().to_string()))
    }

    fn remote_url(&self, path: &Path) -> Result<String, RemoteUrlError> {
        let repository = open(path)?;
        let remote = find_origin(&repository, path)?;
        remote
            .url()
            .map(str::to_string)
            .ok_or_else(|| RemoteUrlError::Git {
                path: path.to_path_buf(),
                message: "origin URL is not valid UTF-8".to_string(),
            })
    }

    fn set_remote_url(&self, path: &Path, url: &str) -> Result<(), RemoteUrlError> {
        let repository = open(path)?;
        find_origin(&repository, path)?;
        repository
            .remote_set_url(ORIGIN, url)
            .map_err(|e| git_err(path, e))?;
        tracing::info!(path = %path.display(), url, "origin updated");
        Ok(())
    }
}

/// `git clone` stderr for a destination that is already populated.
pub fn is_already_exists(stderr: &str) -> bool {
    stderr.contains("already exists")
}

fn open(path: &Path) -> Result<Repository, RemoteUrlError> {
    Repository::open(path).map_err(|e| match e.code() {
        ErrorCode::NotFound => RemoteUrlError::NotAGitFolder {
            path: path.to_path_buf(),
        },
        _ => git_err(path, e),
    })
}

fn find_origin<'r>(
    repository: &'r Repository,
    path: &Path,
) -> Result<git2::Remote<'r>, RemoteUrlError> {
    repository.find_remote(ORIGIN).map_err(|e| match e.code() {
        ErrorCode::NotFound | ErrorCode::InvalidSpec => RemoteUrlError::NoOrigin {
            path: path.to_path_buf(),
        },
        _ => git_err(path, e),
    })
}

fn git_err(path: &Path, e: git2::Error) -> RemoteUrlError {
    RemoteUrlError::Git {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    }
}
