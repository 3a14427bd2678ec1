//! Error types for orgmirror-core.
//!
//! [`ConfigError`] covers the configuration file. The remaining types are the
//! failure vocabulary of the collaborator traits in [`crate::host`].

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{OrgName, RepoName};

/// All errors that can arise from loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, annotated with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the file path and serde_yaml line context.
    #[error("failed to parse configuration at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}

/// Listing an organization's repositories failed (transport or auth).
#[derive(Debug, Clone, Error)]
#[error("failed to list repositories for {org}: {message}")]
pub struct RemoteListError {
    pub org: OrgName,
    pub message: String,
}

/// Outcomes of a transfer request other than plain success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferRequestError {
    /// The host refuses another transfer of this repository for now.
    #[error("transfer cooldown active for {owner}/{repo}")]
    Cooldown { owner: OrgName, repo: RepoName },

    /// A transfer to the requested owner was already initiated. Callers treat
    /// this as success.
    #[error("transfer already pending for {owner}/{repo}")]
    AlreadyPending { owner: OrgName, repo: RepoName },

    #[error("failed to transfer {owner}/{repo}: {message}")]
    Failed {
        owner: OrgName,
        repo: RepoName,
        message: String,
    },
}

/// Looking a repository up failed for a reason other than "not found".
#[derive(Debug, Clone, Error)]
#[error("lookup of {owner}/{repo} failed: {message}")]
pub struct LookupError {
    pub owner: OrgName,
    pub repo: RepoName,
    pub message: String,
}

/// A clone failed for a reason other than "destination already exists".
#[derive(Debug, Clone, Error)]
#[error("failed to clone {owner}/{repo} into {}: {message}", .dest.display())]
pub struct CloneError {
    pub owner: OrgName,
    pub repo: RepoName,
    pub dest: PathBuf,
    pub message: String,
}

/// Reading or rewriting a working copy's `origin` URL failed.
#[derive(Debug, Clone, Error)]
pub enum RemoteUrlError {
    #[error("not a git working copy: {}", .path.display())]
    NotAGitFolder { path: PathBuf },

    #[error("no origin remote in {}", .path.display())]
    NoOrigin { path: PathBuf },

    #[error("git error in {}: {message}", .path.display())]
    Git { path: PathBuf, message: String },
}
