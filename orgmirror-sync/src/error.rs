//! Error types for orgmirror-sync.

use std::path::PathBuf;

use thiserror::Error;

use orgmirror_core::error::{CloneError, ConfigError, RemoteUrlError};
use orgmirror_core::types::{OrgName, RepoName};

/// Errors that abort a whole pipeline run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Per-repository failure collected during apply. Never aborts the batch.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// The target folder is already taken; relocation never overwrites.
    #[error("cannot move {name} from {from_org} to {to_org}: {} already exists", .dest.display())]
    DestinationExists {
        name: RepoName,
        from_org: OrgName,
        to_org: OrgName,
        dest: PathBuf,
    },

    #[error("failed to move {name} from {from_org} to {to_org}: {source}")]
    Relocation {
        name: RepoName,
        from_org: OrgName,
        to_org: OrgName,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Clone(#[from] CloneError),

    /// Moved on disk, but `origin` still points at the old owner.
    #[error("moved {name} but could not update its remote URL: {source}")]
    RemoteUrl {
        name: RepoName,
        #[source]
        source: RemoteUrlError,
    },

    #[error("failed to create organization folder {}: {source}", .path.display())]
    OrgFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApplyError {
    /// Repository the failure belongs to, if any.
    pub fn repo(&self) -> Option<&RepoName> {
        match self {
            ApplyError::DestinationExists { name, .. }
            | ApplyError::Relocation { name, .. }
            | ApplyError::RemoteUrl { name, .. } => Some(name),
            ApplyError::Clone(e) => Some(&e.repo),
            ApplyError::OrgFolder { .. } => None,
        }
    }
}
