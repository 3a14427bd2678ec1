//! Domain types shared by the reconciliation engine, sync coordinator and watcher.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Names are compared exactly, without case folding or normalization.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Login of an organization (or user) on the hosting service, which is also
/// the name of its top-level folder under the base path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgName(pub String);

impl fmt::Display for OrgName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for OrgName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrgName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Borrow<str> for OrgName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl OrgName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Name of a repository within its owning organization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoName(pub String);

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepoName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepoName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Borrow<str> for RepoName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl RepoName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Transport used for clone URLs and rewritten `origin` remotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CloneProtocol {
    #[default]
    Ssh,
    Https,
}

impl fmt::Display for CloneProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloneProtocol::Ssh => write!(f, "ssh"),
            CloneProtocol::Https => write!(f, "https"),
        }
    }
}

impl FromStr for CloneProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ssh" => Ok(Self::Ssh),
            "https" => Ok(Self::Https),
            other => Err(format!(
                "unknown clone protocol '{other}'; expected: ssh, https"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Remote-observed facts about one repository, fetched once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub name: RepoName,
    /// Login of the owning organization.
    pub owner: OrgName,
    /// `owner/name` as reported by the host.
    pub full_name: String,
    pub clone_url: String,
    pub ssh_url: String,
    pub is_private: bool,
    pub is_archived: bool,
    pub default_branch: String,
}

/// A repository folder found directly under an organization folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRepositoryEntry {
    pub name: RepoName,
    /// Organization folder the repository currently lives under.
    pub org: OrgName,
    /// Absolute path to the working copy.
    pub path: PathBuf,
}

impl LocalRepositoryEntry {
    pub fn new(org: impl Into<OrgName>, name: impl Into<RepoName>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            org: org.into(),
            path: path.into(),
        }
    }

    pub fn is_git_working_copy(&self) -> bool {
        is_git_working_copy(&self.path)
    }
}

/// `true` when `path` holds a `.git` metadata directory.
pub fn is_git_working_copy(path: &Path) -> bool {
    path.join(".git").is_dir()
}

/// Per-organization map of repository name to `V`.
///
/// Ordered maps keep every listing derived from a snapshot stable: by
/// organization first, then by repository name.
pub type OrgMap<V> = BTreeMap<OrgName, BTreeMap<RepoName, V>>;

/// Local layout: organization → repository → working copy entry.
pub type LocalLayout = OrgMap<LocalRepositoryEntry>;

/// Remote layout: organization → repository → descriptor.
pub type RemoteLayout = OrgMap<RepositoryDescriptor>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
