//! Clone URL construction and `origin` URL parsing for github.com remotes.

use std::fmt;

use crate::types::{CloneProtocol, OrgName, RepoName};

const SSH_PREFIX: &str = "git@github.com:";
const HOST_SEGMENT: &str = "github.com/";

/// Owner and repository recovered from a remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSlug {
    pub owner: OrgName,
    pub repo: RepoName,
}

impl fmt::Display for RemoteSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Build the clone URL for `owner/repo` in the given protocol.
pub fn build_clone_url(owner: &OrgName, repo: &RepoName, protocol: CloneProtocol) -> String {
    match protocol {
        CloneProtocol::Ssh => format!("{SSH_PREFIX}{owner}/{repo}.git"),
        CloneProtocol::Https => format!("https://{HOST_SEGMENT}{owner}/{repo}.git"),
    }
}

/// Parse a github.com remote URL into its owner and repository.
///
/// Accepts `git@github.com:owner/repo(.git)` and any URL containing
/// `github.com/owner/repo(.git)`; trailing path segments after the repository
/// are ignored for the latter form.
pub fn parse_remote_url(url: &str) -> Option<RemoteSlug> {
    let url = url.trim();

    if let Some(path) = url.strip_prefix(SSH_PREFIX) {
        let path = path.strip_suffix(".git").unwrap_or(path);
        let parts: Vec<&str> = path.split('/').collect();
        if let [owner, repo] = parts.as_slice() {
            return slug(owner, repo);
        }
    }

    let (_, path) = url.split_once(HOST_SEGMENT)?;
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut parts = path.split('/');
    let owner = parts.next()?;
    let repo = parts.next()?;
    slug(owner, repo)
}

fn slug(owner: &str, repo: &str) -> Option<RemoteSlug> {
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some(RemoteSlug {
        owner: OrgName::from(owner),
        repo: RepoName::from(repo),
    })
}
