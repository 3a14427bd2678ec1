//! [`RemoteHost`] backed by the GitHub CLI.
//!
//! Every call shells out to `gh`, which owns authentication. Outcomes that
//! `gh` only reports on stderr (pending transfer, cooldown, unknown
//! repository) are recognized by the classifier functions below.

use std::process::{Output, Stdio};

use async_trait::async_trait;
use serde::Deserialize;

use orgmirror_core::types::{OrgName, RepoName, RepositoryDescriptor};
use orgmirror_core::{
    Lookup, LookupError, RemoteHost, RemoteListError, TransferRequestError,
};

use crate::error::GhError;

const DEFAULT_PROGRAM: &str = "gh";
const DEFAULT_LIST_LIMIT: u32 = 500;
const LIST_FIELDS: &str = "name,owner,nameWithOwner,url,sshUrl,isPrivate,isArchived,defaultBranchRef";
const FALLBACK_BRANCH: &str = "main";

/// `gh` invoker.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: String,
    list_limit: u32,
}

impl Default for GhCli {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl GhCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different executable, e.g. an absolute path to `gh`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// `gh auth status` succeeded.
    pub async fn auth_status(&self) -> Result<bool, GhError> {
        let output = self.run(&["auth", "status"]).await?;
        Ok(output.status.success())
    }

    async fn run(&self, args: &[&str]) -> Result<Output, GhError> {
        tracing::debug!(program = %self.program, ?args, "running");
        tokio::process::Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| GhError::Spawn {
                program: self.program.clone(),
                source,
            })
    }

    async fn run_checked(&self, args: &[&str]) -> Result<Output, GhError> {
        let output = self.run(args).await?;
        if !output.status.success() {
            return Err(GhError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: stderr_of(&output),
            });
        }
        Ok(output)
    }
}

#[async_trait]
impl RemoteHost for GhCli {
    async fn list_repositories(
        &self,
        org: &OrgName,
    ) -> Result<Vec<RepositoryDescriptor>, RemoteListError> {
        let limit = self.list_limit.to_string();
        let list_err = |message: String| RemoteListError {
            org: org.clone(),
            message,
        };

        let output = self
            .run_checked(&["repo", "list", org.as_str(), "--limit", &limit, "--json", LIST_FIELDS])
            .await
            .map_err(|e| list_err(e.to_string()))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_repo_list(&stdout).map_err(|e| list_err(GhError::from(e).to_string()))
    }

    async fn request_transfer(
        &self,
        owner: &OrgName,
        repo: &RepoName,
        new_owner: &OrgName,
    ) -> Result<(), TransferRequestError> {
        let endpoint = format!("/repos/{owner}/{repo}/transfer");
        let field = format!("new_owner={new_owner}");
        let output = self
            .run(&["api", &endpoint, "-X", "POST", "-f", &field])
            .await
            .map_err(|e| TransferRequestError::Failed {
                owner: owner.clone(),
                repo: repo.clone(),
                message: e.to_string(),
            })?;

        if output.status.success() {
            tracing::info!(repo = %repo, from = %owner, to = %new_owner, "transfer requested");
            return Ok(());
        }
        Err(classify_transfer_failure(&stderr_of(&output), owner, repo))
    }

    async fn lookup_repository(
        &self,
        owner: &OrgName,
        repo: &RepoName,
    ) -> Result<Lookup, LookupError> {
        let slug = format!("{owner}/{repo}");
        let output = self
            .run(&["repo", "view", &slug, "--json", "name"])
            .await
            .map_err(|e| LookupError {
                owner: owner.clone(),
                repo: repo.clone(),
                message: e.to_string(),
            })?;

        if output.status.success() {
            return Ok(Lookup::Found);
        }
        let stderr = stderr_of(&output);
        if is_not_found(&stderr) {
            return Ok(Lookup::NotFound);
        }
        Err(LookupError {
            owner: owner.clone(),
            repo: repo.clone(),
            message: stderr,
        })
    }
}

// ---------------------------------------------------------------------------
// Output parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhRepo {
    name: String,
    owner: GhOwner,
    name_with_owner: String,
    url: String,
    ssh_url: String,
    #[serde(default)]
    is_private: bool,
    #[serde(default)]
    is_archived: bool,
    default_branch_ref: Option<GhBranchRef>,
}

#[derive(Debug, Deserialize)]
struct GhOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GhBranchRef {
    name: String,
}

impl From<GhRepo> for RepositoryDescriptor {
    fn from(repo: GhRepo) -> Self {
        let default_branch = repo
            .default_branch_ref
            .map(|b| b.name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| FALLBACK_BRANCH.to_string());
        RepositoryDescriptor {
            name: RepoName::from(repo.name),
            owner: OrgName::from(repo.owner.login),
            full_name: repo.name_with_owner,
            clone_url: format!("{}.git", repo.url),
            ssh_url: repo.ssh_url,
            is_private: repo.is_private,
            is_archived: repo.is_archived,
            default_branch,
        }
    }
}

/// Parse `gh repo list --json ...` output.
pub fn parse_repo_list(json: &str) -> Result<Vec<RepositoryDescriptor>, serde_json::Error> {
    let repos: Vec<GhRepo> = serde_json::from_str(json)?;
    Ok(repos.into_iter().map(RepositoryDescriptor::from).collect())
}

/// Map a failed transfer request's stderr to its outcome.
pub fn classify_transfer_failure(
    stderr: &str,
    owner: &OrgName,
    repo: &RepoName,
) -> TransferRequestError {
    let lower = stderr.to_ascii_lowercase();
    let (owner, repo) = (owner.clone(), repo.clone());
    if lower.contains("transfer is already pending") {
        TransferRequestError::AlreadyPending { owner, repo }
    } else if lower.contains("must wait") || lower.contains("cooldown") {
        TransferRequestError::Cooldown { owner, repo }
    } else {
        TransferRequestError::Failed {
            owner,
            repo,
            message: stderr.trim().to_string(),
        }
    }
}

/// `gh repo view` stderr for a repository that is not (yet) visible.
pub fn is_not_found(stderr: &str) -> bool {
    let lower = stderr.to_ascii_lowercase();
    lower.contains("could not resolve") || lower.contains("not found")
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}
