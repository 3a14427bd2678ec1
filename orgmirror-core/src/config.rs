//! YAML configuration file.
//!
//! # Storage layout
//!
//! ```text
//! ~/.config/github-org-mirror/
//!   config.yaml          (written atomically via config.yaml.tmp)
//! ```
//!
//! # API pattern
//!
//! Path-taking functions (`load_from`, `save_to`, `exists_at`) are the real
//! implementations; `default_path_at(home)` resolves the standard location
//! for an explicit home and `default_path()` derives home from
//! `dirs::home_dir()`. Tests never touch the real home directory.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::types::{CloneProtocol, OrgName, RepoName};

pub const CONFIG_DIR: &str = "github-org-mirror";
pub const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_BASE_PATH: &str = "~/Projects/orgs";
const DEFAULT_SYNC_INTERVAL: u64 = 300;
const DEFAULT_TRANSFER_TIMEOUT: u64 = 120;
const MIN_SYNC_INTERVAL: u64 = 60;

// ---------------------------------------------------------------------------
// 1. Layout
// ---------------------------------------------------------------------------

/// Persisted settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root folder holding one sub-folder per organization.
    pub base_path: PathBuf,
    pub organizations: Vec<OrgName>,
    /// Seconds between periodic syncs.
    pub sync_interval: u64,
    /// Repository names never required locally.
    pub exclude_repos: Vec<RepoName>,
    /// Rewrite `origin` after relocations and confirmed transfers.
    pub auto_update_remotes: bool,
    pub clone_protocol: CloneProtocol,
    /// Seconds the watcher waits for a transfer to become visible.
    pub transfer_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from(DEFAULT_BASE_PATH),
            organizations: Vec::new(),
            sync_interval: DEFAULT_SYNC_INTERVAL,
            exclude_repos: vec![RepoName::from(".github")],
            auto_update_remotes: true,
            clone_protocol: CloneProtocol::Ssh,
            transfer_timeout: DEFAULT_TRANSFER_TIMEOUT,
        }
    }
}

impl Config {
    /// `<base_path>/<org>`. Pure, no I/O.
    pub fn org_path(&self, org: &OrgName) -> PathBuf {
        self.base_path.join(&org.0)
    }

    /// `<base_path>/<org>/<repo>`. Pure, no I/O.
    pub fn repo_path(&self, org: &OrgName, repo: &RepoName) -> PathBuf {
        self.org_path(org).join(&repo.0)
    }

    pub fn exclusions(&self) -> BTreeSet<RepoName> {
        self.exclude_repos.iter().cloned().collect()
    }

    /// Human-readable problems; empty when the configuration is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.organizations.is_empty() {
            errors.push("No organizations configured".to_string());
        }
        if self.sync_interval < MIN_SYNC_INTERVAL {
            errors.push(format!(
                "Sync interval should be at least {MIN_SYNC_INTERVAL} seconds"
            ));
        }
        if self.transfer_timeout == 0 {
            errors.push("Transfer timeout must be greater than zero".to_string());
        }
        errors
    }

    /// Returns `false` when `org` was already configured.
    pub fn add_organization(&mut self, org: OrgName) -> bool {
        if self.organizations.contains(&org) {
            return false;
        }
        self.organizations.push(org);
        true
    }

    /// Returns `false` when `org` was not configured.
    pub fn remove_organization(&mut self, org: &OrgName) -> bool {
        let before = self.organizations.len();
        self.organizations.retain(|o| o != org);
        self.organizations.len() != before
    }

    /// Replace a leading `~` in `base_path` with `home`.
    pub fn expand_base_path(&mut self, home: &Path) {
        self.base_path = expand_home(&self.base_path, home);
    }
}

/// Replace a leading `~` component with `home`; other paths are returned as-is.
pub fn expand_home(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// 2. Paths
// ---------------------------------------------------------------------------

/// `<home>/.config/github-org-mirror/config.yaml`. Pure, no I/O.
pub fn default_path_at(home: &Path) -> PathBuf {
    home.join(".config").join(CONFIG_DIR).join(CONFIG_FILE)
}

/// `default_path_at` convenience wrapper.
pub fn default_path() -> Result<PathBuf, ConfigError> {
    Ok(default_path_at(&home()?))
}

pub fn exists_at(path: &Path) -> bool {
    path.is_file()
}

// ---------------------------------------------------------------------------
// 3. Load / save
// ---------------------------------------------------------------------------

/// Load the configuration at `path`, expanding `~` against `home`.
///
/// A missing file yields [`Config::default`]; malformed YAML yields
/// [`ConfigError::Parse`] with the file path.
pub fn load_from(path: &Path, home: &Path) -> Result<Config, ConfigError> {
    let mut config = if path.exists() {
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        if contents.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?
        }
    } else {
        Config::default()
    };
    config.expand_base_path(home);
    Ok(config)
}

/// `load_from` convenience wrapper using `dirs::home_dir()`.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    load_from(path, &home()?)
}

/// Atomically save `config` to `path`.
///
/// Write flow: serialize → `<name>.tmp` sibling → `rename`. Parent
/// directories are created as needed.
pub fn save_to(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| CONFIG_FILE.to_string());
    let tmp_path = path.with_file_name(format!("{file_name}.tmp"));

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(io_err(path, e));
    }
    tracing::debug!(path = %path.display(), "configuration saved");
    Ok(())
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
