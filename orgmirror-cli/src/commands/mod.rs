pub mod config;
pub mod init;
pub mod status;
pub mod sync;
pub mod watch;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use colored::Colorize;

use orgmirror_core::{config as store, Config};
use orgmirror_github::GhCli;

/// Where the configuration lives and how to expand `~` for this run.
#[derive(Debug, Clone)]
pub struct Context {
    home: PathBuf,
    config_path: PathBuf,
}

impl Context {
    pub fn new(home: PathBuf, config_override: Option<PathBuf>) -> Self {
        let config_path = match config_override {
            Some(path) => store::expand_home(&path, &home),
            None => store::default_path_at(&home),
        };
        Self { home, config_path }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the configuration, failing when `init` has not been run yet.
    pub fn load_config(&self) -> Result<Config> {
        if !store::exists_at(&self.config_path) {
            bail!("No configuration found. Run 'orgmirror init' first.");
        }
        let config = store::load_from(&self.config_path, &self.home).with_context(|| {
            format!(
                "failed to load configuration from {}",
                self.config_path.display()
            )
        })?;
        for problem in config.validate() {
            println!("{}", format!("Config: {problem}").yellow());
        }
        Ok(config)
    }

    pub fn save_config(&self, config: &Config) -> Result<()> {
        store::save_to(&self.config_path, config).with_context(|| {
            format!(
                "failed to save configuration to {}",
                self.config_path.display()
            )
        })
    }
}

/// Fail unless `gh` is installed and logged in.
pub async fn ensure_authenticated(gh: &GhCli) -> Result<()> {
    match gh.auth_status().await {
        Ok(true) => Ok(()),
        Ok(false) => bail!("GitHub CLI is not authenticated. Run 'gh auth login' first."),
        Err(err) if err.is_not_installed() => {
            bail!("GitHub CLI (gh) is not installed. Install it from https://cli.github.com")
        }
        Err(err) => Err(err).context("failed to check GitHub CLI authentication"),
    }
}

/// Print the shared cloned/moved/orphaned/errors summary.
pub fn print_sync_summary(title: &str, result: &orgmirror_sync::SyncResult, with_moves: bool) {
    println!();
    println!("{}", title.bold());
    println!("  Cloned: {} repos", result.cloned.len());
    if with_moves {
        println!("  Moved: {} repos", result.moved.len());
        println!("  Orphaned: {} repos", result.orphaned.len());
    }
    if !result.errors.is_empty() {
        println!("{}", format!("  Errors: {}", result.errors.len()).red());
        for error in &result.errors {
            println!("{}", format!("    - {error}").red());
        }
    }
}
