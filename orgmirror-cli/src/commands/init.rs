//! `orgmirror init`: write a configuration and lay out the local tree.

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use clap::Args;
use colored::Colorize;

use orgmirror_core::config::expand_home;
use orgmirror_core::types::{CloneProtocol, OrgName};
use orgmirror_core::Config;
use orgmirror_github::{GhCli, LocalGit};
use orgmirror_sync::pipeline;

use super::{ensure_authenticated, print_sync_summary, Context};
use crate::console::ConsoleReporter;

/// Arguments for `orgmirror init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Folder that will hold one sub-folder per organization.
    #[arg(short = 'p', long, default_value = "~/Projects/orgs")]
    pub base_path: PathBuf,

    /// Organization to mirror (repeatable).
    #[arg(short, long = "org", value_name = "ORG")]
    pub orgs: Vec<String>,

    /// Clone protocol: ssh or https.
    #[arg(long, default_value = "ssh")]
    pub protocol: CloneProtocol,

    /// Create the folders but do not clone anything.
    #[arg(long)]
    pub skip_clone: bool,
}

impl InitArgs {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        if self.orgs.is_empty() {
            bail!("At least one organization must be specified with --org/-o");
        }

        let gh = GhCli::new();
        ensure_authenticated(&gh).await?;

        let config = Config {
            base_path: expand_home(&self.base_path, ctx.home()),
            organizations: self.orgs.into_iter().map(OrgName::from).collect(),
            clone_protocol: self.protocol,
            ..Config::default()
        };

        println!(
            "{}",
            format!(
                "Initializing with {} organization(s)",
                config.organizations.len()
            )
            .blue()
        );
        println!("{}", format!("Base path: {}", config.base_path.display()).blue());

        ctx.save_config(&config)?;
        println!(
            "{}",
            format!("Configuration saved to: {}", ctx.config_path().display()).green()
        );

        if self.skip_clone {
            for org in &config.organizations {
                let org_path = config.org_path(org);
                std::fs::create_dir_all(&org_path)
                    .with_context(|| format!("failed to create {}", org_path.display()))?;
                println!("{}", format!("Created: {}", org_path.display()).green());
            }
            return Ok(());
        }

        let result =
            pipeline::init_structure(&config, &gh, &LocalGit::new(), &ConsoleReporter).await?;
        print_sync_summary("Initialization Complete", &result, false);
        Ok(())
    }
}
