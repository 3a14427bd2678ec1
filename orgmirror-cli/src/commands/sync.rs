//! `orgmirror sync`: one reconciliation pass.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use orgmirror_github::{GhCli, LocalGit};
use orgmirror_sync::{pipeline, SyncOptions};

use super::{ensure_authenticated, print_sync_summary, Context};
use crate::console::ConsoleReporter;

/// Arguments for `orgmirror sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Do not clone repositories missing locally.
    #[arg(long)]
    pub no_clone: bool,

    /// Do not relocate misplaced repositories.
    #[arg(long = "no-move")]
    pub no_move: bool,

    /// Show what would change without touching anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    fn options(&self) -> SyncOptions {
        SyncOptions {
            dry_run: self.dry_run,
            clone_missing: !self.no_clone,
            move_misplaced: !self.no_move,
        }
    }

    pub async fn run(self, ctx: &Context) -> Result<()> {
        let config = ctx.load_config()?;
        let gh = GhCli::new();
        ensure_authenticated(&gh).await?;

        if self.dry_run {
            println!("{}", "DRY RUN - no changes will be made".yellow());
        }

        let result = pipeline::sync(
            &config,
            &gh,
            &LocalGit::new(),
            &ConsoleReporter,
            self.options(),
        )
        .await?;
        print_sync_summary("Sync Complete", &result, true);
        Ok(())
    }
}
