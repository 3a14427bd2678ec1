//! orgmirror: keep local organization folders and GitHub organizations in step.
//!
//! # Usage
//!
//! ```text
//! orgmirror [--config PATH] init --org <name>... [--base-path P] [--protocol ssh|https] [--skip-clone]
//! orgmirror [--config PATH] sync [--no-clone] [--no-move] [--dry-run]
//! orgmirror [--config PATH] status [--verbose] [--json]
//! orgmirror [--config PATH] watch
//! orgmirror [--config PATH] config [--show] [--add-org O] [--remove-org O]
//! ```

mod commands;
mod console;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

use commands::{
    config::ConfigArgs, init::InitArgs, status::StatusArgs, sync::SyncArgs, watch::WatchArgs,
    Context,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "orgmirror",
    version,
    about = "Two-way sync between local folders and GitHub organizations",
    long_about = None,
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a configuration, create organization folders and clone everything.
    Init(InitArgs),

    /// Move misplaced repositories and clone missing ones.
    Sync(SyncArgs),

    /// Compare local folders with GitHub without changing anything.
    Status(StatusArgs),

    /// Turn folder moves between organizations into GitHub transfers.
    Watch(WatchArgs),

    /// View or modify the configuration.
    Config(ConfigArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let home = dirs::home_dir().context("could not determine home directory")?;
    let ctx = Context::new(home, cli.config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(async {
        match cli.command {
            Commands::Init(args) => args.run(&ctx).await,
            Commands::Sync(args) => args.run(&ctx).await,
            Commands::Status(args) => args.run(&ctx).await,
            Commands::Watch(args) => args.run(&ctx).await,
            Commands::Config(args) => args.run(&ctx),
        }
    })
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
