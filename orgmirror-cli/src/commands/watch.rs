//! `orgmirror watch`: turn folder moves into GitHub transfers until ctrl-c.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use tokio::sync::broadcast;

use orgmirror_core::Reporter;
use orgmirror_github::{GhCli, LocalGit};
use orgmirror_watch::{ShutdownPolicy, TransferOrchestrator, TransferPolicy};

use super::{ensure_authenticated, Context};
use crate::console::ConsoleReporter;

/// Arguments for `orgmirror watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds to let in-flight transfers finish after ctrl-c.
    #[arg(long, default_value_t = 10)]
    pub grace: u64,
}

impl WatchArgs {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let config = ctx.load_config()?;
        let gh = GhCli::new();
        ensure_authenticated(&gh).await?;

        println!("{}", "Starting file watcher...".blue());
        println!("Move repos between org folders to trigger GitHub transfers.");
        println!("Press Ctrl+C to stop.");
        println!();

        let reporter: Arc<dyn Reporter> = Arc::new(ConsoleReporter);
        let orchestrator = Arc::new(TransferOrchestrator::new(
            Arc::new(gh),
            Arc::new(LocalGit::new()),
            Arc::clone(&reporter),
            TransferPolicy::from_config(&config),
        ));

        let mut completed = orchestrator.subscribe();
        let printer = tokio::spawn(async move {
            loop {
                match completed.recv().await {
                    Ok(done) => println!(
                        "{}",
                        format!(
                            "Transferred: {}/{} -> {}/{}",
                            done.source_org, done.repo, done.dest_org, done.repo
                        )
                        .green()
                    ),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "transfer notifications dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let (shutdown, _) = broadcast::channel::<()>(4);
        let policy = ShutdownPolicy {
            grace: std::time::Duration::from_secs(self.grace),
        };
        let summary = orgmirror_watch::watch(
            &config.base_path,
            Arc::clone(&orchestrator),
            reporter,
            shutdown,
            policy,
        )
        .await
        .context("watcher failed")?;

        // Closing the last sender ends the printer.
        drop(orchestrator);
        if let Err(err) = printer.await {
            tracing::warn!(error = %err, "notification printer failed");
        }

        tracing::info!(
            dispatched = summary.dispatched,
            finished = summary.finished,
            succeeded = summary.succeeded,
            abandoned = summary.abandoned,
            "watch session ended"
        );
        Ok(())
    }
}
