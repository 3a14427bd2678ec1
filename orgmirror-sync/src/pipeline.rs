//! Shared pipeline entrypoints used by the CLI commands.
//!
//! Each run takes fresh snapshots: scan the local tree, list the remote
//! organizations, reconcile, then (for `sync` and `init_structure`) apply.

use serde::Serialize;

use orgmirror_core::{reconcile, Config, Reconciliation, RemoteHost, Reporter, WorkingCopies};

use crate::apply::{Coordinator, SyncOptions, SyncResult};
use crate::error::{io_err, SyncError};
use crate::fetch::{fetch_remote, RemoteSnapshot};
use crate::scan::scan_local;

/// Snapshot comparison without any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub local_count: usize,
    /// Remote repositories across all organizations, exclusions removed.
    pub remote_count: usize,
    pub in_sync: bool,
    pub reconciliation: Reconciliation,
    /// Organizations whose listing failed during this run.
    pub degraded: Vec<String>,
}

/// Reconcile and apply with `options`.
pub async fn sync(
    config: &Config,
    host: &dyn RemoteHost,
    copies: &dyn WorkingCopies,
    reporter: &dyn Reporter,
    options: SyncOptions,
) -> Result<SyncResult, SyncError> {
    reporter.info("Fetching repository information...");
    let (reconciliation, snapshot) = collect(config, host, reporter).await?;
    warn_if_degraded(&snapshot, &reconciliation, reporter);

    let coordinator = Coordinator::new(config, copies, reporter);
    Ok(coordinator.apply(&reconciliation, options).await)
}

/// Compare local and remote layouts and summarize.
pub async fn status(
    config: &Config,
    host: &dyn RemoteHost,
    reporter: &dyn Reporter,
) -> Result<StatusReport, SyncError> {
    let local = scan_local(config)?;
    let snapshot = fetch_remote(host, &config.organizations, reporter).await;
    let exclude = config.exclusions();
    let reconciliation = reconcile(&local, &snapshot.repos, &exclude);
    warn_if_degraded(&snapshot, &reconciliation, reporter);

    let local_count = local.values().map(|repos| repos.len()).sum();
    let remote_count = snapshot
        .repos
        .values()
        .flat_map(|repos| repos.keys())
        .filter(|name| !exclude.contains(*name))
        .count();

    Ok(StatusReport {
        local_count,
        remote_count,
        in_sync: reconciliation.is_in_sync(),
        reconciliation,
        degraded: snapshot.degraded.iter().map(|o| o.to_string()).collect(),
    })
}

/// Create the base and organization folders, then sync with clone and move
/// enabled.
pub async fn init_structure(
    config: &Config,
    host: &dyn RemoteHost,
    copies: &dyn WorkingCopies,
    reporter: &dyn Reporter,
) -> Result<SyncResult, SyncError> {
    reporter.info(&format!(
        "Initializing local structure at: {}",
        config.base_path.display()
    ));
    std::fs::create_dir_all(&config.base_path).map_err(|e| io_err(&config.base_path, e))?;
    for org in &config.organizations {
        let org_path = config.org_path(org);
        std::fs::create_dir_all(&org_path).map_err(|e| io_err(&org_path, e))?;
        reporter.success(&format!("Created directory: {}", org_path.display()));
    }

    sync(config, host, copies, reporter, SyncOptions::default()).await
}

async fn collect(
    config: &Config,
    host: &dyn RemoteHost,
    reporter: &dyn Reporter,
) -> Result<(Reconciliation, RemoteSnapshot), SyncError> {
    let local = scan_local(config)?;
    let snapshot = fetch_remote(host, &config.organizations, reporter).await;
    let reconciliation = reconcile(&local, &snapshot.repos, &config.exclusions());
    Ok((reconciliation, snapshot))
}

fn warn_if_degraded(
    snapshot: &RemoteSnapshot,
    reconciliation: &Reconciliation,
    reporter: &dyn Reporter,
) {
    if !snapshot.is_degraded() || reconciliation.orphaned.is_empty() {
        return;
    }
    let orgs: Vec<String> = snapshot.degraded.iter().map(|o| o.to_string()).collect();
    reporter.warning(&format!(
        "Listing failed for {}; orphaned findings may be false",
        orgs.join(", ")
    ));
}
