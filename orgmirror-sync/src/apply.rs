//! Applying reconciliation findings to the local tree.
//!
//! Relocations run before clones. Every per-repository failure is reported
//! individually and collected into [`SyncResult::errors`]; none aborts the
//! batch. Orphans are only reported.

use std::path::Path;

use serde::Serialize;

use orgmirror_core::types::{OrgName, RepoName};
use orgmirror_core::{
    build_clone_url, CloneOutcome, Config, Misplaced, Missing, Reconciliation, Reporter,
    WorkingCopies,
};

use crate::error::ApplyError;

/// Which findings to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Report intended actions without touching the disk.
    pub dry_run: bool,
    pub clone_missing: bool,
    pub move_misplaced: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            clone_missing: true,
            move_misplaced: true,
        }
    }
}

/// A relocation that happened (or would happen in dry-run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovedRepo {
    pub name: RepoName,
    pub from_org: OrgName,
    pub to_org: OrgName,
}

/// Outcome of one [`Coordinator::apply`] call.
#[derive(Debug, Default)]
pub struct SyncResult {
    /// `owner/name` of each clone (or planned clone in dry-run).
    pub cloned: Vec<String>,
    pub moved: Vec<MovedRepo>,
    /// `org/name` of each orphaned working copy.
    pub orphaned: Vec<String>,
    pub errors: Vec<ApplyError>,
}

impl SyncResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Applies a [`Reconciliation`] using the injected working-copy collaborator.
pub struct Coordinator<'a> {
    config: &'a Config,
    copies: &'a dyn WorkingCopies,
    reporter: &'a dyn Reporter,
}

impl<'a> Coordinator<'a> {
    pub fn new(
        config: &'a Config,
        copies: &'a dyn WorkingCopies,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            config,
            copies,
            reporter,
        }
    }

    pub async fn apply(&self, findings: &Reconciliation, options: SyncOptions) -> SyncResult {
        let mut result = SyncResult::default();

        if !options.dry_run {
            self.ensure_org_folders(&mut result).await;
        }

        if options.move_misplaced {
            for misplaced in &findings.misplaced {
                self.relocate(misplaced, options.dry_run, &mut result).await;
            }
        }

        if options.clone_missing {
            for missing in &findings.missing {
                self.clone_missing(missing, options.dry_run, &mut result).await;
            }
        }

        for orphan in &findings.orphaned {
            self.reporter.warning(&format!(
                "Orphaned repo (not on GitHub): {}/{}",
                orphan.org, orphan.name
            ));
            result.orphaned.push(format!("{}/{}", orphan.org, orphan.name));
        }

        tracing::info!(
            dry_run = options.dry_run,
            cloned = result.cloned.len(),
            moved = result.moved.len(),
            orphaned = result.orphaned.len(),
            errors = result.errors.len(),
            "apply finished",
        );
        result
    }

    async fn ensure_org_folders(&self, result: &mut SyncResult) {
        for org in &self.config.organizations {
            let path = self.config.org_path(org);
            if let Err(source) = tokio::fs::create_dir_all(&path).await {
                let err = ApplyError::OrgFolder { path, source };
                self.reporter.error(&err.to_string());
                result.errors.push(err);
            }
        }
    }

    async fn relocate(&self, misplaced: &Misplaced, dry_run: bool, result: &mut SyncResult) {
        let Misplaced {
            name,
            current_org,
            correct_org,
            local_path,
        } = misplaced;
        let moved = MovedRepo {
            name: name.clone(),
            from_org: current_org.clone(),
            to_org: correct_org.clone(),
        };

        if dry_run {
            self.reporter
                .info(&format!("Would move {name}: {current_org} -> {correct_org}"));
            result.moved.push(moved);
            return;
        }

        let dest = self.config.repo_path(correct_org, name);
        self.reporter
            .info(&format!("Moving {name}: {current_org} -> {correct_org}"));
        if let Err(err) = move_folder(local_path, &dest, misplaced).await {
            self.reporter.error(&err.to_string());
            result.errors.push(err);
            return;
        }
        tracing::info!(repo = %name, from = %current_org, to = %correct_org, "relocated");
        result.moved.push(moved);

        if self.config.auto_update_remotes {
            let url = build_clone_url(correct_org, name, self.config.clone_protocol);
            if let Err(source) = self.copies.set_remote_url(&dest, &url) {
                let err = ApplyError::RemoteUrl {
                    name: name.clone(),
                    source,
                };
                self.reporter.warning(&err.to_string());
                result.errors.push(err);
                return;
            }
        }
        self.reporter
            .success(&format!("Moved {name} to {correct_org}"));
    }

    async fn clone_missing(&self, missing: &Missing, dry_run: bool, result: &mut SyncResult) {
        let slug = format!("{}/{}", missing.org, missing.name);
        if dry_run {
            self.reporter.info(&format!("Would clone {slug}"));
            result.cloned.push(slug);
            return;
        }

        let dest = self.config.repo_path(&missing.org, &missing.name);
        self.reporter.info(&format!("Cloning {slug}..."));
        match self
            .copies
            .clone_repository(&missing.org, &missing.name, &dest, self.config.clone_protocol)
            .await
        {
            Ok(CloneOutcome::Cloned) => {
                self.reporter.success(&format!("Cloned {slug}"));
                result.cloned.push(slug);
            }
            Ok(CloneOutcome::AlreadyExists) => {
                tracing::debug!(repo = %slug, "clone destination already present");
                result.cloned.push(slug);
            }
            Err(e) => {
                self.reporter.error(&e.to_string());
                result.errors.push(ApplyError::Clone(e));
            }
        }
    }
}

/// Rename `from` to `to`, refusing to overwrite an existing destination.
async fn move_folder(from: &Path, to: &Path, misplaced: &Misplaced) -> Result<(), ApplyError> {
    let relocation = |source| ApplyError::Relocation {
        name: misplaced.name.clone(),
        from_org: misplaced.current_org.clone(),
        to_org: misplaced.correct_org.clone(),
        source,
    };

    if tokio::fs::try_exists(to).await.map_err(relocation)? {
        return Err(ApplyError::DestinationExists {
            name: misplaced.name.clone(),
            from_org: misplaced.current_org.clone(),
            to_org: misplaced.correct_org.clone(),
            dest: to.to_path_buf(),
        });
    }
    if let Some(parent) = to.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(relocation)?;
    }
    tokio::fs::rename(from, to).await.map_err(relocation)
}
