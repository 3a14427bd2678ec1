//! Local layout discovery.

use std::collections::BTreeMap;

use orgmirror_core::types::{is_git_working_copy, LocalLayout, LocalRepositoryEntry, RepoName};
use orgmirror_core::Config;

use crate::error::{io_err, SyncError};

/// Collect the working copies directly under each configured organization
/// folder.
///
/// Every configured organization gets an entry, empty when its folder does
/// not exist yet. Plain folders without `.git` and folders whose names are
/// not valid UTF-8 are skipped.
pub fn scan_local(config: &Config) -> Result<LocalLayout, SyncError> {
    let mut layout = LocalLayout::new();

    for org in &config.organizations {
        let org_path = config.org_path(org);
        let repos = layout.entry(org.clone()).or_insert_with(BTreeMap::new);
        if !org_path.is_dir() {
            tracing::debug!(org = %org, path = %org_path.display(), "organization folder absent");
            continue;
        }

        let entries = std::fs::read_dir(&org_path).map_err(|e| io_err(&org_path, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&org_path, e))?;
            let path = entry.path();
            if !path.is_dir() || !is_git_working_copy(&path) {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!(path = %path.display(), "skipping folder with non-UTF-8 name");
                continue;
            };
            let name = RepoName::from(name);
            repos.insert(
                name.clone(),
                LocalRepositoryEntry {
                    name,
                    org: org.clone(),
                    path,
                },
            );
        }
        tracing::debug!(org = %org, count = repos.len(), "scanned organization folder");
    }

    Ok(layout)
}
