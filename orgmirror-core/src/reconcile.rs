//! Set reconciliation between the local folder layout and the remote listing.
//!
//! [`reconcile`] is pure: it reads two already-collected snapshots and returns
//! three disjoint finding lists. No disk or network access happens here.
//!
//! | finding | meaning |
//! |---|---|
//! | [`Misplaced`] | name exists locally and remotely, under different organizations |
//! | [`Missing`]   | remote has it, no local folder of that name anywhere |
//! | [`Orphaned`]  | local has it, no tracked remote organization lists that name |
//!
//! Excluded names are dropped from the remote side only, so they never show up
//! as missing or misplaced but still surface as orphaned when present locally.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Serialize;

use crate::types::{LocalLayout, OrgName, RemoteLayout, RepoName, RepositoryDescriptor};

/// Local folder organization disagrees with the remote owning organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Misplaced {
    pub name: RepoName,
    pub current_org: OrgName,
    pub correct_org: OrgName,
    pub local_path: PathBuf,
}

/// Present remotely, absent locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Missing {
    pub org: OrgName,
    pub name: RepoName,
    pub descriptor: RepositoryDescriptor,
}

/// Present locally, absent from every tracked remote organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Orphaned {
    pub org: OrgName,
    pub name: RepoName,
    pub local_path: PathBuf,
}

/// One reconciliation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Finding {
    Misplaced(Misplaced),
    Missing(Missing),
    Orphaned(Orphaned),
}

impl Finding {
    pub fn name(&self) -> &RepoName {
        match self {
            Finding::Misplaced(m) => &m.name,
            Finding::Missing(m) => &m.name,
            Finding::Orphaned(o) => &o.name,
        }
    }
}

/// Result of one [`reconcile`] call.
///
/// Each list is ordered by organization, then repository name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub misplaced: Vec<Misplaced>,
    pub missing: Vec<Missing>,
    pub orphaned: Vec<Orphaned>,
}

impl Reconciliation {
    /// No misplaced and no missing repositories. Orphans do not count: they
    /// are reported but never acted on.
    pub fn is_in_sync(&self) -> bool {
        self.misplaced.is_empty() && self.missing.is_empty()
    }

    pub fn len(&self) -> usize {
        self.misplaced.len() + self.missing.len() + self.orphaned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All findings as the tagged [`Finding`] type.
    pub fn findings(&self) -> impl Iterator<Item = Finding> + '_ {
        self.misplaced
            .iter()
            .cloned()
            .map(Finding::Misplaced)
            .chain(self.missing.iter().cloned().map(Finding::Missing))
            .chain(self.orphaned.iter().cloned().map(Finding::Orphaned))
    }
}

/// Compare the local layout against the remote layout.
pub fn reconcile(
    local: &LocalLayout,
    remote: &RemoteLayout,
    exclude: &BTreeSet<RepoName>,
) -> Reconciliation {
    // Name → owning organization. Remote names are globally unique.
    let owners: BTreeMap<&RepoName, &OrgName> = remote
        .iter()
        .flat_map(|(org, repos)| repos.keys().map(move |name| (name, org)))
        .filter(|(name, _)| !exclude.contains(*name))
        .collect();

    let local_names: BTreeSet<&RepoName> = local.values().flat_map(|repos| repos.keys()).collect();

    let mut result = Reconciliation::default();

    for (local_org, repos) in local {
        for (name, entry) in repos {
            match owners.get(name) {
                Some(owner) if *owner != local_org => result.misplaced.push(Misplaced {
                    name: name.clone(),
                    current_org: local_org.clone(),
                    correct_org: (*owner).clone(),
                    local_path: entry.path.clone(),
                }),
                Some(_) => {}
                None => result.orphaned.push(Orphaned {
                    org: local_org.clone(),
                    name: name.clone(),
                    local_path: entry.path.clone(),
                }),
            }
        }
    }

    for (org, repos) in remote {
        for (name, descriptor) in repos {
            if exclude.contains(name) {
                continue;
            }
            // A copy under another organization is a misplaced finding, not a
            // missing one.
            if local_names.contains(name) {
                continue;
            }
            result.missing.push(Missing {
                org: org.clone(),
                name: name.clone(),
                descriptor: descriptor.clone(),
            });
        }
    }

    tracing::debug!(
        misplaced = result.misplaced.len(),
        missing = result.missing.len(),
        orphaned = result.orphaned.len(),
        "reconciliation computed",
    );
    result
}
