//! Remote layout collection.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use orgmirror_core::types::{OrgName, RemoteLayout};
use orgmirror_core::{RemoteHost, Reporter};

/// Remote view of every tracked organization at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteSnapshot {
    pub repos: RemoteLayout,
    /// Organizations whose listing failed. Their map is empty, so local
    /// copies under them may be reported as orphaned without being so.
    pub degraded: BTreeSet<OrgName>,
    pub fetched_at: DateTime<Utc>,
}

impl RemoteSnapshot {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// List each organization in turn. A failing organization is reported,
/// recorded as degraded, and does not stop the others.
pub async fn fetch_remote(
    host: &dyn RemoteHost,
    orgs: &[OrgName],
    reporter: &dyn Reporter,
) -> RemoteSnapshot {
    let mut repos = RemoteLayout::new();
    let mut degraded = BTreeSet::new();

    for org in orgs {
        let listing = match host.list_repositories(org).await {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(org = %org, error = %e, "listing failed");
                reporter.error(&e.to_string());
                degraded.insert(org.clone());
                repos.insert(org.clone(), BTreeMap::new());
                continue;
            }
        };
        tracing::debug!(org = %org, count = listing.len(), "listed repositories");
        let by_name = repos.entry(org.clone()).or_default();
        for descriptor in listing {
            by_name.insert(descriptor.name.clone(), descriptor);
        }
    }

    RemoteSnapshot {
        repos,
        degraded,
        fetched_at: Utc::now(),
    }
}
