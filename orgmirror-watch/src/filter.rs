//! Pure classification of a move notification.
//!
//! A move reaches the transfer orchestrator only when it is a directory move
//! of a direct child of one organization folder to a direct child of a
//! different organization folder, and the destination is a working copy.

use std::path::{Component, Path, PathBuf};

use orgmirror_core::types::OrgName;

/// An accepted organization-level repository move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgMove {
    pub source_org: OrgName,
    pub dest_org: OrgName,
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Outcome of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveDecision {
    Accept(OrgMove),
    /// Outside the base path, not at repository depth, or not a directory.
    Ignored,
    /// Renamed inside one organization folder.
    RenamedWithinOrg {
        org: OrgName,
        from_name: String,
        to_name: String,
    },
    /// Moved across organizations but holds no working copy.
    NotAWorkingCopy { path: PathBuf },
}

/// Classify a directory move from `from` to `to` under `base`.
///
/// `is_working_copy` is consulted last, only for cross-organization moves.
pub fn classify(
    base: &Path,
    from: &Path,
    to: &Path,
    is_working_copy: impl Fn(&Path) -> bool,
) -> MoveDecision {
    let Some((source_org, from_name)) = org_and_child(base, from) else {
        return MoveDecision::Ignored;
    };
    let Some((dest_org, to_name)) = org_and_child(base, to) else {
        return MoveDecision::Ignored;
    };

    if source_org == dest_org {
        return MoveDecision::RenamedWithinOrg {
            org: source_org,
            from_name,
            to_name,
        };
    }

    if !is_working_copy(to) {
        return MoveDecision::NotAWorkingCopy {
            path: to.to_path_buf(),
        };
    }

    MoveDecision::Accept(OrgMove {
        source_org,
        dest_org,
        from: from.to_path_buf(),
        to: to.to_path_buf(),
    })
}

/// `<base>/<org>/<child>` → `(org, child)`; anything else → `None`.
fn org_and_child(base: &Path, path: &Path) -> Option<(OrgName, String)> {
    let relative = path.strip_prefix(base).ok()?;
    let mut parts = relative.components();
    let org = normal(parts.next()?)?;
    let child = normal(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some((OrgName::from(org), child))
}

fn normal(component: Component<'_>) -> Option<String> {
    match component {
        Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
        _ => None,
    }
}
