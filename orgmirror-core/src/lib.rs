//! orgmirror core library: domain types, configuration, reconciliation.
//!
//! Public API surface:
//! - [`types`]: newtypes, snapshots and layout maps
//! - [`reconcile`]: the pure local-vs-remote diff
//! - [`remote_url`]: clone URL construction and `origin` parsing
//! - [`config`]: YAML configuration load / save
//! - [`host`]: collaborator traits for the hosting service and working copies
//! - [`report`]: injected operator-facing reporting
//! - [`error`]: [`ConfigError`] and the collaborator failure types

pub mod config;
pub mod error;
pub mod host;
pub mod reconcile;
pub mod remote_url;
pub mod report;
pub mod types;

pub use config::Config;
pub use error::{
    CloneError, ConfigError, LookupError, RemoteListError, RemoteUrlError, TransferRequestError,
};
pub use host::{CloneOutcome, Lookup, RemoteHost, WorkingCopies};
pub use reconcile::{reconcile, Finding, Misplaced, Missing, Orphaned, Reconciliation};
pub use remote_url::{build_clone_url, parse_remote_url, RemoteSlug};
pub use report::{Level, RecordingReporter, Reporter, TracingReporter};
pub use types::{
    CloneProtocol, LocalLayout, LocalRepositoryEntry, OrgMap, OrgName, RemoteLayout, RepoName,
    RepositoryDescriptor,
};
