//! # orgmirror-sync
//!
//! One-shot reconciliation pipelines.
//!
//! [`pipeline::status`] compares the local tree with the remote organizations;
//! [`pipeline::sync`] additionally relocates misplaced working copies and
//! clones missing ones through a [`Coordinator`].

pub mod apply;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod scan;

pub use apply::{Coordinator, MovedRepo, SyncOptions, SyncResult};
pub use error::{ApplyError, SyncError};
pub use fetch::{fetch_remote, RemoteSnapshot};
pub use pipeline::StatusReport;
pub use scan::scan_local;
