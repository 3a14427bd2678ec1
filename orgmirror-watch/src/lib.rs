//! Continuous watch mode: folder moves between organizations become
//! ownership transfers on the hosting service.

pub mod debounce;
mod error;
pub mod event;
pub mod filter;
pub mod runtime;
pub mod transfer;

pub use debounce::{DebounceMap, MoveKey, DEBOUNCE_WINDOW};
pub use error::WatchError;
pub use event::{FsNotification, RenamePairer, RENAME_PAIR_WINDOW};
pub use filter::{classify, MoveDecision, OrgMove};
pub use runtime::{watch, DetectorSummary, MoveDetector, ShutdownPolicy, RECENT_WORKFLOWS};
pub use transfer::{
    FailureReason, Rejection, TransferCompleted, TransferOrchestrator, TransferPolicy,
    TransferState, TransferWorkflow,
};
