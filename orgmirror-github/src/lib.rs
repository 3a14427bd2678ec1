//! GitHub CLI and git implementations of the orgmirror collaborator traits.

mod error;
pub mod gh;
pub mod git;

pub use error::GhError;
pub use gh::GhCli;
pub use git::LocalGit;
