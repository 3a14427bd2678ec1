use thiserror::Error;

/// Failures running the external `gh` / `git` programs.
#[derive(Debug, Error)]
pub enum GhError {
    /// The program could not be started at all.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited non-zero.
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("unexpected gh output: {0}")]
    Json(#[from] serde_json::Error),
}

impl GhError {
    /// `true` when the program is missing from `PATH`.
    pub fn is_not_installed(&self) -> bool {
        matches!(self, GhError::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
