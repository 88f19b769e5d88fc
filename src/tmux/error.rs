// ABOUTME: Error types for tmux driver operations
// Defines error conditions that can occur when querying or mutating host tmux sessions

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TmuxError {
    #[error("Tmux not installed on host")]
    TmuxNotInstalled,

    #[error("Tmux unavailable: {0}")]
    Unavailable(String),

    #[error("Session already exists: {0}")]
    SessionExists(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Failed to create session {session}: {reason}")]
    SessionCreate { session: String, reason: String },

    #[error("Window already exists: {0}")]
    WindowExists(String),

    #[error("Failed to create window {window}: {reason}")]
    WindowCreate { window: String, reason: String },

    #[error("Unexpected tmux output: {0}")]
    UnexpectedOutput(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TmuxError {
    /// Whether the multiplexer itself could not be reached, as opposed to a
    /// single operation being rejected.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::TmuxNotInstalled | Self::Unavailable(_) | Self::IoError(_)
        )
    }
}
