// ABOUTME: Error types for session orchestration and their process exit codes

use super::report::SessionReport;
use crate::config::ConfigError;
use crate::tmux::TmuxError;
use thiserror::Error;

/// Exit code for fatal errors where nothing was started.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code when the session is live but some apps failed to start.
pub const EXIT_PARTIAL: i32 = 2;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Multiplexer unavailable: {0}")]
    DriverUnavailable(#[source] TmuxError),

    #[error("Failed to create session: {0}")]
    SessionCreate(#[source] TmuxError),

    #[error(
        "Session {} started partially, failed apps: {}",
        .0.session_id(),
        .0.failed_apps().join(", ")
    )]
    PartialSession(Box<SessionReport>),
}

impl OrchestratorError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PartialSession(_) => EXIT_PARTIAL,
            _ => EXIT_FAILURE,
        }
    }

    /// The per-app report, when the session got far enough to have one.
    pub fn report(&self) -> Option<&SessionReport> {
        match self {
            Self::PartialSession(report) => Some(report),
            _ => None,
        }
    }
}
