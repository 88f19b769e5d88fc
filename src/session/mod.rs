// ABOUTME: Session orchestration for devplexer
// Maps a topology onto a tmux session and reports what happened to each app

pub mod error;
pub mod orchestrator;
pub mod report;

pub use error::{OrchestratorError, EXIT_FAILURE, EXIT_PARTIAL};
pub use orchestrator::{validate_working_directories, SessionOrchestrator};
pub use report::{AppOutcome, AppReport, FailureKind, SessionReport, StatusReport};
