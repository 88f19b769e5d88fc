// ABOUTME: Presenter for runs from inside tmux, switching the current client to the session

use super::{PresenterError, TerminalPresenter};
use crate::models::SessionId;
use std::process::{Command, Stdio};
use tracing::info;

#[derive(Debug, Clone)]
pub struct TmuxClientPresenter {
    tmux_program: String,
}

impl TmuxClientPresenter {
    pub fn new(tmux_program: impl Into<String>) -> Self {
        Self {
            tmux_program: tmux_program.into(),
        }
    }
}

impl TerminalPresenter for TmuxClientPresenter {
    fn name(&self) -> &'static str {
        "tmux"
    }

    fn focus_session(&self, session: &SessionId) -> Result<(), PresenterError> {
        if std::env::var_os("TMUX").is_none() {
            return Err(PresenterError::PresenterUnavailable(
                "not running inside a tmux client".to_string(),
            ));
        }

        info!("Switching tmux client to session {}", session);
        let output = Command::new(&self.tmux_program)
            .args(["switch-client", "-t", &session.target()])
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            return Err(PresenterError::ScriptFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }
}
