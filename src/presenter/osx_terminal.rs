// ABOUTME: macOS Terminal presenter that opens a window attached to the tmux session

use super::applescript::run_osascript;
use super::{PresenterError, TerminalPresenter};
use crate::models::SessionId;
use crate::tmux::attach_command;
use tracing::info;

const OPEN_WINDOW_SCRIPT: &str = r#"
on run argv
    tell application "Terminal"
        activate
        do script (item 1 of argv)
    end tell
end run
"#;

#[derive(Debug, Clone)]
pub struct TerminalAppPresenter {
    tmux_program: String,
}

impl TerminalAppPresenter {
    pub fn new(tmux_program: impl Into<String>) -> Self {
        Self {
            tmux_program: tmux_program.into(),
        }
    }
}

impl TerminalPresenter for TerminalAppPresenter {
    fn name(&self) -> &'static str {
        "terminal"
    }

    fn focus_session(&self, session: &SessionId) -> Result<(), PresenterError> {
        if !cfg!(target_os = "macos") {
            return Err(PresenterError::PresenterUnavailable(
                "Terminal.app automation is only available on macOS".to_string(),
            ));
        }
        info!("Opening Terminal window for session {}", session);
        let attach = attach_command(&self.tmux_program, session);
        run_osascript(OPEN_WINDOW_SCRIPT, &[attach.as_str()])?;
        Ok(())
    }
}
