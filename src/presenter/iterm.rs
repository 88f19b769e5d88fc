// ABOUTME: iTerm presenter that opens a new tab attached to the tmux session
// By default the tab the user ran devplexer from is focused again afterwards

use super::applescript::run_osascript;
use super::{PresenterError, TerminalPresenter};
use crate::models::SessionId;
use crate::tmux::attach_command;
use std::path::PathBuf;
use tracing::info;

// argv: attach command, then "true" to re-select the tab that was current.
const OPEN_TAB_SCRIPT: &str = r#"
on run argv
    set attachCommand to item 1 of argv
    set refocusOriginal to (item 2 of argv) is "true"
    tell application "iTerm"
        activate
        if (count of windows) is 0 then
            create window with default profile
            tell current session of current window to write text attachCommand
            return
        end if
        set originalWindow to current window
        set originalTab to current tab of originalWindow
        set originalSession to current session of originalTab
        tell originalWindow
            set newTab to (create tab with default profile)
            tell current session of newTab to write text attachCommand
        end tell
        if refocusOriginal then
            select originalWindow
            select originalTab
            select originalSession
        end if
    end tell
end run
"#;

#[derive(Debug, Clone)]
pub struct ITermPresenter {
    tmux_program: String,
    refocus_original: bool,
}

impl ITermPresenter {
    pub fn new(tmux_program: impl Into<String>) -> Self {
        Self {
            tmux_program: tmux_program.into(),
            refocus_original: true,
        }
    }

    /// Leave the new tab in front instead of returning to the current one.
    pub fn stay_on_new_tab(mut self) -> Self {
        self.refocus_original = false;
        self
    }

    fn script_args(&self, session: &SessionId) -> [String; 2] {
        [
            attach_command(&self.tmux_program, session),
            self.refocus_original.to_string(),
        ]
    }
}

impl TerminalPresenter for ITermPresenter {
    fn name(&self) -> &'static str {
        "iterm"
    }

    fn focus_session(&self, session: &SessionId) -> Result<(), PresenterError> {
        if !iterm_installed() {
            return Err(PresenterError::PresenterUnavailable(
                "iTerm.app is not installed".to_string(),
            ));
        }
        info!("Opening iTerm tab for session {}", session);
        let [attach, refocus] = self.script_args(session);
        run_osascript(OPEN_TAB_SCRIPT, &[attach.as_str(), refocus.as_str()])?;
        Ok(())
    }
}

fn application_dirs() -> Vec<PathBuf> {
    let mut folders = vec![PathBuf::from("/Applications")];
    if let Some(home) = dirs::home_dir() {
        folders.push(home.join("Applications"));
    }
    folders
}

/// Whether iTerm.app is installed in one of the standard application folders.
pub fn iterm_installed() -> bool {
    cfg!(target_os = "macos")
        && application_dirs()
            .iter()
            .any(|dir| dir.join("iTerm.app").exists())
}
