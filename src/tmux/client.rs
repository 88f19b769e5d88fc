// ABOUTME: TmuxDriver implementation backed by the host tmux binary
// Every call shells out to tmux so results always reflect the live server state

use crate::models::{SessionId, WindowRef};
use crate::tmux::commands::{
    earlier_duplicate, is_missing_session, keep_output_on_exit, parse_window_line,
    parse_window_list, WINDOW_FORMAT,
};
use crate::tmux::{MultiplexerDriver, NewWindow, TmuxError};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct TmuxDriver {
    program: String,
}

impl TmuxDriver {
    pub fn new() -> Self {
        Self::with_program("tmux")
    }

    /// Use a specific tmux binary instead of the one on `PATH`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Check that tmux can be executed on the host
    pub fn check_installed(&self) -> Result<(), TmuxError> {
        let output = std::process::Command::new(&self.program)
            .arg("-V")
            .stdin(Stdio::null())
            .output()
            .map_err(|_| TmuxError::TmuxNotInstalled)?;

        if !output.status.success() {
            return Err(TmuxError::TmuxNotInstalled);
        }
        debug!(
            "Found {}",
            String::from_utf8_lossy(&output.stdout).trim()
        );
        Ok(())
    }

    async fn run(&self, args: &[&str]) -> Result<Output, TmuxError> {
        debug!(?args, "Running {}", self.program);
        Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => TmuxError::TmuxNotInstalled,
                _ => TmuxError::IoError(e),
            })
    }

    fn first_window(output: &Output) -> Result<WindowRef, TmuxError> {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| TmuxError::UnexpectedOutput(stdout.to_string()))?;
        parse_window_line(line)
    }

    async fn kill_window(&self, window: &WindowRef) -> Result<(), TmuxError> {
        let output = self.run(&["kill-window", "-t", &window.id]).await?;
        if !output.status.success() {
            return Err(TmuxError::Unavailable(stderr_of(&output)));
        }
        Ok(())
    }
}

impl Default for TmuxDriver {
    fn default() -> Self {
        Self::new()
    }
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

impl MultiplexerDriver for TmuxDriver {
    async fn session_exists(&self, session: &SessionId) -> Result<bool, TmuxError> {
        let output = self.run(&["has-session", "-t", &session.target()]).await?;
        Ok(output.status.success())
    }

    async fn create_session(
        &self,
        session: &SessionId,
        first: &NewWindow<'_>,
    ) -> Result<WindowRef, TmuxError> {
        info!(
            "Creating tmux session {} with window {}",
            session, first.name
        );
        let working_directory = first.working_directory.to_string_lossy();
        let command = keep_output_on_exit(&self.program, first.command);
        let output = self
            .run(&[
                "new-session",
                "-d", // Detached
                "-s",
                session.as_str(),
                "-n",
                first.name,
                "-c",
                &working_directory,
                "-P",
                "-F",
                WINDOW_FORMAT,
                &command,
            ])
            .await?;

        if !output.status.success() {
            let stderr = stderr_of(&output);
            if stderr.contains("duplicate session") {
                return Err(TmuxError::SessionExists(session.to_string()));
            }
            return Err(TmuxError::SessionCreate {
                session: session.to_string(),
                reason: stderr,
            });
        }

        Self::first_window(&output)
    }

    async fn list_windows(&self, session: &SessionId) -> Result<Vec<WindowRef>, TmuxError> {
        let output = self
            .run(&["list-windows", "-t", &session.target(), "-F", WINDOW_FORMAT])
            .await?;

        if !output.status.success() {
            let stderr = stderr_of(&output);
            if is_missing_session(&stderr) {
                return Err(TmuxError::SessionNotFound(session.to_string()));
            }
            return Err(TmuxError::Unavailable(stderr));
        }

        parse_window_list(&String::from_utf8_lossy(&output.stdout))
    }

    async fn create_window(
        &self,
        session: &SessionId,
        window: &NewWindow<'_>,
    ) -> Result<WindowRef, TmuxError> {
        info!("Creating window {} in session {}", window.name, session);
        let working_directory = window.working_directory.to_string_lossy();
        let command = keep_output_on_exit(&self.program, window.command);
        let output = self
            .run(&[
                "new-window",
                "-d",
                "-t",
                &session.window_target(),
                "-n",
                window.name,
                "-c",
                &working_directory,
                "-P",
                "-F",
                WINDOW_FORMAT,
                &command,
            ])
            .await?;

        if !output.status.success() {
            let stderr = stderr_of(&output);
            if is_missing_session(&stderr) {
                return Err(TmuxError::SessionNotFound(session.to_string()));
            }
            return Err(TmuxError::WindowCreate {
                window: window.name.to_string(),
                reason: stderr,
            });
        }

        let created = Self::first_window(&output)?;

        // tmux accepts duplicate window names, so a concurrent client may have
        // opened the same app between our check and our new-window.
        let windows = self.list_windows(session).await?;
        if let Some(existing) = earlier_duplicate(&windows, &created) {
            warn!(
                "Window {} already opened as {}, closing duplicate {}",
                window.name, existing.id, created.id
            );
            if let Err(e) = self.kill_window(&created).await {
                return Err(TmuxError::WindowCreate {
                    window: window.name.to_string(),
                    reason: format!("could not close duplicate window {}: {}", created.id, e),
                });
            }
            return Err(TmuxError::WindowExists(window.name.to_string()));
        }

        Ok(created)
    }

    async fn kill_session(&self, session: &SessionId) -> Result<(), TmuxError> {
        info!("Killing tmux session {}", session);
        let output = self.run(&["kill-session", "-t", &session.target()]).await?;

        if !output.status.success() {
            let stderr = stderr_of(&output);
            if is_missing_session(&stderr) {
                return Err(TmuxError::SessionNotFound(session.to_string()));
            }
            return Err(TmuxError::Unavailable(stderr));
        }
        Ok(())
    }
}
