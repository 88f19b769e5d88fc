// ABOUTME: Capability interface the orchestrator uses to observe and mutate tmux
// Implemented by TmuxDriver for the real binary and by in-memory fakes in tests

use crate::models::{SessionId, WindowRef};
use crate::tmux::TmuxError;
use std::path::Path;

/// Everything needed to start one app in its own window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewWindow<'a> {
    pub name: &'a str,
    pub working_directory: &'a Path,
    pub command: &'a str,
}

/// Operations on the multiplexer's live session table.
///
/// Implementations never cache: every call reflects the multiplexer's state
/// at the time it is made, since other clients may change it at any moment.
#[allow(async_fn_in_trait)]
pub trait MultiplexerDriver {
    async fn session_exists(&self, session: &SessionId) -> Result<bool, TmuxError>;

    /// Create a detached session whose first window runs `first`.
    ///
    /// Fails with `TmuxError::SessionExists` when the name is taken.
    async fn create_session(
        &self,
        session: &SessionId,
        first: &NewWindow<'_>,
    ) -> Result<WindowRef, TmuxError>;

    /// Windows of the session in index order.
    async fn list_windows(&self, session: &SessionId) -> Result<Vec<WindowRef>, TmuxError>;

    /// Append a window running `window` to the session.
    ///
    /// Fails with `TmuxError::WindowExists` when another client created a
    /// window of the same name first; the multiplexer is left with only
    /// that earlier window.
    async fn create_window(
        &self,
        session: &SessionId,
        window: &NewWindow<'_>,
    ) -> Result<WindowRef, TmuxError>;

    async fn kill_session(&self, session: &SessionId) -> Result<(), TmuxError>;
}
