// ABOUTME: Terminal presenters that surface a tmux session to the user
// Opens or focuses a terminal window attached to the session after it is ensured

pub mod applescript;
pub mod iterm;
pub mod osx_terminal;
pub mod tmux_client;

pub use iterm::ITermPresenter;
pub use osx_terminal::TerminalAppPresenter;
pub use tmux_client::TmuxClientPresenter;

use crate::models::SessionId;
use crate::tmux::attach_command;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresenterError {
    #[error("Terminal presenter unavailable: {0}")]
    PresenterUnavailable(String),

    #[error("Terminal automation failed: {0}")]
    ScriptFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Something that can put a tmux session in front of the user.
#[cfg_attr(test, mockall::automock)]
pub trait TerminalPresenter {
    fn name(&self) -> &'static str;

    fn focus_session(&self, session: &SessionId) -> Result<(), PresenterError>;
}

/// Presenter selection from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PresenterKind {
    /// Pick one based on the current terminal and platform
    #[default]
    Auto,
    /// Open a new iTerm tab
    Iterm,
    /// Open a new macOS Terminal window
    Terminal,
    /// Switch the current tmux client to the session
    Tmux,
    /// Do not open anything
    None,
}

/// Facts about the environment that drive automatic presenter selection.
#[derive(Debug, Clone, Default)]
pub struct TerminalEnvironment {
    pub inside_tmux: bool,
    pub term_program: Option<String>,
    pub is_macos: bool,
    pub iterm_installed: bool,
}

impl TerminalEnvironment {
    pub fn detect() -> Self {
        Self {
            inside_tmux: std::env::var_os("TMUX").is_some(),
            term_program: std::env::var("TERM_PROGRAM").ok(),
            is_macos: cfg!(target_os = "macos"),
            iterm_installed: iterm::iterm_installed(),
        }
    }

    /// Resolve `Auto` to a concrete presenter; `None` means nothing fits.
    pub fn resolve(&self, kind: PresenterKind) -> Option<PresenterKind> {
        match kind {
            PresenterKind::Auto => {
                if self.inside_tmux {
                    Some(PresenterKind::Tmux)
                } else if !self.is_macos {
                    None
                } else if self.term_program.as_deref() == Some("iTerm.app")
                    || self.iterm_installed
                {
                    Some(PresenterKind::Iterm)
                } else {
                    Some(PresenterKind::Terminal)
                }
            }
            other => Some(other),
        }
    }
}

/// Build the presenter for a kind, detecting the environment for `Auto`.
///
/// `tmux_program` is the binary the driver runs, so attach commands and
/// client switches talk to the same tmux.
pub fn presenter_for(kind: PresenterKind, tmux_program: &str) -> Box<dyn TerminalPresenter> {
    match TerminalEnvironment::detect().resolve(kind) {
        Some(PresenterKind::Iterm) => Box::new(ITermPresenter::new(tmux_program)),
        Some(PresenterKind::Terminal) => Box::new(TerminalAppPresenter::new(tmux_program)),
        Some(PresenterKind::Tmux) => Box::new(TmuxClientPresenter::new(tmux_program)),
        Some(PresenterKind::None) => Box::new(NoopPresenter),
        Some(PresenterKind::Auto) | None => Box::new(UnsupportedPresenter::new(tmux_program)),
    }
}

/// Leaves the session detached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPresenter;

impl TerminalPresenter for NoopPresenter {
    fn name(&self) -> &'static str {
        "none"
    }

    fn focus_session(&self, _session: &SessionId) -> Result<(), PresenterError> {
        Ok(())
    }
}

/// Used when no terminal integration exists for this platform.
#[derive(Debug, Clone)]
pub struct UnsupportedPresenter {
    tmux_program: String,
}

impl UnsupportedPresenter {
    pub fn new(tmux_program: impl Into<String>) -> Self {
        Self {
            tmux_program: tmux_program.into(),
        }
    }
}

impl TerminalPresenter for UnsupportedPresenter {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn focus_session(&self, session: &SessionId) -> Result<(), PresenterError> {
        Err(PresenterError::PresenterUnavailable(format!(
            "no terminal integration for this platform, attach with `{}`",
            attach_command(&self.tmux_program, session)
        )))
    }
}
