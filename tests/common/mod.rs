// ABOUTME: Shared test doubles: an in-memory multiplexer and a recording presenter
// The fake keeps state behind a mutex so it behaves like tmux shared between invocations

#![allow(dead_code)]

use devplexer::config::{AppSpec, Topology};
use devplexer::models::{SessionId, WindowRef};
use devplexer::presenter::{PresenterError, TerminalPresenter};
use devplexer::tmux::{MultiplexerDriver, NewWindow, TmuxError};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeWindow {
    pub window: WindowRef,
    pub working_directory: PathBuf,
    pub command: String,
}

#[derive(Default)]
struct FakeState {
    sessions: BTreeMap<String, Vec<FakeWindow>>,
    next_id: u32,
    rejected_dirs: HashSet<PathBuf>,
    session_race: Option<Vec<String>>,
    window_races: HashSet<String>,
    unavailable: bool,
    vanish_after_check: bool,
    create_session_calls: usize,
    create_window_calls: usize,
}

impl FakeState {
    fn push_window(&mut self, session: &str, name: &str, dir: &Path, command: &str) -> WindowRef {
        let id = self.next_id;
        self.next_id += 1;
        let windows = self.sessions.entry(session.to_string()).or_default();
        let index = windows.iter().map(|w| w.window.index + 1).max().unwrap_or(0);
        let window = WindowRef {
            index,
            id: format!("@{id}"),
            name: name.to_string(),
        };
        windows.push(FakeWindow {
            window: window.clone(),
            working_directory: dir.to_path_buf(),
            command: command.to_string(),
        });
        window
    }

    fn check_available(&self) -> Result<(), TmuxError> {
        if self.unavailable {
            return Err(TmuxError::TmuxNotInstalled);
        }
        Ok(())
    }
}

/// In-memory stand-in for a tmux server. Clones share the same server.
#[derive(Clone, Default)]
pub struct FakeMultiplexer {
    state: Arc<Mutex<FakeState>>,
}

impl FakeMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make window creation in `dir` fail the way tmux does for a bad start directory.
    pub fn reject_directory(&self, dir: &Path) {
        self.state.lock().unwrap().rejected_dirs.insert(dir.to_path_buf());
    }

    /// The next `create_session` loses a race against another client that
    /// creates the session with `windows` first.
    pub fn race_session_creation(&self, windows: &[&str]) {
        self.state.lock().unwrap().session_race =
            Some(windows.iter().map(ToString::to_string).collect());
    }

    /// The next `create_window` for `name` finds another client already made it.
    pub fn race_window_creation(&self, name: &str) {
        self.state.lock().unwrap().window_races.insert(name.to_string());
    }

    /// The next `session_exists` that finds a session reports it and then
    /// drops it, as if another client killed it right after the check.
    pub fn vanish_session_after_check(&self) {
        self.state.lock().unwrap().vanish_after_check = true;
    }

    pub fn set_unavailable(&self) {
        self.state.lock().unwrap().unavailable = true;
    }

    /// Simulate the user opening a window by hand.
    pub fn add_window(&self, session: &str, name: &str, dir: &Path, command: &str) -> WindowRef {
        self.state.lock().unwrap().push_window(session, name, dir, command)
    }

    pub fn session_names(&self) -> Vec<String> {
        self.state.lock().unwrap().sessions.keys().cloned().collect()
    }

    pub fn windows(&self, session: &str) -> Vec<FakeWindow> {
        self.state
            .lock()
            .unwrap()
            .sessions
            .get(session)
            .cloned()
            .unwrap_or_default()
    }

    pub fn window_names(&self, session: &str) -> Vec<String> {
        self.windows(session)
            .into_iter()
            .map(|w| w.window.name)
            .collect()
    }

    pub fn create_session_calls(&self) -> usize {
        self.state.lock().unwrap().create_session_calls
    }

    pub fn create_window_calls(&self) -> usize {
        self.state.lock().unwrap().create_window_calls
    }
}

impl MultiplexerDriver for FakeMultiplexer {
    async fn session_exists(&self, session: &SessionId) -> Result<bool, TmuxError> {
        let mut state = self.state.lock().unwrap();
        state.check_available()?;
        let exists = state.sessions.contains_key(session.as_str());
        if exists && state.vanish_after_check {
            state.vanish_after_check = false;
            state.sessions.remove(session.as_str());
        }
        Ok(exists)
    }

    async fn create_session(
        &self,
        session: &SessionId,
        first: &NewWindow<'_>,
    ) -> Result<WindowRef, TmuxError> {
        let mut state = self.state.lock().unwrap();
        state.check_available()?;
        state.create_session_calls += 1;

        if let Some(windows) = state.session_race.take() {
            for name in windows {
                state.push_window(session.as_str(), &name, Path::new("/"), "other client");
            }
        }
        if state.sessions.contains_key(session.as_str()) {
            return Err(TmuxError::SessionExists(session.to_string()));
        }
        if state.rejected_dirs.contains(first.working_directory) {
            return Err(TmuxError::SessionCreate {
                session: session.to_string(),
                reason: format!("can't use directory {}", first.working_directory.display()),
            });
        }

        Ok(state.push_window(
            session.as_str(),
            first.name,
            first.working_directory,
            first.command,
        ))
    }

    async fn list_windows(&self, session: &SessionId) -> Result<Vec<WindowRef>, TmuxError> {
        let state = self.state.lock().unwrap();
        state.check_available()?;
        let windows = state
            .sessions
            .get(session.as_str())
            .ok_or_else(|| TmuxError::SessionNotFound(session.to_string()))?;
        let mut refs: Vec<WindowRef> = windows.iter().map(|w| w.window.clone()).collect();
        refs.sort_by_key(|w| w.index);
        Ok(refs)
    }

    async fn create_window(
        &self,
        session: &SessionId,
        window: &NewWindow<'_>,
    ) -> Result<WindowRef, TmuxError> {
        let mut state = self.state.lock().unwrap();
        state.check_available()?;
        state.create_window_calls += 1;

        if !state.sessions.contains_key(session.as_str()) {
            return Err(TmuxError::SessionNotFound(session.to_string()));
        }
        if state.window_races.remove(window.name) {
            state.push_window(session.as_str(), window.name, Path::new("/"), "other client");
            return Err(TmuxError::WindowExists(window.name.to_string()));
        }
        if state.rejected_dirs.contains(window.working_directory) {
            return Err(TmuxError::WindowCreate {
                window: window.name.to_string(),
                reason: format!("can't use directory {}", window.working_directory.display()),
            });
        }

        Ok(state.push_window(
            session.as_str(),
            window.name,
            window.working_directory,
            window.command,
        ))
    }

    async fn kill_session(&self, session: &SessionId) -> Result<(), TmuxError> {
        let mut state = self.state.lock().unwrap();
        state.check_available()?;
        state
            .sessions
            .remove(session.as_str())
            .map(|_| ())
            .ok_or_else(|| TmuxError::SessionNotFound(session.to_string()))
    }
}

/// Presenter that records which sessions it was asked to focus.
#[derive(Clone, Default)]
pub struct RecordingPresenter {
    focused: Arc<Mutex<Vec<String>>>,
    unavailable: bool,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn focused(&self) -> Vec<String> {
        self.focused.lock().unwrap().clone()
    }
}

impl TerminalPresenter for RecordingPresenter {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn focus_session(&self, session: &SessionId) -> Result<(), PresenterError> {
        self.focused.lock().unwrap().push(session.to_string());
        if self.unavailable {
            return Err(PresenterError::PresenterUnavailable(
                "no terminal in tests".to_string(),
            ));
        }
        Ok(())
    }
}

/// Build a topology whose apps all run `command` in `dir`.
pub fn topology_in(dir: &Path, namespace: &str, names: &[&str]) -> Topology {
    let apps = names
        .iter()
        .map(|name| AppSpec::new(*name, dir, format!("run-{name}")))
        .collect();
    Topology::new(namespace, apps).unwrap()
}
