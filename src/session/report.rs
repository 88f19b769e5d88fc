// ABOUTME: Per-app outcome reporting for ensure, status and teardown runs

use crate::config::Topology;
use crate::models::{SessionHandle, SessionId, WindowBinding, WindowRef};
use std::fmt;

/// Why an app did not end up with a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The app's configuration could not be used (e.g. missing directory)
    Config,
    /// tmux refused to create the window
    WindowCreate,
    /// tmux could not be queried while handling the app
    Driver,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Config => "config error",
            Self::WindowCreate => "window create error",
            Self::Driver => "driver error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppOutcome {
    Created(WindowRef),
    AlreadyRunning(WindowRef),
    Failed { kind: FailureKind, reason: String },
}

impl AppOutcome {
    pub fn failed(kind: FailureKind, reason: impl fmt::Display) -> Self {
        Self::Failed {
            kind,
            reason: reason.to_string(),
        }
    }

    pub fn window(&self) -> Option<&WindowRef> {
        match self {
            Self::Created(window) | Self::AlreadyRunning(window) => Some(window),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.window().is_some()
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::AlreadyRunning(_) => "already running",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppReport {
    pub app_name: String,
    pub outcome: AppOutcome,
}

/// Aggregate result of `ensure_session`, one entry per app in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub handle: SessionHandle,
    pub apps: Vec<AppReport>,
    /// Whether this run created the session rather than reusing one.
    pub session_created: bool,
    /// Set when the session could not be surfaced in a terminal.
    pub presenter_warning: Option<String>,
}

impl SessionReport {
    pub fn new(session_id: SessionId, session_created: bool, apps: Vec<AppReport>) -> Self {
        let bindings = apps
            .iter()
            .filter_map(|app| {
                app.outcome.window().map(|window| WindowBinding {
                    app_name: app.app_name.clone(),
                    window: window.clone(),
                })
            })
            .collect();

        Self {
            handle: SessionHandle {
                session_id,
                bindings,
            },
            apps,
            session_created,
            presenter_warning: None,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.handle.session_id
    }

    pub fn outcome(&self, app_name: &str) -> Option<&AppOutcome> {
        self.apps
            .iter()
            .find(|a| a.app_name == app_name)
            .map(|a| &a.outcome)
    }

    /// Whether every app failed, each for the given reason.
    pub fn all_failed_with(&self, kind: FailureKind) -> bool {
        !self.apps.is_empty()
            && self.apps.iter().all(|a| {
                matches!(&a.outcome, AppOutcome::Failed { kind: failed, .. } if *failed == kind)
            })
    }

    pub fn created_count(&self) -> usize {
        self.apps
            .iter()
            .filter(|a| matches!(a.outcome, AppOutcome::Created(_)))
            .count()
    }

    pub fn already_running_count(&self) -> usize {
        self.apps
            .iter()
            .filter(|a| matches!(a.outcome, AppOutcome::AlreadyRunning(_)))
            .count()
    }

    pub fn succeeded_apps(&self) -> Vec<&str> {
        self.apps
            .iter()
            .filter(|a| a.outcome.is_success())
            .map(|a| a.app_name.as_str())
            .collect()
    }

    pub fn failed_apps(&self) -> Vec<&str> {
        self.apps
            .iter()
            .filter(|a| !a.outcome.is_success())
            .map(|a| a.app_name.as_str())
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.apps.iter().any(|a| !a.outcome.is_success())
    }
}

fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names.map(str::len).max().unwrap_or(0).max("APP".len())
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.session_created {
            "created"
        } else {
            "existing"
        };
        writeln!(f, "Session {} ({})", self.session_id(), state)?;

        let width = name_width(self.apps.iter().map(|a| a.app_name.as_str()));
        writeln!(f, "  {:<width$}  {:<15}  DETAIL", "APP", "STATUS")?;
        for app in &self.apps {
            let detail = match &app.outcome {
                AppOutcome::Created(w) | AppOutcome::AlreadyRunning(w) => {
                    format!("window {} ({})", w.index, w.id)
                }
                AppOutcome::Failed { kind, reason } => format!("{kind}: {reason}"),
            };
            writeln!(
                f,
                "  {:<width$}  {:<15}  {}",
                app.app_name,
                app.outcome.label(),
                detail
            )?;
        }

        if let Some(warning) = &self.presenter_warning {
            writeln!(f, "warning: {warning}")?;
        }
        Ok(())
    }
}

/// Read-only view of how the live session compares to the topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub session_id: SessionId,
    pub session_exists: bool,
    /// Each app with its window, if one is running.
    pub apps: Vec<(String, Option<WindowRef>)>,
    /// Windows in the session that no app in the topology claims.
    pub extra_windows: Vec<WindowRef>,
}

impl StatusReport {
    pub fn new(
        session_id: SessionId,
        session_exists: bool,
        topology: &Topology,
        windows: Vec<WindowRef>,
    ) -> Self {
        let apps = topology
            .apps()
            .iter()
            .map(|app| {
                let window = windows.iter().find(|w| w.name == app.name()).cloned();
                (app.name().to_string(), window)
            })
            .collect();
        let extra_windows = windows
            .into_iter()
            .filter(|w| !topology.contains(&w.name))
            .collect();

        Self {
            session_id,
            session_exists,
            apps,
            extra_windows,
        }
    }

    pub fn missing_apps(&self) -> Vec<&str> {
        self.apps
            .iter()
            .filter(|(_, window)| window.is_none())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.session_exists {
            return writeln!(f, "Session {} is not running", self.session_id);
        }

        writeln!(f, "Session {}", self.session_id)?;
        let width = name_width(
            self.apps
                .iter()
                .map(|(name, _)| name.as_str())
                .chain(self.extra_windows.iter().map(|w| w.name.as_str())),
        );
        writeln!(f, "  {:<width$}  {:<15}  WINDOW", "APP", "STATUS")?;
        for (name, window) in &self.apps {
            match window {
                Some(w) => writeln!(f, "  {:<width$}  {:<15}  {} ({})", name, "running", w.index, w.id)?,
                None => writeln!(f, "  {:<width$}  {:<15}  -", name, "missing")?,
            }
        }
        for w in &self.extra_windows {
            writeln!(
                f,
                "  {:<width$}  {:<15}  {} ({})",
                w.name, "not in topology", w.index, w.id
            )?;
        }
        Ok(())
    }
}
