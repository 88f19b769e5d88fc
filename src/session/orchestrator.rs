// ABOUTME: Session orchestrator reconciling a topology against live tmux state
// Creates one window per app, never restarts or removes existing windows

use super::error::OrchestratorError;
use super::report::{AppOutcome, AppReport, FailureKind, SessionReport, StatusReport};
use crate::config::{AppSpec, ConfigError, Topology};
use crate::models::{SessionId, WindowRef};
use crate::presenter::TerminalPresenter;
use crate::tmux::{MultiplexerDriver, NewWindow, TmuxError};
use tracing::{debug, info, warn};

pub struct SessionOrchestrator<D> {
    driver: D,
    presenter: Box<dyn TerminalPresenter>,
}

fn new_window(app: &AppSpec) -> NewWindow<'_> {
    NewWindow {
        name: app.name(),
        working_directory: app.working_directory(),
        command: app.command(),
    }
}

/// Fail before any mutation if an app's directory is missing.
pub fn validate_working_directories(topology: &Topology) -> Result<(), ConfigError> {
    match topology
        .apps()
        .iter()
        .find(|app| !app.working_directory().is_dir())
    {
        Some(app) => Err(ConfigError::MissingWorkingDirectory {
            app: app.name().to_string(),
            path: app.working_directory().to_path_buf(),
        }),
        None => Ok(()),
    }
}

impl<D: MultiplexerDriver> SessionOrchestrator<D> {
    pub fn new(driver: D, presenter: Box<dyn TerminalPresenter>) -> Self {
        Self { driver, presenter }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Make sure every app in the topology has a window in the namespace's session.
    ///
    /// A missing session is created with windows in declaration order. An
    /// existing session only gets windows for apps that have none; windows
    /// already present, including ones for apps no longer declared, are left
    /// running. Per-app failures do not roll back other windows and surface
    /// as `OrchestratorError::PartialSession`.
    pub async fn ensure_session(
        &self,
        topology: &Topology,
    ) -> Result<SessionReport, OrchestratorError> {
        let session_id = SessionId::derive(topology.namespace())?;
        info!(
            "Ensuring session {} with {} apps",
            session_id,
            topology.apps().len()
        );

        let exists = self
            .driver
            .session_exists(&session_id)
            .await
            .map_err(OrchestratorError::DriverUnavailable)?;

        let (session_created, outcomes) = if exists {
            info!("Session {} already exists, reconciling", session_id);
            (false, self.reconcile(&session_id, topology.apps()).await)
        } else {
            validate_working_directories(topology)?;
            self.create_fresh(&session_id, topology).await?
        };

        let apps = topology
            .apps()
            .iter()
            .zip(outcomes)
            .map(|(app, outcome)| AppReport {
                app_name: app.name().to_string(),
                outcome,
            })
            .collect();
        let mut report = SessionReport::new(session_id, session_created, apps);

        if report.handle.bindings.is_empty() && report.all_failed_with(FailureKind::Driver) {
            return Err(OrchestratorError::DriverUnavailable(TmuxError::Unavailable(
                format!(
                    "session {} could not be queried for any app",
                    report.session_id()
                ),
            )));
        }

        if !report.handle.bindings.is_empty() {
            report.presenter_warning = self.present(report.session_id());
        }

        if report.has_failures() {
            warn!(
                "Session {} is missing apps: {}",
                report.session_id(),
                report.failed_apps().join(", ")
            );
            return Err(OrchestratorError::PartialSession(Box::new(report)));
        }
        Ok(report)
    }

    /// Compare the topology with the live session without changing anything.
    pub async fn status(&self, topology: &Topology) -> Result<StatusReport, OrchestratorError> {
        let session_id = SessionId::derive(topology.namespace())?;
        let exists = self
            .driver
            .session_exists(&session_id)
            .await
            .map_err(OrchestratorError::DriverUnavailable)?;

        let windows = if exists {
            match self.driver.list_windows(&session_id).await {
                Ok(windows) => windows,
                Err(TmuxError::SessionNotFound(_)) => Vec::new(),
                Err(e) => return Err(OrchestratorError::DriverUnavailable(e)),
            }
        } else {
            Vec::new()
        };

        Ok(StatusReport::new(session_id, exists, topology, windows))
    }

    /// Kill the namespace's session. Returns whether there was one to kill.
    pub async fn teardown(&self, topology: &Topology) -> Result<bool, OrchestratorError> {
        let session_id = SessionId::derive(topology.namespace())?;
        let exists = self
            .driver
            .session_exists(&session_id)
            .await
            .map_err(OrchestratorError::DriverUnavailable)?;
        if !exists {
            info!("Session {} is not running, nothing to tear down", session_id);
            return Ok(false);
        }

        match self.driver.kill_session(&session_id).await {
            Ok(()) => Ok(true),
            Err(TmuxError::SessionNotFound(_)) => Ok(false),
            Err(e) => Err(OrchestratorError::DriverUnavailable(e)),
        }
    }

    // Each app is tried in turn as the session's first window, so an app tmux
    // rejects does not keep the apps after it from starting.
    async fn create_fresh(
        &self,
        session_id: &SessionId,
        topology: &Topology,
    ) -> Result<(bool, Vec<AppOutcome>), OrchestratorError> {
        let apps = topology.apps();
        let mut outcomes = Vec::with_capacity(apps.len());
        let mut last_error = None;

        for (position, app) in apps.iter().enumerate() {
            match self.driver.create_session(session_id, &new_window(app)).await {
                Ok(window) => {
                    info!("Started {} in new session {}", app.name(), session_id);
                    outcomes.push(AppOutcome::Created(window));
                    outcomes.extend(self.reconcile(session_id, &apps[position + 1..]).await);
                    return Ok((true, outcomes));
                }
                // Another invocation won the race; its session is as good as ours.
                Err(TmuxError::SessionExists(_)) => {
                    warn!("Session {} appeared concurrently, reconciling", session_id);
                    outcomes.extend(self.reconcile(session_id, &apps[position..]).await);
                    return Ok((false, outcomes));
                }
                Err(e) if e.is_unavailable() => {
                    return Err(OrchestratorError::DriverUnavailable(e));
                }
                Err(e) => {
                    if self.driver.session_exists(session_id).await.unwrap_or(false) {
                        warn!("Session {} exists despite error: {}", session_id, e);
                        outcomes.extend(self.reconcile(session_id, &apps[position..]).await);
                        return Ok((true, outcomes));
                    }
                    warn!("Failed to start session {} with {}: {}", session_id, app.name(), e);
                    outcomes.push(AppOutcome::failed(FailureKind::WindowCreate, &e));
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(OrchestratorError::SessionCreate(e)),
            None => Err(ConfigError::NoApps.into()),
        }
    }

    async fn reconcile(&self, session_id: &SessionId, apps: &[AppSpec]) -> Vec<AppOutcome> {
        let mut outcomes = Vec::with_capacity(apps.len());
        for app in apps {
            outcomes.push(self.ensure_app(session_id, app).await);
        }
        outcomes
    }

    // Re-reads the window list right before creating, since tmux may have
    // changed since the last call.
    async fn ensure_app(&self, session_id: &SessionId, app: &AppSpec) -> AppOutcome {
        match self.find_window(session_id, app.name()).await {
            Ok(Some(window)) => {
                debug!("App {} already running in window {}", app.name(), window.id);
                return AppOutcome::AlreadyRunning(window);
            }
            Ok(None) => {}
            Err(e) => return AppOutcome::failed(FailureKind::Driver, e),
        }

        if !app.working_directory().is_dir() {
            let err = ConfigError::MissingWorkingDirectory {
                app: app.name().to_string(),
                path: app.working_directory().to_path_buf(),
            };
            warn!("{}", err);
            return AppOutcome::failed(FailureKind::Config, err);
        }

        match self.driver.create_window(session_id, &new_window(app)).await {
            Ok(window) => {
                info!("Started {} in window {}", app.name(), window.id);
                AppOutcome::Created(window)
            }
            Err(TmuxError::WindowExists(_)) => match self.find_window(session_id, app.name()).await
            {
                Ok(Some(window)) => AppOutcome::AlreadyRunning(window),
                Ok(None) => AppOutcome::failed(
                    FailureKind::WindowCreate,
                    format!("window {} reported as existing but not found", app.name()),
                ),
                Err(e) => AppOutcome::failed(FailureKind::Driver, e),
            },
            Err(e) => {
                warn!("Failed to start {}: {}", app.name(), e);
                AppOutcome::failed(FailureKind::WindowCreate, e)
            }
        }
    }

    async fn find_window(
        &self,
        session_id: &SessionId,
        name: &str,
    ) -> Result<Option<WindowRef>, TmuxError> {
        let windows = self.driver.list_windows(session_id).await?;
        Ok(windows.into_iter().find(|w| w.name == name))
    }

    fn present(&self, session_id: &SessionId) -> Option<String> {
        debug!("Presenting session {} via {}", session_id, self.presenter.name());
        match self.presenter.focus_session(session_id) {
            Ok(()) => None,
            Err(e) => {
                warn!("Could not focus session {}: {}", session_id, e);
                Some(e.to_string())
            }
        }
    }
}
