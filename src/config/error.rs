// ABOUTME: Error types for loading and validating a topology

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration file content: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Namespace must not be empty")]
    EmptyNamespace,

    #[error("Topology declares no apps")]
    NoApps,

    #[error("Duplicate app name: {0}")]
    DuplicateApp(String),

    #[error("Invalid app definitions: {}", join_errors(.0))]
    InvalidApps(Vec<AppSpecError>),

    #[error("Working directory for app '{app}' does not exist: {}", path.display())]
    MissingWorkingDirectory { app: String, path: PathBuf },
}

/// Problem with a single entry under `apps`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppSpecError {
    #[error("app name must be a string, found {0}")]
    InvalidName(String),

    #[error("app '{0}' is malformed: {1}")]
    InvalidStructure(String, String),

    #[error("app '{0}' has no command")]
    MissingCommand(String),
}

fn join_errors(errors: &[AppSpecError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
