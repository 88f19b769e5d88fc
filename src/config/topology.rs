// ABOUTME: Topology model and YAML loading
// Turns a devplexer.yaml document into an ordered, validated list of apps

use super::error::{AppSpecError, ConfigError};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "devplexer.yaml";
pub const DEFAULT_NAMESPACE: &str = "devplexer";

/// One app: a shell command and the directory it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSpec {
    name: String,
    working_directory: PathBuf,
    command: String,
}

impl AppSpec {
    pub fn new(
        name: impl Into<String>,
        working_directory: impl Into<PathBuf>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            working_directory: working_directory.into(),
            command: command.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

/// The declared set of apps for one project, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    namespace: String,
    apps: Vec<AppSpec>,
}

#[derive(Debug, Deserialize)]
struct RawTopology {
    namespace: Option<String>,
    apps: serde_yaml::Mapping,
}

#[derive(Debug, Deserialize)]
struct RawAppSpec {
    command: Option<String>,
    working_directory: Option<PathBuf>,
}

impl Topology {
    pub fn new(namespace: impl Into<String>, apps: Vec<AppSpec>) -> Result<Self, ConfigError> {
        let namespace = namespace.into();
        if namespace.trim().is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }
        if apps.is_empty() {
            return Err(ConfigError::NoApps);
        }

        let mut seen = HashSet::new();
        let mut invalid = Vec::new();
        for app in &apps {
            if !seen.insert(app.name()) {
                return Err(ConfigError::DuplicateApp(app.name().to_string()));
            }
            if app.command().trim().is_empty() {
                invalid.push(AppSpecError::MissingCommand(app.name().to_string()));
            }
        }
        if !invalid.is_empty() {
            return Err(ConfigError::InvalidApps(invalid));
        }

        Ok(Self { namespace, apps })
    }

    /// Load a topology file. Relative working directories resolve against `base_dir`.
    pub fn load(path: &Path, base_dir: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_yaml_str(&contents, base_dir)
    }

    /// Parse a topology document, collecting every malformed app before failing.
    pub fn from_yaml_str(contents: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let raw: RawTopology = serde_yaml::from_str(contents)?;
        let namespace = raw
            .namespace
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        let mut apps = Vec::with_capacity(raw.apps.len());
        let mut failures = Vec::new();
        for (key, value) in raw.apps {
            let Some(name) = key.as_str() else {
                failures.push(AppSpecError::InvalidName(format!("{key:?}")));
                continue;
            };
            match app_from_value(name, value, base_dir) {
                Ok(app) => apps.push(app),
                Err(e) => failures.push(e),
            }
        }
        if !failures.is_empty() {
            return Err(ConfigError::InvalidApps(failures));
        }

        Self::new(namespace, apps)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn apps(&self) -> &[AppSpec] {
        &self.apps
    }

    pub fn app(&self, name: &str) -> Option<&AppSpec> {
        self.apps.iter().find(|a| a.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.app(name).is_some()
    }
}

fn app_from_value(
    name: &str,
    value: serde_yaml::Value,
    base_dir: &Path,
) -> Result<AppSpec, AppSpecError> {
    let raw: RawAppSpec = serde_yaml::from_value(value)
        .map_err(|e| AppSpecError::InvalidStructure(name.to_string(), e.to_string()))?;

    let command = raw
        .command
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppSpecError::MissingCommand(name.to_string()))?;

    let working_directory = match raw.working_directory {
        Some(dir) => resolve_working_directory(base_dir, &dir),
        None => base_dir.to_path_buf(),
    };

    Ok(AppSpec::new(name, working_directory, command))
}

/// Resolve a configured directory against the invocation directory.
///
/// Absolute paths pass through, `~` expands to the home directory and `.`
/// components are dropped. `..` is kept since symlinks make it unsafe to fold.
pub fn resolve_working_directory(base_dir: &Path, dir: &Path) -> PathBuf {
    let expanded = match dir.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => dir.to_path_buf(),
        },
        Err(_) => dir.to_path_buf(),
    };

    let joined = if expanded.is_absolute() {
        expanded
    } else {
        base_dir.join(expanded)
    };

    joined
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Pick the topology file: an explicit path (relative to the invocation
/// directory) or `devplexer.yaml` in the invocation directory.
pub fn resolve_config_path(invocation_dir: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => invocation_dir.join(path),
        None => invocation_dir.join(DEFAULT_CONFIG_FILE),
    }
}
