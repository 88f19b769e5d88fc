// ABOUTME: Topology configuration loading for devplexer
// Parses devplexer.yaml into an ordered set of apps and validates it

pub mod error;
pub mod topology;

pub use error::{AppSpecError, ConfigError};
pub use topology::{
    resolve_config_path, resolve_working_directory, AppSpec, Topology, DEFAULT_CONFIG_FILE,
    DEFAULT_NAMESPACE,
};
