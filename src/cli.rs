// ABOUTME: Command line interface definition for devplexer

use crate::presenter::PresenterKind;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(
    name = "devplexer",
    version,
    about = "Start a project's local apps as windows of a single tmux session"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// How to open the session in a terminal once it is ready
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = PresenterKind::Auto,
        env = "DEVPLEXER_PRESENTER"
    )]
    pub presenter: PresenterKind,

    /// Leave the session detached instead of opening a terminal
    #[arg(long, global = true)]
    pub no_focus: bool,

    /// Also log to stderr, at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Create the session and any missing app windows (default)
    Up(TopologyArgs),
    /// Show which apps have a running window
    Status(TopologyArgs),
    /// Kill the session and every process in it
    Down(TopologyArgs),
}

#[derive(Debug, Clone, Default, Args, PartialEq, Eq)]
pub struct TopologyArgs {
    /// Topology file, relative to the current directory [default: devplexer.yaml]
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// The subcommand to run; a bare `devplexer` means `up`.
    pub fn resolved_command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Up(TopologyArgs::default()))
    }
}

impl Command {
    pub fn config(&self) -> Option<&Path> {
        match self {
            Self::Up(args) | Self::Status(args) | Self::Down(args) => args.config.as_deref(),
        }
    }
}
