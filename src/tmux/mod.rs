// ABOUTME: Host-based tmux driver
// Observes and mutates tmux sessions running directly on the host machine

pub mod client;
pub mod commands;
pub mod driver;
pub mod error;

pub use client::TmuxDriver;
pub use commands::attach_command;
pub use driver::{MultiplexerDriver, NewWindow};
pub use error::TmuxError;
