// ABOUTME: Core data models for devplexer sessions and window bindings

pub mod session;

pub use session::{sanitize_tmux_name, SessionHandle, SessionId, WindowBinding, WindowRef};
