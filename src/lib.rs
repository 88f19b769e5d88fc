// ABOUTME: Library crate for devplexer exposing the orchestration engine for the CLI and tests

pub mod cli;
pub mod config;
pub mod models;
pub mod presenter;
pub mod session;
pub mod tmux;
