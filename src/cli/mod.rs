//! Command-line interface components
//!
//! This module contains CLI-specific code for the hubtrail application:
//! argument parsing and the per-command screen handlers.

pub mod args;
pub mod commands;

pub use args::{
    AuthAction, AuthArgs, Cli, Commands, GlobalArgs, HistoryAction, HistoryArgs, RepoArgs,
    SearchArgs,
};
pub use commands::{handle_auth, handle_history, handle_repo, handle_search};
