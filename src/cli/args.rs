//! Command-line argument parsing for hubtrail
//!
//! This module defines the CLI structure using clap derive macros, mapping
//! each screen of the application to a subcommand.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// hubtrail - browse GitHub repositories from the terminal
#[derive(Parser, Debug)]
#[command(
    name = "hubtrail",
    version,
    about = "Search GitHub repositories and keep a local visit history",
    long_about = "A GitHub repository browser with OAuth sign-in, repository search, \
and a local history of every repository you have viewed."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage GitHub sign-in
    Auth(AuthArgs),

    /// Search repositories
    Search(SearchArgs),

    /// Show one repository and record the visit
    Repo(RepoArgs),

    /// Manage the local visit history
    History(HistoryArgs),
}

/// Arguments for authentication management
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub action: AuthAction,
}

/// Authentication actions
#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Sign in by exchanging an OAuth authorization code
    Login {
        /// Authorization code from the browser redirect. Prompted for when
        /// omitted.
        #[arg(long)]
        code: Option<String>,
    },

    /// Show whether an access token is stored
    Status,

    /// Remove the stored access token
    Logout,
}

/// Arguments for the search command
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query, e.g. "rust http client"
    pub query: String,
}

/// Arguments for the repo command
#[derive(Args, Debug)]
pub struct RepoArgs {
    /// Owner login, e.g. "rust-lang"
    pub owner: String,

    /// Repository name, e.g. "rust"
    pub name: String,
}

/// Arguments for history management
#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub action: HistoryAction,
}

/// History management actions
#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List visited repositories, most recent first
    List,

    /// Remove every history record
    Clear,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}
