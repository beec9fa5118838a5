//! hubtrail CLI application
//!
//! Command-line interface for searching GitHub repositories, viewing
//! repository details, and browsing the local visit history.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use hubtrail::cli::{handle_auth, handle_history, handle_repo, handle_search, Cli, Commands};
use hubtrail::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    init_logging(&cli);

    info!("hubtrail v{} starting", env!("CARGO_PKG_VERSION"));

    let config_override = cli.global.config.clone();
    match cli.command {
        Commands::Auth(args) => {
            info!("Executing auth command");
            handle_auth(args, config_override).await
        }
        Commands::Search(args) => {
            info!("Executing search command");
            handle_search(args, config_override).await
        }
        Commands::Repo(args) => {
            info!("Executing repo command");
            handle_repo(args, config_override).await
        }
        Commands::History(args) => {
            info!("Executing history command");
            handle_history(args, config_override).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("hubtrail={}", log_level).parse().expect("valid directive"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .init();
}
