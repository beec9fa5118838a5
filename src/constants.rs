//! Application constants for hubtrail
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names for OAuth client settings
pub mod env {
    /// Environment variable name for the GitHub OAuth client id
    pub const CLIENT_ID: &str = "GITHUB_CLIENT_ID";

    /// Environment variable name for the GitHub OAuth client secret
    pub const CLIENT_SECRET: &str = "GITHUB_CLIENT_SECRET";
}

/// GitHub service URLs and endpoints
pub mod github {
    /// GitHub REST API base URL
    pub const API_BASE_URL: &str = "https://api.github.com";

    /// GitHub web base URL, used for the OAuth flow
    pub const WEB_BASE_URL: &str = "https://github.com";

    /// Repository search endpoint path
    pub const SEARCH_REPOSITORIES_PATH: &str = "search/repositories";

    /// OAuth access token exchange endpoint path
    pub const ACCESS_TOKEN_PATH: &str = "login/oauth/access_token";

    /// OAuth authorization page path, shown to the user in a browser
    pub const AUTHORIZE_PATH: &str = "login/oauth/authorize";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests. GitHub rejects requests
    /// without one.
    pub const USER_AGENT: &str = concat!("hubtrail/", env!("CARGO_PKG_VERSION"));

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 8;
}

/// Rate limiting and retry configuration
pub mod limits {
    /// Default rate limit for GitHub requests (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 5;

    /// Maximum retry attempts for failed requests
    pub const MAX_RETRIES: u32 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const RETRY_BASE_DELAY_MS: u64 = 500;
}

/// User-facing message strings
pub mod messages {
    /// Fallback shown when an error has no message of its own
    pub const UNEXPECTED_ERROR: &str = "Unexpected error";

    /// Shown on the main screen when the visit history is empty
    pub const NO_RECENT_REPOSITORIES: &str = "No recent repositories.";
}

/// Local storage locations
pub mod storage {
    /// Directory name under the platform config dir
    pub const APP_DIR_NAME: &str = "hubtrail";

    /// Access token file name
    pub const TOKEN_FILE_NAME: &str = "token.toml";

    /// Configuration file name
    pub const CONFIG_FILE_NAME: &str = "config.toml";

    /// History database file name
    pub const HISTORY_DB_FILE_NAME: &str = "history.db";

    /// File permissions for the token file (Unix only) - owner read/write only
    #[cfg(unix)]
    pub const TOKEN_FILE_PERMISSIONS: u32 = 0o600;
}
