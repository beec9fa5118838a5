//! Error types for hubtrail
//!
//! This module defines the error types for all components of the application.
//! Recoverable errors (transport failures, empty search results) are converted
//! into display messages at the view-model boundary; everything else surfaces
//! through the aggregated [`AppError`].

use thiserror::Error;

use crate::constants::messages;

/// GitHub API and transport errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed (connect, timeout, body read, JSON decode)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success status
    #[error("GitHub returned HTTP {status}")]
    Status { status: u16 },

    /// Rate limit exceeded after retries
    #[error("Rate limit exceeded. Server responded with HTTP 429")]
    RateLimitExceeded,

    /// Maximum retries exceeded
    #[error("Maximum retry attempts ({max_retries}) exceeded for request")]
    MaxRetriesExceeded { max_retries: u32 },

    /// A search completed but matched nothing. Modeled as an error so it
    /// flows through the same message channel as transport failures.
    #[error("No search result")]
    NoSearchResult,

    /// OAuth token exchange returned no token
    #[error("Access token missing from OAuth response")]
    MissingAccessToken,

    /// Invalid URL constructed from path segments
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Client-side rate limiter configured with a zero quota
    #[error("Rate limit must be non-zero")]
    InvalidRateLimit,
}

/// Credential store errors
#[derive(Error, Debug)]
pub enum TokenError {
    /// File I/O error reading or writing the token file
    #[error("Failed to access token file")]
    Io(#[from] std::io::Error),

    /// Token file is not valid TOML
    #[error("Token file is malformed")]
    Malformed(#[from] toml::de::Error),

    /// Token file could not be serialized
    #[error("Token file could not be written")]
    Serialize(#[from] toml::ser::Error),

    /// No platform config directory available
    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

/// Local history store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying SQLite error
    #[error("History database error")]
    Sqlite(#[from] rusqlite::Error),

    /// Blocking task running the database operation was cancelled or panicked
    #[error("History database task failed")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// Store directory could not be created
    #[error("Failed to prepare history database directory")]
    Io(#[from] std::io::Error),
}

/// Lifecycle contract violations
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Transition not permitted by the lifecycle state machine
    #[error("Invalid lifecycle transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    /// A cancelable operation was registered on a destroyed component
    #[error("Cannot register a disposable: component lifecycle is {state}")]
    RegistryUnavailable { state: &'static str },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file is not valid TOML
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Configuration could not be serialized for first-run initialization
    #[error("Configuration could not be written")]
    Serialize(#[from] toml::ser::Error),

    /// I/O error reading or writing the configuration file
    #[error("Failed to access configuration file")]
    Io(#[from] std::io::Error),

    /// Missing OAuth client settings
    #[error(
        "Missing OAuth client settings. Set GITHUB_CLIENT_ID and GITHUB_CLIENT_SECRET or fill in the [oauth] section of the config file"
    )]
    MissingOauth,

    /// No platform config directory available
    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// API error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Credential store error
    #[error(transparent)]
    Token(#[from] TokenError),

    /// History store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Lifecycle contract violation
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Check if the error is recoverable at the view-model boundary,
    /// i.e. should be shown as a message rather than propagated
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Api(_))
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Api(_) => "api",
            AppError::Token(_) => "token",
            AppError::Store(_) => "store",
            AppError::Lifecycle(_) => "lifecycle",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// API result type alias
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Credential store result type alias
pub type TokenResult<T> = std::result::Result<T, TokenError>;

/// History store result type alias
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Lifecycle result type alias
pub type LifecycleResult<T> = std::result::Result<T, LifecycleError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Convert an error into the text shown in a screen's message area.
///
/// Falls back to a fixed string when the error renders to nothing, so the
/// message cell never receives an empty message for a real failure.
pub fn display_message(error: &dyn std::error::Error) -> String {
    let text = error.to_string();
    if text.is_empty() {
        messages::UNEXPECTED_ERROR.to_string()
    } else {
        text
    }
}
