//! hubtrail library
//!
//! A GitHub repository browser with OAuth sign-in, repository search, and a
//! local visit history. The crate is organized around a small lifecycle state
//! machine: every screen owns a tracker, registers its cancelable operations
//! with disposable registries, and renders from broadcast state cells fed
//! through a single dispatcher.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_accessible() {
        assert_eq!(constants::env::CLIENT_ID, "GITHUB_CLIENT_ID");
        assert!(constants::http::USER_AGENT.contains("hubtrail"));
    }

    #[test]
    fn test_error_types() {
        let api_error = errors::ApiError::NoSearchResult;
        let app_error = AppError::Api(api_error);

        assert_eq!(app_error.category(), "api");
        assert!(app_error.is_recoverable());
    }
}
