//! API contracts consumed by the view-models
//!
//! View-models depend on these object-safe traits rather than on the
//! concrete HTTP client, so tests can substitute canned responses. Each call
//! is asynchronous and resolves to exactly one result or one error.

use futures::future::BoxFuture;

use crate::app::models::{Repo, RepoSearchResponse};
use crate::errors::ApiResult;

/// Repository search and detail endpoints
pub trait RepoApi: Send + Sync {
    /// Search repositories matching `query`
    fn search_repositories(&self, query: &str) -> BoxFuture<'static, ApiResult<RepoSearchResponse>>;

    /// Fetch one repository by owner login and repository name
    fn get_repository(&self, owner: &str, name: &str) -> BoxFuture<'static, ApiResult<Repo>>;
}

/// OAuth access token exchange
pub trait AuthTokenApi: Send + Sync {
    /// Exchange an authorization code for an access token
    fn request_access_token(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> BoxFuture<'static, ApiResult<String>>;
}
