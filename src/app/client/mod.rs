//! HTTP client implementation for the GitHub REST API
//!
//! This module provides the client used for repository search, repository
//! detail lookup, and the OAuth access token exchange, with rate limiting
//! and retry logic.
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: Core HTTP operations with resilience patterns
//! - `api`: Contracts the view-models consume

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::header::ACCEPT;
use reqwest::RequestBuilder;
use url::Url;

use crate::constants::github;
use crate::errors::{ApiError, ApiResult};

use super::models::{AccessTokenResponse, Repo, RepoSearchResponse};

// Module declarations
pub mod api;
pub mod config;
pub mod http;

pub use api::{AuthTokenApi, RepoApi};
pub use config::ClientConfig;

use http::HttpHandler;

struct ClientInner {
    http: HttpHandler,
    api_base: Url,
    web_base: Url,
    /// Access token attached to API requests when present
    token: Option<String>,
}

/// Client for the GitHub REST API
///
/// Cheap to clone; clones share the underlying connection pool and rate
/// limiter. Unauthenticated clients work for search and detail lookups at
/// GitHub's lower anonymous rate limits.
#[derive(Clone)]
pub struct GithubClient {
    inner: Arc<ClientInner>,
}

impl GithubClient {
    /// Creates a new client, optionally carrying an access token
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if HTTP client creation fails
    pub fn new(config: &ClientConfig, token: Option<String>) -> ApiResult<Self> {
        let client = config.build_http_client()?;
        let http = HttpHandler::new(client, config.rate_limit_rps)?;
        let api_base = Url::parse(github::API_BASE_URL).expect("API base URL should be valid");
        let web_base = Url::parse(github::WEB_BASE_URL).expect("web base URL should be valid");

        tracing::debug!(authenticated = token.is_some(), "created GitHub client");

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                api_base,
                web_base,
                token,
            }),
        })
    }

    /// The URL a user visits in a browser to authorize this application
    pub fn authorize_url(&self, client_id: &str) -> Url {
        let mut url = self
            .inner
            .web_base
            .join(github::AUTHORIZE_PATH)
            .expect("authorize path should be valid");
        url.query_pairs_mut().append_pair("client_id", client_id);
        url
    }

    fn api_url(&self, path: &str) -> ApiResult<Url> {
        self.inner
            .api_base
            .join(path)
            .map_err(|_| ApiError::InvalidUrl {
                url: format!("{}/{}", github::API_BASE_URL, path),
            })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.inner.token {
            Some(token) => request.header("Authorization", format!("token {token}")),
            None => request,
        }
    }

    /// Search repositories matching `query`
    pub async fn search_repositories(&self, query: &str) -> ApiResult<RepoSearchResponse> {
        let mut url = self.api_url(github::SEARCH_REPOSITORIES_PATH)?;
        url.query_pairs_mut().append_pair("q", query);
        self.get_json(url).await
    }

    /// Fetch one repository by owner login and repository name
    pub async fn get_repository(&self, owner: &str, name: &str) -> ApiResult<Repo> {
        let url = self.api_url(&format!("repos/{owner}/{name}"))?;
        self.get_json(url).await
    }

    /// Exchange an OAuth authorization code for an access token
    pub async fn request_access_token(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> ApiResult<String> {
        let url = self
            .inner
            .web_base
            .join(github::ACCESS_TOKEN_PATH)
            .map_err(|_| ApiError::InvalidUrl {
                url: format!("{}/{}", github::WEB_BASE_URL, github::ACCESS_TOKEN_PATH),
            })?;
        let form = [
            ("client_id", client_id.to_string()),
            ("client_secret", client_secret.to_string()),
            ("code", code.to_string()),
        ];

        let response: AccessTokenResponse = self
            .inner
            .http
            .request_json(|| {
                self.inner
                    .http
                    .client()
                    .post(url.clone())
                    // GitHub answers with form-encoded text unless JSON is
                    // requested explicitly.
                    .header(ACCEPT, "application/json")
                    .form(&form)
            })
            .await?;

        response.access_token.ok_or(ApiError::MissingAccessToken)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        self.inner
            .http
            .request_json(|| {
                self.authorize(
                    self.inner
                        .http
                        .client()
                        .get(url.clone())
                        .header(ACCEPT, "application/vnd.github+json"),
                )
            })
            .await
    }
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("authenticated", &self.inner.token.is_some())
            .finish()
    }
}

impl RepoApi for GithubClient {
    fn search_repositories(&self, query: &str) -> BoxFuture<'static, ApiResult<RepoSearchResponse>> {
        let client = self.clone();
        let query = query.to_string();
        Box::pin(async move { client.search_repositories(&query).await })
    }

    fn get_repository(&self, owner: &str, name: &str) -> BoxFuture<'static, ApiResult<Repo>> {
        let client = self.clone();
        let owner = owner.to_string();
        let name = name.to_string();
        Box::pin(async move { client.get_repository(&owner, &name).await })
    }
}

impl AuthTokenApi for GithubClient {
    fn request_access_token(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> BoxFuture<'static, ApiResult<String>> {
        let client = self.clone();
        let client_id = client_id.to_string();
        let client_secret = client_secret.to_string();
        let code = code.to_string();
        Box::pin(async move {
            client
                .request_access_token(&client_id, &client_secret, &code)
                .await
        })
    }
}
