//! Data models for hubtrail
//!
//! This module defines the payload types exchanged with the GitHub REST API.
//! The wire shapes are owned by GitHub; only the fields the application
//! renders or persists are deserialized.

use serde::{Deserialize, Serialize};

/// Owner of a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoOwner {
    /// Login name, e.g. `rust-lang`
    pub login: String,
    /// Avatar image URL
    pub avatar_url: String,
}

/// A GitHub repository as returned by the search and detail endpoints
///
/// `full_name` (`owner/name`) is the unique key, both remotely and in the
/// local visit history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repo {
    /// Short repository name
    pub name: String,
    /// Unique `owner/name` identifier
    pub full_name: String,
    /// Repository owner
    pub owner: RepoOwner,
    /// Free-form description, absent for many repositories
    pub description: Option<String>,
    /// Primary language, absent for empty repositories
    pub language: Option<String>,
    /// Last update timestamp, ISO 8601 as sent by GitHub
    pub updated_at: String,
    /// Star count
    #[serde(rename = "stargazers_count")]
    pub stars: u64,
}

/// Response of the repository search endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoSearchResponse {
    /// Total number of matches, which may exceed `items.len()`
    pub total_count: u64,
    /// First page of matching repositories
    pub items: Vec<Repo>,
}

/// Response of the OAuth access token exchange
///
/// GitHub reports a bad or expired code with a 200 response carrying an
/// error body instead of a token, hence the optional field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    /// The granted token, absent when the exchange failed
    #[serde(default)]
    pub access_token: Option<String>,
}
