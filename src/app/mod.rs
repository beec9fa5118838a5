//! Core application logic for hubtrail
//!
//! This module contains the main application components: the lifecycle state
//! machine with its disposable registries, the cancelable task and dispatcher
//! primitives, broadcast state cells, the GitHub API client, local stores,
//! and the per-screen view-models.
//!
//! # Examples
//!
//! ```rust,no_run
//! use hubtrail::app::client::{ClientConfig, GithubClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GithubClient::new(&ClientConfig::default(), Some("token".into()))?;
//! let response = client.search_repositories("rust").await?;
//! for repo in response.items {
//!     println!("{} ({} stars)", repo.full_name, repo.stars);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cell;
pub mod client;
pub mod lifecycle;
pub mod models;
pub mod store;
pub mod task;
pub mod viewmodel;

// Re-export main public API
pub use cell::StateCell;
pub use client::{AuthTokenApi, ClientConfig, GithubClient, RepoApi};
pub use lifecycle::{
    AutoActivatedTask, ClearMode, DisposableRegistry, LifecycleEvent, LifecycleObserver,
    LifecycleState, LifecycleTracker,
};
pub use models::{AccessTokenResponse, Repo, RepoOwner, RepoSearchResponse};
pub use store::{HistoryStore, TokenStore};
pub use task::{CancelFlag, Dispatcher, Disposable};
pub use viewmodel::{HomeViewModel, RepositoryViewModel, SearchViewModel, SignInViewModel};
