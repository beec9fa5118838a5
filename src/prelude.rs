//! Prelude module for the hubtrail library
//!
//! Re-exports the most commonly used items so typical usage needs a single
//! `use hubtrail::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use hubtrail::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let tracker = Arc::new(LifecycleTracker::new());
//!     let registry = DisposableRegistry::attach(tracker.clone(), ClearMode::OnDestroy);
//!     tracker.create()?;
//!     tracker.destroy()?;
//!     # let _ = registry;
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Lifecycle machinery
pub use crate::app::lifecycle::{
    AutoActivatedTask, ClearMode, DisposableRegistry, LifecycleEvent, LifecycleObserver,
    LifecycleState, LifecycleTracker,
};

// Task and state primitives
pub use crate::app::cell::StateCell;
pub use crate::app::task::{spawn_op, CancelFlag, Dispatcher, Disposable};

// API client and data types
pub use crate::app::client::{AuthTokenApi, ClientConfig, GithubClient, RepoApi};
pub use crate::app::models::{Repo, RepoOwner, RepoSearchResponse};

// Stores and view-models
pub use crate::app::store::{HistoryStore, TokenStore};
pub use crate::app::viewmodel::{
    HomeViewModel, RepositoryViewModel, SearchViewModel, SignInViewModel,
};

// Configuration
pub use crate::config::AppConfig;

// Standard library re-exports that are commonly needed
pub use std::sync::Arc;
