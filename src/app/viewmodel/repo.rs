//! Repository detail view-model

use std::sync::Arc;

use crate::app::cell::StateCell;
use crate::app::client::RepoApi;
use crate::app::models::Repo;
use crate::app::task::{spawn_op, Dispatcher, Disposable};
use crate::errors::{display_message, ApiResult};

/// View-model backing the repository detail screen
pub struct RepositoryViewModel {
    api: Arc<dyn RepoApi>,
    dispatcher: Dispatcher,
    /// The repository being shown, once loaded
    pub repository: StateCell<Option<Repo>>,
    /// Latest error message, or `None` to hide the message area
    pub message: StateCell<Option<String>>,
    /// Whether the detail fetch is in flight
    pub is_loading: StateCell<bool>,
}

impl RepositoryViewModel {
    /// Create the view-model with its collaborators
    pub fn new(api: Arc<dyn RepoApi>, dispatcher: Dispatcher) -> Self {
        Self {
            api,
            dispatcher,
            repository: StateCell::new(),
            message: StateCell::new(),
            is_loading: StateCell::with_value(false),
        }
    }

    /// Fetch one repository's details
    pub fn request_repository(&self, owner: &str, name: &str) -> Disposable {
        self.message.push(None);
        self.is_loading.push(true);

        let request = self.api.get_repository(owner, name);
        let repository = self.repository.clone();
        let message = self.message.clone();
        let is_loading = self.is_loading.clone();

        spawn_op(
            &self.dispatcher,
            request,
            move |result: ApiResult<Repo>| {
                match result {
                    Ok(repo) => repository.push(Some(repo)),
                    Err(err) => message.push(Some(display_message(&err))),
                }
                is_loading.push(false);
            },
        )
    }
}
