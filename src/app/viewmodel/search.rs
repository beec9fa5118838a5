//! Repository search view-model

use std::sync::Arc;

use tracing::warn;

use crate::app::cell::StateCell;
use crate::app::client::RepoApi;
use crate::app::models::Repo;
use crate::app::store::HistoryStore;
use crate::app::task::{spawn_op, Dispatcher, Disposable};
use crate::errors::{display_message, ApiError, ApiResult, StoreError, StoreResult};

/// View-model backing the search screen
pub struct SearchViewModel {
    api: Arc<dyn RepoApi>,
    history: Arc<HistoryStore>,
    dispatcher: Dispatcher,
    /// Result list for the latest search; `Some(None)` means "cleared"
    pub search_results: StateCell<Option<Vec<Repo>>>,
    /// Keyword of the search currently shown, restored on re-subscribe
    pub last_search_keyword: StateCell<Option<String>>,
    /// Latest error message, or `None` to hide the message area
    pub message: StateCell<Option<String>>,
    /// Whether a search is in flight
    pub is_loading: StateCell<bool>,
}

impl SearchViewModel {
    /// Create the view-model with its collaborators
    pub fn new(api: Arc<dyn RepoApi>, history: Arc<HistoryStore>, dispatcher: Dispatcher) -> Self {
        Self {
            api,
            history,
            dispatcher,
            search_results: StateCell::with_value(None),
            last_search_keyword: StateCell::with_value(None),
            message: StateCell::new(),
            is_loading: StateCell::with_value(false),
        }
    }

    /// Run one search, replacing any previous results.
    ///
    /// An empty result set is surfaced as an error message rather than an
    /// empty list, so the screen shows "No search result" instead of nothing.
    /// The keyword cell records only searches that produced results; a failed
    /// search leaves the previous keyword in place for re-subscribers.
    pub fn search_repositories(&self, query: &str) -> Disposable {
        self.search_results.push(None);
        self.message.push(None);
        self.is_loading.push(true);

        let request = self.api.search_repositories(query);
        let keyword = query.to_string();
        let search_results = self.search_results.clone();
        let last_search_keyword = self.last_search_keyword.clone();
        let message = self.message.clone();
        let is_loading = self.is_loading.clone();

        spawn_op(
            &self.dispatcher,
            async move {
                let response = request.await?;
                if response.total_count == 0 {
                    return Err(ApiError::NoSearchResult);
                }
                Ok(response.items)
            },
            move |result: ApiResult<Vec<Repo>>| {
                match result {
                    Ok(repos) => {
                        last_search_keyword.push(Some(keyword));
                        search_results.push(Some(repos));
                    }
                    Err(err) => message.push(Some(display_message(&err))),
                }
                is_loading.push(false);
            },
        )
    }

    /// Record a visit before navigating to the repository screen
    pub fn add_to_history(&self, repo: &Repo) -> Disposable {
        let history = self.history.clone();
        let repo = repo.clone();
        let message = self.message.clone();

        spawn_op(
            &self.dispatcher,
            async move {
                match tokio::task::spawn_blocking(move || history.upsert(&repo)).await {
                    Ok(result) => result,
                    Err(join) => Err(StoreError::TaskJoin(join)),
                }
            },
            move |result: StoreResult<()>| {
                if let Err(err) = result {
                    warn!(error = %err, "failed to record repository visit");
                    message.push(Some(display_message(&err)));
                }
            },
        )
    }
}
