//! Main screen view-model showing the visit history

use std::sync::Arc;

use tracing::warn;

use crate::app::cell::StateCell;
use crate::app::models::Repo;
use crate::app::store::HistoryStore;
use crate::app::task::{spawn_op, CancelFlag, Dispatcher, Disposable};
use crate::constants::messages;
use crate::errors::{display_message, StoreError, StoreResult};

/// View-model backing the main screen
pub struct HomeViewModel {
    history: Arc<HistoryStore>,
    dispatcher: Dispatcher,
    /// Current visit history, most recent first
    pub repositories: StateCell<Vec<Repo>>,
    /// Empty-state or error message, or `None` to hide the message area
    pub message: StateCell<Option<String>>,
}

impl HomeViewModel {
    /// Create the view-model with its collaborators
    pub fn new(history: Arc<HistoryStore>, dispatcher: Dispatcher) -> Self {
        Self {
            history,
            dispatcher,
            repositories: StateCell::new(),
            message: StateCell::new(),
        }
    }

    /// Start mirroring the history store into this view-model's cells.
    ///
    /// Subscribing replays the current list immediately; every later write
    /// to the store is forwarded through the dispatcher. The returned handle
    /// stops the mirroring when disposed, so binding it to an activation
    /// window makes the list refresh whenever the screen comes back.
    pub fn observe_history(&self) -> Disposable {
        let dispatcher = self.dispatcher.clone();
        let repositories = self.repositories.clone();
        let message = self.message.clone();

        // Forwarded jobs carry the cancel flag so an update already queued
        // when the screen stops is dropped at execution time.
        let flag = CancelFlag::new();
        let guard = flag.clone();
        let subscription = self.history.watch().subscribe(move |repos: Vec<Repo>| {
            let repositories = repositories.clone();
            let message = message.clone();
            dispatcher.post_guarded(&guard, move || {
                if repos.is_empty() {
                    message.push(Some(messages::NO_RECENT_REPOSITORIES.to_string()));
                } else {
                    message.push(None);
                }
                repositories.push(repos);
            });
        });

        Disposable::with_flag(flag, move || subscription.dispose())
    }

    /// Remove every history record
    pub fn clear_history(&self) -> Disposable {
        let history = self.history.clone();
        let message = self.message.clone();

        spawn_op(
            &self.dispatcher,
            async move {
                match tokio::task::spawn_blocking(move || history.delete_all()).await {
                    Ok(result) => result,
                    Err(join) => Err(StoreError::TaskJoin(join)),
                }
            },
            move |result: StoreResult<()>| {
                if let Err(err) = result {
                    warn!(error = %err, "failed to clear visit history");
                    message.push(Some(display_message(&err)));
                }
            },
        )
    }
}
