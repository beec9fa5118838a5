use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use tempfile::TempDir;

use crate::app::client::{AuthTokenApi, RepoApi};
use crate::app::models::{Repo, RepoOwner, RepoSearchResponse};
use crate::app::store::{HistoryStore, TokenStore};
use crate::app::task::Dispatcher;
use crate::constants::messages;
use crate::errors::{ApiError, ApiResult};

use super::{HomeViewModel, RepositoryViewModel, SearchViewModel, SignInViewModel};

fn sample_repo(full_name: &str) -> Repo {
    let (owner, name) = full_name.split_once('/').unwrap();
    Repo {
        name: name.to_string(),
        full_name: full_name.to_string(),
        owner: RepoOwner {
            login: owner.to_string(),
            avatar_url: format!("https://avatars.example/{owner}"),
        },
        description: Some("a repository".to_string()),
        language: Some("Rust".to_string()),
        updated_at: "2024-01-01T00:00:00Z".to_string(),
        stars: 7,
    }
}

/// Scripted API double; every call resolves after a small delay so tests
/// can dispose handles while a request is in flight.
struct FakeApi {
    search: Mutex<ApiResult<RepoSearchResponse>>,
    repo: Mutex<ApiResult<Repo>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeApi {
    fn returning_search(result: ApiResult<RepoSearchResponse>) -> Arc<Self> {
        Arc::new(Self {
            search: Mutex::new(result),
            repo: Mutex::new(Err(ApiError::NoSearchResult)),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    fn returning_repo(result: ApiResult<Repo>) -> Arc<Self> {
        Arc::new(Self {
            search: Mutex::new(Err(ApiError::NoSearchResult)),
            repo: Mutex::new(result),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    fn slow_search(result: ApiResult<RepoSearchResponse>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            search: Mutex::new(result),
            repo: Mutex::new(Err(ApiError::NoSearchResult)),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    fn set_search(&self, result: ApiResult<RepoSearchResponse>) {
        *self.search.lock().unwrap() = result;
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RepoApi for FakeApi {
    fn search_repositories(&self, _query: &str) -> BoxFuture<'static, ApiResult<RepoSearchResponse>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = take_scripted(&self.search);
        let delay = self.delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result
        })
    }

    fn get_repository(&self, _owner: &str, _name: &str) -> BoxFuture<'static, ApiResult<Repo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = take_scripted(&self.repo);
        let delay = self.delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result
        })
    }
}

fn take_scripted<T: Clone>(slot: &Mutex<ApiResult<T>>) -> ApiResult<T> {
    match &*slot.lock().unwrap() {
        Ok(value) => Ok(value.clone()),
        Err(ApiError::NoSearchResult) => Err(ApiError::NoSearchResult),
        Err(ApiError::Status { status }) => Err(ApiError::Status { status: *status }),
        Err(other) => panic!("unsupported scripted error: {other}"),
    }
}

struct FakeAuth {
    result: ApiResult<String>,
}

impl AuthTokenApi for FakeAuth {
    fn request_access_token(
        &self,
        _client_id: &str,
        _client_secret: &str,
        _code: &str,
    ) -> BoxFuture<'static, ApiResult<String>> {
        let result = match &self.result {
            Ok(token) => Ok(token.clone()),
            Err(_) => Err(ApiError::MissingAccessToken),
        };
        Box::pin(async move { result })
    }
}

async fn settle(dispatcher: &Dispatcher) {
    // Let worker tasks finish, then drain the delivery queue.
    tokio::time::sleep(Duration::from_millis(30)).await;
    dispatcher.flush().await;
}

#[tokio::test]
async fn test_search_success_replaces_results() {
    let api = FakeApi::returning_search(Ok(RepoSearchResponse {
        total_count: 2,
        items: vec![sample_repo("rust-lang/rust"), sample_repo("tokio-rs/tokio")],
    }));
    let history = Arc::new(HistoryStore::open_in_memory().unwrap());
    let dispatcher = Dispatcher::spawn();
    let vm = SearchViewModel::new(api, history, dispatcher.clone());

    let _op = vm.search_repositories("rust");
    assert_eq!(vm.is_loading.latest(), Some(true));

    settle(&dispatcher).await;

    let results = vm.search_results.latest().unwrap().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(vm.last_search_keyword.latest(), Some(Some("rust".to_string())));
    assert_eq!(vm.is_loading.latest(), Some(false));
    assert_eq!(vm.message.latest(), Some(None));
}

#[tokio::test]
async fn test_search_empty_result_becomes_message() {
    let api = FakeApi::returning_search(Ok(RepoSearchResponse {
        total_count: 0,
        items: vec![],
    }));
    let history = Arc::new(HistoryStore::open_in_memory().unwrap());
    let dispatcher = Dispatcher::spawn();
    let vm = SearchViewModel::new(api, history, dispatcher.clone());

    let _op = vm.search_repositories("nothing-matches-this");
    settle(&dispatcher).await;

    assert_eq!(vm.search_results.latest(), Some(None));
    assert_eq!(
        vm.message.latest(),
        Some(Some("No search result".to_string()))
    );
    assert_eq!(vm.is_loading.latest(), Some(false));
}

#[tokio::test]
async fn test_search_http_error_shows_fallback_message() {
    let api = FakeApi::returning_search(Err(ApiError::Status { status: 500 }));
    let history = Arc::new(HistoryStore::open_in_memory().unwrap());
    let dispatcher = Dispatcher::spawn();
    let vm = SearchViewModel::new(api, history, dispatcher.clone());

    let _op = vm.search_repositories("rust");
    settle(&dispatcher).await;

    let message = vm.message.latest().unwrap().unwrap();
    assert!(!message.is_empty());
    // The keyword cell records only searches that produced results.
    assert_eq!(vm.last_search_keyword.latest(), Some(None));
    assert_eq!(vm.is_loading.latest(), Some(false));
}

#[tokio::test]
async fn test_failed_search_keeps_previous_keyword() {
    let api = FakeApi::returning_search(Ok(RepoSearchResponse {
        total_count: 1,
        items: vec![sample_repo("rust-lang/rust")],
    }));
    let history = Arc::new(HistoryStore::open_in_memory().unwrap());
    let dispatcher = Dispatcher::spawn();
    let vm = SearchViewModel::new(api.clone(), history, dispatcher.clone());

    let _op = vm.search_repositories("rust");
    settle(&dispatcher).await;
    assert_eq!(vm.last_search_keyword.latest(), Some(Some("rust".to_string())));

    // Script the next search to come back empty.
    api.set_search(Ok(RepoSearchResponse {
        total_count: 0,
        items: vec![],
    }));
    let _op = vm.search_repositories("nothing-matches-this");
    settle(&dispatcher).await;

    assert_eq!(
        vm.message.latest(),
        Some(Some("No search result".to_string()))
    );
    assert_eq!(vm.last_search_keyword.latest(), Some(Some("rust".to_string())));
}

#[tokio::test]
async fn test_disposed_search_delivers_nothing() {
    let api = FakeApi::slow_search(
        Ok(RepoSearchResponse {
            total_count: 1,
            items: vec![sample_repo("rust-lang/rust")],
        }),
        Duration::from_millis(50),
    );
    let history = Arc::new(HistoryStore::open_in_memory().unwrap());
    let dispatcher = Dispatcher::spawn();
    let vm = SearchViewModel::new(api, history, dispatcher.clone());

    let op = vm.search_repositories("rust");
    op.dispose();

    tokio::time::sleep(Duration::from_millis(100)).await;
    dispatcher.flush().await;

    // Neither the results nor the terminal loading flip arrive.
    assert_eq!(vm.search_results.latest(), Some(None));
    assert_eq!(vm.is_loading.latest(), Some(true));
}

#[tokio::test]
async fn test_add_to_history_persists_visit() {
    let api = FakeApi::returning_search(Err(ApiError::NoSearchResult));
    let history = Arc::new(HistoryStore::open_in_memory().unwrap());
    let dispatcher = Dispatcher::spawn();
    let vm = SearchViewModel::new(api, history.clone(), dispatcher.clone());

    let _op = vm.add_to_history(&sample_repo("rust-lang/rust"));
    settle(&dispatcher).await;

    let stored = history.load_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].full_name, "rust-lang/rust");
}

#[tokio::test]
async fn test_sign_in_stores_token_and_lowers_loading() {
    let dir = TempDir::new().unwrap();
    let tokens = Arc::new(TokenStore::new(dir.path().join("token.toml")));
    let auth = Arc::new(FakeAuth {
        result: Ok("gho_test".to_string()),
    });
    let dispatcher = Dispatcher::spawn();
    let vm = SignInViewModel::new(auth, tokens.clone(), dispatcher.clone());

    let _op = vm.request_access_token("id", "secret", "code");
    assert_eq!(vm.is_loading.latest(), Some(true));
    settle(&dispatcher).await;

    assert_eq!(
        vm.access_token.latest(),
        Some(Some("gho_test".to_string()))
    );
    assert_eq!(vm.is_loading.latest(), Some(false));
    assert_eq!(tokens.token().unwrap(), Some("gho_test".to_string()));
}

#[tokio::test]
async fn test_sign_in_error_becomes_message() {
    let dir = TempDir::new().unwrap();
    let tokens = Arc::new(TokenStore::new(dir.path().join("token.toml")));
    let auth = Arc::new(FakeAuth {
        result: Err(ApiError::MissingAccessToken),
    });
    let dispatcher = Dispatcher::spawn();
    let vm = SignInViewModel::new(auth, tokens.clone(), dispatcher.clone());

    let _op = vm.request_access_token("id", "secret", "bad-code");
    settle(&dispatcher).await;

    assert_eq!(vm.access_token.latest(), None);
    assert!(vm.message.latest().unwrap().is_some());
    assert_eq!(vm.is_loading.latest(), Some(false));
    assert_eq!(tokens.token().unwrap(), None);
}

#[tokio::test]
async fn test_load_access_token_reads_stored_token() {
    let dir = TempDir::new().unwrap();
    let tokens = Arc::new(TokenStore::new(dir.path().join("token.toml")));
    tokens.update("gho_saved").unwrap();
    let auth = Arc::new(FakeAuth {
        result: Err(ApiError::MissingAccessToken),
    });
    let dispatcher = Dispatcher::spawn();
    let vm = SignInViewModel::new(auth, tokens, dispatcher.clone());

    let _op = vm.load_access_token();
    settle(&dispatcher).await;

    assert_eq!(
        vm.access_token.latest(),
        Some(Some("gho_saved".to_string()))
    );
}

#[tokio::test]
async fn test_load_access_token_with_empty_store_stays_signed_out() {
    let dir = TempDir::new().unwrap();
    let tokens = Arc::new(TokenStore::new(dir.path().join("token.toml")));
    // An empty stored token reads the same as no token at all.
    tokens.update("").unwrap();
    let auth = Arc::new(FakeAuth {
        result: Err(ApiError::MissingAccessToken),
    });
    let dispatcher = Dispatcher::spawn();
    let vm = SignInViewModel::new(auth, tokens, dispatcher.clone());

    let _op = vm.load_access_token();
    settle(&dispatcher).await;

    // Checked and found nothing: the screen stays on sign-in.
    assert_eq!(vm.access_token.latest(), Some(None));
    assert_eq!(vm.message.latest(), None);
}

#[tokio::test]
async fn test_home_empty_history_shows_placeholder() {
    let history = Arc::new(HistoryStore::open_in_memory().unwrap());
    let dispatcher = Dispatcher::spawn();
    let vm = HomeViewModel::new(history, dispatcher.clone());

    let _watch = vm.observe_history();
    settle(&dispatcher).await;

    assert_eq!(vm.repositories.latest(), Some(vec![]));
    assert_eq!(
        vm.message.latest(),
        Some(Some(messages::NO_RECENT_REPOSITORIES.to_string()))
    );
}

#[tokio::test]
async fn test_home_sees_history_writes_while_observed() {
    let history = Arc::new(HistoryStore::open_in_memory().unwrap());
    let dispatcher = Dispatcher::spawn();
    let vm = HomeViewModel::new(history.clone(), dispatcher.clone());

    let _watch = vm.observe_history();
    history.upsert(&sample_repo("rust-lang/rust")).unwrap();
    settle(&dispatcher).await;

    let repos = vm.repositories.latest().unwrap();
    assert_eq!(repos.len(), 1);
    assert_eq!(vm.message.latest(), Some(None));
}

#[tokio::test]
async fn test_home_reobserve_picks_up_missed_writes() {
    let history = Arc::new(HistoryStore::open_in_memory().unwrap());
    let dispatcher = Dispatcher::spawn();
    let vm = HomeViewModel::new(history.clone(), dispatcher.clone());

    let watch = vm.observe_history();
    settle(&dispatcher).await;
    watch.dispose();

    // Written while nobody is observing.
    history.upsert(&sample_repo("tokio-rs/tokio")).unwrap();
    settle(&dispatcher).await;
    assert_eq!(vm.repositories.latest(), Some(vec![]));

    // Re-observing replays the current list.
    let _watch = vm.observe_history();
    settle(&dispatcher).await;
    assert_eq!(vm.repositories.latest().unwrap().len(), 1);
}

#[tokio::test]
async fn test_home_clear_history_empties_list() {
    let history = Arc::new(HistoryStore::open_in_memory().unwrap());
    history.upsert(&sample_repo("rust-lang/rust")).unwrap();
    let dispatcher = Dispatcher::spawn();
    let vm = HomeViewModel::new(history, dispatcher.clone());

    let _watch = vm.observe_history();
    let _op = vm.clear_history();
    settle(&dispatcher).await;

    assert_eq!(vm.repositories.latest(), Some(vec![]));
    assert_eq!(
        vm.message.latest(),
        Some(Some(messages::NO_RECENT_REPOSITORIES.to_string()))
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_home_clear_failure_becomes_message() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.db");
    {
        let history = HistoryStore::open(&path).unwrap();
        history.upsert(&sample_repo("rust-lang/rust")).unwrap();
    }

    // SQLite falls back to read-only on a write-protected file, so the
    // delete fails while opening and reading still work.
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o444);
    std::fs::set_permissions(&path, perms).unwrap();

    let history = Arc::new(HistoryStore::open(&path).unwrap());
    let dispatcher = Dispatcher::spawn();
    let vm = HomeViewModel::new(history.clone(), dispatcher.clone());

    let _watch = vm.observe_history();
    let _op = vm.clear_history();
    settle(&dispatcher).await;

    // The failure surfaces as a message; the list is untouched.
    assert!(vm.message.latest().unwrap().is_some());
    assert_eq!(vm.repositories.latest().unwrap().len(), 1);
    assert_eq!(history.load_all().unwrap().len(), 1);
}

#[tokio::test]
async fn test_repository_detail_success() {
    let api = FakeApi::returning_repo(Ok(sample_repo("rust-lang/rust")));
    let dispatcher = Dispatcher::spawn();
    let vm = RepositoryViewModel::new(api.clone(), dispatcher.clone());

    let _op = vm.request_repository("rust-lang", "rust");
    assert_eq!(vm.is_loading.latest(), Some(true));
    settle(&dispatcher).await;

    let repo = vm.repository.latest().unwrap().unwrap();
    assert_eq!(repo.full_name, "rust-lang/rust");
    assert_eq!(vm.is_loading.latest(), Some(false));
    assert_eq!(api.call_count(), 1);
}

#[tokio::test]
async fn test_repository_detail_error_becomes_message() {
    let api = FakeApi::returning_repo(Err(ApiError::Status { status: 404 }));
    let dispatcher = Dispatcher::spawn();
    let vm = RepositoryViewModel::new(api, dispatcher.clone());

    let _op = vm.request_repository("rust-lang", "missing");
    settle(&dispatcher).await;

    assert_eq!(vm.repository.latest(), Some(None));
    assert!(vm.message.latest().unwrap().is_some());
    assert_eq!(vm.is_loading.latest(), Some(false));
}
