//! Command handlers for the hubtrail CLI
//!
//! Each handler plays the role of one screen: it builds a lifecycle tracker,
//! attaches disposable registries, wires a view-model, walks the tracker
//! through the visible states, and renders whatever the state cells hold
//! once the operation settles.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::app::cell::StateCell;
use crate::app::lifecycle::{AutoActivatedTask, ClearMode, DisposableRegistry, LifecycleTracker};
use crate::app::models::Repo;
use crate::app::store::{HistoryStore, TokenStore};
use crate::app::task::Dispatcher;
use crate::app::viewmodel::{HomeViewModel, RepositoryViewModel, SearchViewModel, SignInViewModel};
use crate::app::GithubClient;
use crate::config::AppConfig;
use crate::errors::{Result, TokenError};

use super::args::{AuthAction, AuthArgs, HistoryAction, HistoryArgs, RepoArgs, SearchArgs};

/// Handle the auth command and its subcommands
pub async fn handle_auth(args: AuthArgs, config_override: Option<PathBuf>) -> Result<()> {
    match args.action {
        AuthAction::Login { code } => handle_login(code, config_override).await,
        AuthAction::Status => {
            let tokens = TokenStore::default_location()?;
            match tokens.token()? {
                Some(_) => println!("Signed in. An access token is stored."),
                None => println!("Not signed in."),
            }
            Ok(())
        }
        AuthAction::Logout => {
            TokenStore::default_location()?.clear()?;
            println!("Signed out.");
            Ok(())
        }
    }
}

async fn handle_login(code: Option<String>, config_override: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_override)?;
    let (client_id, client_secret) = config.oauth_credentials()?;
    let client = GithubClient::new(&config.client_config(), None)?;

    println!("Open this URL in a browser and authorize the application:");
    println!("  {}", client.authorize_url(&client_id));

    let code = match code {
        Some(code) => code,
        None => rpassword::prompt_password("Authorization code: ").map_err(TokenError::Io)?,
    };

    let tokens = Arc::new(TokenStore::default_location()?);
    let dispatcher = Dispatcher::spawn();
    let tracker = Arc::new(LifecycleTracker::new());
    let ops = DisposableRegistry::attach(tracker.clone(), ClearMode::OnDestroy);
    let vm = SignInViewModel::new(Arc::new(client), tokens, dispatcher.clone());

    tracker.create()?;
    tracker.start()?;
    tracker.resume()?;

    ops.add(vm.request_access_token(&client_id, &client_secret, &code))?;
    wait_until_idle(&vm.is_loading, &dispatcher).await;

    match vm.access_token.latest().flatten() {
        Some(_) => {
            info!("token exchange succeeded");
            println!("Signed in.");
        }
        None => render_message(&vm.message),
    }

    finish(&tracker)
}

/// Handle the search command
pub async fn handle_search(args: SearchArgs, config_override: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_override)?;
    let token = TokenStore::default_location()?.token()?;
    let client = GithubClient::new(&config.client_config(), token)?;
    let history = Arc::new(HistoryStore::open(AppConfig::history_db_path()?)?);

    let dispatcher = Dispatcher::spawn();
    let tracker = Arc::new(LifecycleTracker::new());
    let ops = DisposableRegistry::attach(tracker.clone(), ClearMode::OnDestroy);
    let vm = SearchViewModel::new(Arc::new(client), history, dispatcher.clone());

    tracker.create()?;
    tracker.start()?;
    tracker.resume()?;

    ops.add(vm.search_repositories(&args.query))?;
    wait_until_idle(&vm.is_loading, &dispatcher).await;

    match vm.search_results.latest().flatten() {
        Some(repos) => {
            println!("{} repositories:", repos.len());
            for repo in &repos {
                render_repo_line(repo);
            }
            println!();
            println!("View one with: hubtrail repo <owner> <name>");
        }
        None => render_message(&vm.message),
    }

    finish(&tracker)
}

/// Handle the repo command: fetch details and record the visit
pub async fn handle_repo(args: RepoArgs, config_override: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_override)?;
    let token = TokenStore::default_location()?.token()?;
    let client = Arc::new(GithubClient::new(&config.client_config(), token)?);
    let history = Arc::new(HistoryStore::open(AppConfig::history_db_path()?)?);

    let dispatcher = Dispatcher::spawn();
    let tracker = Arc::new(LifecycleTracker::new());
    let ops = DisposableRegistry::attach(tracker.clone(), ClearMode::OnDestroy);
    let detail_vm = RepositoryViewModel::new(client.clone(), dispatcher.clone());
    // Visits are recorded through the search view-model, which owns the
    // history write path.
    let search_vm = SearchViewModel::new(client, history, dispatcher.clone());

    tracker.create()?;
    tracker.start()?;
    tracker.resume()?;

    ops.add(detail_vm.request_repository(&args.owner, &args.name))?;
    wait_until_idle(&detail_vm.is_loading, &dispatcher).await;

    match detail_vm.repository.latest().flatten() {
        Some(repo) => {
            ops.add(search_vm.add_to_history(&repo))?;
            render_repo_detail(&repo);
            dispatcher.flush().await;
        }
        None => render_message(&detail_vm.message),
    }

    finish(&tracker)
}

/// Handle the history command and its subcommands
pub async fn handle_history(args: HistoryArgs, _config_override: Option<PathBuf>) -> Result<()> {
    let history = Arc::new(HistoryStore::open(AppConfig::history_db_path()?)?);
    let dispatcher = Dispatcher::spawn();
    let tracker = Arc::new(LifecycleTracker::new());
    let ops = DisposableRegistry::attach(tracker.clone(), ClearMode::OnDestroy);
    let vm = Arc::new(HomeViewModel::new(history.clone(), dispatcher.clone()));

    // The history stream is live only while the screen is started; every
    // start opens a fresh subscription, picking up writes made in between.
    let watch_vm = vm.clone();
    let _auto = AutoActivatedTask::attach(&tracker, move || watch_vm.observe_history());

    tracker.create()?;
    tracker.start()?;
    tracker.resume()?;
    dispatcher.flush().await;

    match args.action {
        HistoryAction::List => {
            if let Some(message) = vm.message.latest().flatten() {
                println!("{message}");
            }
            if let Some(repos) = vm.repositories.latest() {
                for repo in &repos {
                    render_repo_line(repo);
                }
            }
        }
        HistoryAction::Clear => {
            ops.add(vm.clear_history())?;
            // The watch cell refreshes once the delete lands; a failed
            // delete surfaces through the message cell instead, so wait on
            // whichever arrives first.
            loop {
                if history.watch().latest().is_some_and(|repos| repos.is_empty()) {
                    dispatcher.flush().await;
                    println!("History cleared.");
                    break;
                }
                if vm.message.latest().flatten().is_some() {
                    dispatcher.flush().await;
                    render_message(&vm.message);
                    break;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        }
    }

    finish(&tracker)
}

/// Poll the loading cell until the in-flight operation settles, then drain
/// the dispatcher so every delivery has landed.
async fn wait_until_idle(is_loading: &StateCell<bool>, dispatcher: &Dispatcher) {
    while is_loading.latest() != Some(false) {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    dispatcher.flush().await;
}

/// Walk the tracker through teardown: this screen is finishing for good, so
/// every registry clears its handles on the way out.
fn finish(tracker: &LifecycleTracker) -> Result<()> {
    tracker.mark_finishing();
    tracker.pause()?;
    tracker.stop()?;
    tracker.destroy()?;
    Ok(())
}

fn render_message(message: &StateCell<Option<String>>) {
    if let Some(text) = message.latest().flatten() {
        eprintln!("{text}");
    }
}

fn render_repo_line(repo: &Repo) {
    let language = repo.language.as_deref().unwrap_or("-");
    println!("  {:<40} {:>8} stars  {}", repo.full_name, repo.stars, language);
}

fn render_repo_detail(repo: &Repo) {
    println!("{}", repo.full_name);
    println!("  owner:    {}", repo.owner.login);
    if let Some(description) = &repo.description {
        println!("  about:    {description}");
    }
    if let Some(language) = &repo.language {
        println!("  language: {language}");
    }
    println!("  stars:    {}", repo.stars);
    println!("  updated:  {}", repo.updated_at);
    println!("  url:      https://github.com/{}", repo.full_name);
}
