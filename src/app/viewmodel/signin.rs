//! Sign-in screen view-model

use std::sync::Arc;

use tracing::warn;

use crate::app::cell::StateCell;
use crate::app::client::AuthTokenApi;
use crate::app::store::TokenStore;
use crate::app::task::{spawn_op, Dispatcher, Disposable};
use crate::errors::{display_message, TokenError, TokenResult};

/// View-model backing the sign-in screen
///
/// The access token cell stays empty until a token is known; the screen
/// navigates to the main screen as soon as a non-empty token arrives.
pub struct SignInViewModel {
    auth_api: Arc<dyn AuthTokenApi>,
    tokens: Arc<TokenStore>,
    dispatcher: Dispatcher,
    /// Latest known access token; `Some(None)` means "checked, not signed in"
    pub access_token: StateCell<Option<String>>,
    /// Latest error message, or `None` to hide the message area
    pub message: StateCell<Option<String>>,
    /// Whether an operation is in flight
    pub is_loading: StateCell<bool>,
}

impl SignInViewModel {
    /// Create the view-model with its collaborators
    pub fn new(
        auth_api: Arc<dyn AuthTokenApi>,
        tokens: Arc<TokenStore>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            auth_api,
            tokens,
            dispatcher,
            access_token: StateCell::new(),
            message: StateCell::new(),
            is_loading: StateCell::with_value(false),
        }
    }

    /// Load the token stored on this device, if any
    pub fn load_access_token(&self) -> Disposable {
        let tokens = self.tokens.clone();
        let access_token = self.access_token.clone();
        let message = self.message.clone();

        spawn_op(
            &self.dispatcher,
            async move {
                run_blocking(move || tokens.token()).await
            },
            move |result: TokenResult<Option<String>>| match result {
                Ok(token) => access_token.push(token),
                Err(err) => {
                    warn!(error = %err, "failed to read stored token");
                    message.push(Some(display_message(&err)));
                }
            },
        )
    }

    /// Exchange an OAuth authorization code for an access token, persisting
    /// it on success
    pub fn request_access_token(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> Disposable {
        self.is_loading.push(true);

        let request = self
            .auth_api
            .request_access_token(client_id, client_secret, code);
        let tokens = self.tokens.clone();
        let access_token = self.access_token.clone();
        let message = self.message.clone();
        let is_loading = self.is_loading.clone();

        spawn_op(
            &self.dispatcher,
            async move {
                let token = request.await?;
                // Persist off the dispatcher thread. A failed write is not
                // fatal: the token still works for this session.
                let stored = token.clone();
                if let Err(err) = run_blocking(move || tokens.update(&stored)).await {
                    warn!(error = %err, "failed to persist access token");
                }
                Ok(token)
            },
            move |result: crate::errors::ApiResult<String>| {
                match result {
                    Ok(token) => access_token.push(Some(token)),
                    Err(err) => message.push(Some(display_message(&err))),
                }
                is_loading.push(false);
            },
        )
    }
}

async fn run_blocking<T: Send + 'static>(
    f: impl FnOnce() -> TokenResult<T> + Send + 'static,
) -> TokenResult<T> {
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(join) => Err(TokenError::Io(std::io::Error::other(join))),
    }
}
