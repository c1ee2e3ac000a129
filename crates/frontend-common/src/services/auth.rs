//! Authentication API service
//!
//! Bridges the typed HTTP client and [`SessionState`]: successful responses
//! are written into the session, failures come back as [`AuthError`].

use checker_http::ApiClient;
use checker_http::types::{LoginForm, RegisterForm, TokenPair};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::auth::state::SessionState;
use crate::error::AuthError;

/// Result of the most recent completed refresh
#[derive(Default)]
struct RefreshFlight {
    generation: u64,
    outcome: Option<Result<(), AuthError>>,
}

/// Authentication API service
pub struct AuthApiService {
    client: ApiClient,
    state: Arc<SessionState>,
    refresh_flight: Mutex<RefreshFlight>,
    completed_refreshes: AtomicU64,
    user_fetches: AtomicU64,
    /// Sequence number of the lookup whose user is currently stored
    stored_user_fetch: AtomicU64,
}

impl AuthApiService {
    /// Create a new auth API service
    pub fn new(client: ApiClient, state: Arc<SessionState>) -> Self {
        Self {
            client,
            state,
            refresh_flight: Mutex::new(RefreshFlight::default()),
            completed_refreshes: AtomicU64::new(0),
            user_fetches: AtomicU64::new(0),
            stored_user_fetch: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> &Arc<SessionState> {
        &self.state
    }

    /// Create an account; the session is not touched
    #[instrument(name = "register", skip_all, fields(username = %form.username))]
    pub async fn register(&self, form: &RegisterForm) -> Result<(), AuthError> {
        self.client.register(form).await.map_err(|e| {
            let err = AuthError::registration(&e);
            warn!(error = %err, "Registration rejected");
            err
        })?;

        info!("Registration accepted");
        Ok(())
    }

    /// Log in, store both tokens, then load the current user
    ///
    /// A failing user lookup fails the login but leaves the stored tokens in
    /// place.
    #[instrument(name = "login", skip_all, fields(username = %form.username))]
    pub async fn login(&self, form: &LoginForm) -> Result<TokenPair, AuthError> {
        let epoch = self.state.epoch();
        let tokens = self.client.login(form).await.map_err(|e| {
            let err = AuthError::login(&e);
            warn!(error = %err, "Login rejected");
            err
        })?;

        let stored = self.state.apply_if_current(epoch, |state| {
            state.set_access_token(&tokens.access);
            state.set_refresh_token(&tokens.refresh);
        });
        if !stored {
            return Err(AuthError::SessionCleared);
        }
        info!("Logged in");

        self.fetch_current_user().await?;
        Ok(tokens)
    }

    /// Obtain a new access token with the stored refresh token
    ///
    /// Concurrent callers share one request: whoever arrives while a refresh
    /// is in flight waits for it and receives its outcome.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let observed = self.completed_refreshes.load(Ordering::Acquire);
        let mut flight = self.refresh_flight.lock().await;

        if flight.generation != observed {
            if let Some(outcome) = &flight.outcome {
                debug!("Joined a refresh that finished while waiting");
                return outcome.clone();
            }
        }

        let outcome = self.refresh_once().await;
        flight.generation += 1;
        flight.outcome = Some(outcome.clone());
        self.completed_refreshes
            .store(flight.generation, Ordering::Release);
        outcome
    }

    #[instrument(name = "refresh", skip_all)]
    async fn refresh_once(&self) -> Result<(), AuthError> {
        // epoch before token: a clear in between must invalidate the response
        let epoch = self.state.epoch();
        let refresh = self
            .state
            .refresh_token()
            .ok_or(AuthError::NoRefreshToken)?;

        let response = self.client.refresh_token(&refresh).await.map_err(|e| {
            let err = AuthError::refresh(&e);
            warn!(error = %err, "Token refresh rejected");
            err
        })?;

        // the refresh token is long-lived and not rotated
        if self
            .state
            .apply_if_current(epoch, |state| state.set_access_token(&response.access))
        {
            info!("Access token refreshed");
            Ok(())
        } else {
            debug!("Discarding refresh response for a cleared session");
            Err(AuthError::SessionCleared)
        }
    }

    /// Load the user the current access token belongs to
    ///
    /// When several lookups overlap, a result is stored unless a lookup that
    /// started later has already stored its own. `Ok` always means a user is
    /// stored.
    #[instrument(name = "fetch_current_user", skip_all)]
    pub async fn fetch_current_user(&self) -> Result<(), AuthError> {
        let epoch = self.state.epoch();
        let token = self
            .state
            .access_token()
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::NoAccessToken)?;
        let seq = self.user_fetches.fetch_add(1, Ordering::SeqCst) + 1;

        let user = self.client.current_user(&token).await.map_err(|e| {
            let err = AuthError::fetch_user(&e);
            warn!(error = %err, "User lookup rejected");
            err
        })?;

        let username = user.username.clone();
        let mut superseded = false;
        let current = self.state.apply_if_current(epoch, |state| {
            // serialized with other completions by the epoch lock
            if self.stored_user_fetch.fetch_max(seq, Ordering::SeqCst) < seq {
                state.set_user(user);
            } else {
                superseded = true;
            }
        });

        match (current, superseded) {
            (false, _) => {
                debug!("Discarding user lookup for a cleared session");
                Err(AuthError::SessionCleared)
            }
            (true, true) => {
                debug!(seq, "A newer lookup already stored the user");
                Ok(())
            }
            (true, false) => {
                debug!(%username, "Stored current user");
                Ok(())
            }
        }
    }
}
