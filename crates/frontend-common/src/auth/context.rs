//! Session context
//!
//! [`AuthContext`] owns every piece of the session manager and is handed to
//! whatever needs it, instead of living in process-wide singletons.
//!
//! Lifecycle:
//! 1. [`AuthContextBuilder::build`] hydrates the session from storage.
//! 2. [`AuthContext::init`] runs once at application start and sends hosts
//!    without a stored refresh token to the login route.
//! 3. [`AuthContext::navigate`] guards each route change;
//!    [`AuthContext::handle_error`] receives unhandled request errors.
//! 4. [`AuthContext::teardown`] releases in-memory state; persisted entries
//!    remain for the next start.

use checker_core::{ClientConfig, User};
use checker_http::{ApiClient, ClientError};
use std::sync::Arc;
use tracing::info;

use crate::auth::error_handler::{
    ErrorDescriptor, ErrorDisposition, ErrorInterceptor, end_session,
};
use crate::auth::guard::{GuardOutcome, NavigationGuard, RouteTable};
use crate::auth::state::SessionState;
use crate::client::create_api_client;
use crate::navigation::{NavigationError, Navigator, Router};
use crate::services::AuthApiService;
use crate::storage::PersistentStore;

/// The session manager for one running application
pub struct AuthContext {
    config: ClientConfig,
    state: Arc<SessionState>,
    auth: Arc<AuthApiService>,
    navigator: Arc<Navigator>,
    guard: NavigationGuard,
    interceptor: ErrorInterceptor,
}

impl AuthContext {
    pub fn builder() -> AuthContextBuilder {
        AuthContextBuilder::default()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> &Arc<SessionState> {
        &self.state
    }

    pub fn auth(&self) -> &Arc<AuthApiService> {
        &self.auth
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    pub fn interceptor(&self) -> &ErrorInterceptor {
        &self.interceptor
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.access_token()
    }

    pub fn user(&self) -> Option<User> {
        self.state.user()
    }

    /// Startup check; returns whether a login redirect was issued
    pub async fn init(&self) -> Result<bool, NavigationError> {
        let current = self.navigator.current_path();

        if self.state.refresh_token().is_some() || self.guard.routes().is_auth_route(&current) {
            return Ok(false);
        }

        info!(path = %current, "No stored session, redirecting to login");
        self.navigator.goto(&self.config.login_route).await?;
        Ok(true)
    }

    /// Guarded navigation to `path`
    ///
    /// Resolves only after the guard has decided and the router has moved to
    /// either `path` or the login route.
    pub async fn navigate(&self, path: &str) -> Result<GuardOutcome, NavigationError> {
        let outcome = self.guard.check(path).await;
        self.navigator.goto(outcome.target()).await?;
        Ok(outcome)
    }

    /// Entry point for unhandled request errors
    pub async fn handle_error(&self, error: &ErrorDescriptor) -> ErrorDisposition {
        self.interceptor.handle_error(error).await
    }

    /// End the session and go to the login route; safe without a session
    pub async fn logout(&self) {
        info!("Logging out");
        end_session(&self.state, &self.navigator, &self.config.login_route).await;
    }

    /// Release in-memory session values and reset transient flags
    pub fn teardown(&self) {
        self.state.release();
        self.navigator.reset();
        self.guard.reset();
    }
}

/// Builder for AuthContext
#[derive(Default)]
pub struct AuthContextBuilder {
    config: Option<ClientConfig>,
    store: Option<Arc<dyn PersistentStore>>,
    router: Option<Arc<dyn Router>>,
    client: Option<ApiClient>,
    routes: Option<RouteTable>,
}

impl AuthContextBuilder {
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn store(mut self, store: Arc<dyn PersistentStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn router(mut self, router: Arc<dyn Router>) -> Self {
        self.router = Some(router);
        self
    }

    /// Use a prepared client instead of building one from the config
    #[must_use]
    pub fn client(mut self, client: ApiClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Override the route table derived from the config
    #[must_use]
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = Some(routes);
        self
    }

    /// Hydrate the session and wire the components together
    pub fn build(self) -> Result<AuthContext, ClientError> {
        let config = self.config.unwrap_or_default();
        let client = match self.client {
            Some(client) => client,
            None => create_api_client(&config)?,
        };
        let store = self.store.unwrap_or_else(default_store);
        let router = self.router.unwrap_or_else(default_router);
        let routes = self
            .routes
            .unwrap_or_else(|| RouteTable::from_config(&config));

        let state = Arc::new(SessionState::hydrate(store));
        let auth = Arc::new(AuthApiService::new(client, Arc::clone(&state)));
        let navigator = Arc::new(Navigator::new(router, config.settle_delay()));
        let guard = NavigationGuard::new(
            routes,
            config.login_route.clone(),
            Arc::clone(&state),
            Arc::clone(&auth),
        );
        let interceptor = ErrorInterceptor::new(
            Arc::clone(&state),
            Arc::clone(&navigator),
            config.login_route.clone(),
        );

        Ok(AuthContext {
            config,
            state,
            auth,
            navigator,
            guard,
            interceptor,
        })
    }
}

#[cfg(target_arch = "wasm32")]
fn default_store() -> Arc<dyn PersistentStore> {
    Arc::new(crate::storage::LocalStore)
}

#[cfg(not(target_arch = "wasm32"))]
fn default_store() -> Arc<dyn PersistentStore> {
    Arc::new(crate::storage::NullStore)
}

#[cfg(target_arch = "wasm32")]
fn default_router() -> Arc<dyn Router> {
    Arc::new(crate::navigation::BrowserRouter)
}

#[cfg(not(target_arch = "wasm32"))]
fn default_router() -> Arc<dyn Router> {
    Arc::new(crate::navigation::MemoryRouter::default())
}
