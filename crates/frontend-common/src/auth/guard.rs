//! Route protection

use checker_core::ClientConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::auth::state::SessionState;
use crate::observable::Observable;
use crate::services::AuthApiService;

/// Which routes need a session, and which are the login/registration entry points
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: HashMap<String, bool>,
    auth_routes: Vec<String>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let table = config
            .protected_routes
            .iter()
            .fold(Self::new(), |table, path| table.protect(path));
        config
            .auth_routes
            .iter()
            .fold(table, |table, path| table.with_auth_route(path))
    }

    /// Mark `path` as requiring a session (exact match)
    #[must_use]
    pub fn protect(mut self, path: impl Into<String>) -> Self {
        self.routes.insert(path.into(), true);
        self
    }

    /// Mark `path` as explicitly open
    #[must_use]
    pub fn allow(mut self, path: impl Into<String>) -> Self {
        self.routes.insert(path.into(), false);
        self
    }

    #[must_use]
    pub fn with_auth_route(mut self, path: impl Into<String>) -> Self {
        self.auth_routes.push(path.into());
        self
    }

    pub fn requires_session(&self, path: &str) -> bool {
        self.routes.get(path).copied().unwrap_or(false)
    }

    /// Whether `path` is an auth entry route or below one
    pub fn is_auth_route(&self, path: &str) -> bool {
        self.auth_routes.iter().any(|route| {
            path.strip_prefix(route.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}

/// Where the guard is in checking the current navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardState {
    #[default]
    Idle,
    CheckingSession,
    Allowed,
    Redirecting,
}

/// Result of checking one navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Proceed to the requested path
    Allow(String),
    /// Go to the login route instead
    Redirect(String),
}

impl GuardOutcome {
    /// Path the navigation should actually end on
    pub fn target(&self) -> &str {
        match self {
            Self::Allow(path) | Self::Redirect(path) => path,
        }
    }

    pub const fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }
}

/// Checks every navigation against the route table before it completes
pub struct NavigationGuard {
    routes: RouteTable,
    login_route: String,
    session: Arc<SessionState>,
    auth: Arc<AuthApiService>,
    state: Observable<GuardState>,
}

impl NavigationGuard {
    pub fn new(
        routes: RouteTable,
        login_route: impl Into<String>,
        session: Arc<SessionState>,
        auth: Arc<AuthApiService>,
    ) -> Self {
        Self {
            routes,
            login_route: login_route.into(),
            session,
            auth,
            state: Observable::new(GuardState::Idle),
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn state(&self) -> GuardState {
        self.state.get()
    }

    pub fn watch_state(&self) -> watch::Receiver<GuardState> {
        self.state.subscribe()
    }

    /// Decide where a navigation to `path` may go
    ///
    /// Unprotected paths and sessions holding an access token pass straight
    /// through. Otherwise one refresh is attempted; any failure redirects.
    pub async fn check(&self, path: &str) -> GuardOutcome {
        self.state.set(GuardState::Idle);

        if !self.routes.requires_session(path) || self.session.has_access_token() {
            self.state.set(GuardState::Allowed);
            return GuardOutcome::Allow(path.to_string());
        }

        debug!(path, "No access token for protected route, refreshing");
        self.state.set(GuardState::CheckingSession);

        match self.auth.refresh().await {
            Ok(()) => {
                self.state.set(GuardState::Allowed);
                GuardOutcome::Allow(path.to_string())
            }
            Err(e) => {
                info!(path, error = %e, "Session unavailable, redirecting to login");
                self.state.set(GuardState::Redirecting);
                GuardOutcome::Redirect(self.login_route.clone())
            }
        }
    }

    pub fn reset(&self) {
        self.state.set(GuardState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protection_is_exact_match() {
        let routes = RouteTable::new().protect("/dashboard").allow("/about");
        assert!(routes.requires_session("/dashboard"));
        assert!(!routes.requires_session("/dashboard/"));
        assert!(!routes.requires_session("/dashboard/grades"));
        assert!(!routes.requires_session("/about"));
        assert!(!routes.requires_session("/unknown"));
    }

    #[test]
    fn auth_routes_cover_sub_paths_only() {
        let routes = RouteTable::new()
            .with_auth_route("/login")
            .with_auth_route("/register");
        assert!(routes.is_auth_route("/login"));
        assert!(routes.is_auth_route("/register/student"));
        assert!(!routes.is_auth_route("/login-help"));
        assert!(!routes.is_auth_route("/dashboard"));
    }

    #[test]
    fn table_from_default_config() {
        let routes = RouteTable::from_config(&ClientConfig::default());
        assert!(routes.requires_session("/dashboard"));
        assert!(routes.is_auth_route("/login"));
        assert!(routes.is_auth_route("/register"));
    }

    #[test]
    fn outcome_target() {
        assert_eq!(GuardOutcome::Allow("/a".into()).target(), "/a");
        let redirect = GuardOutcome::Redirect("/login".into());
        assert!(redirect.is_redirect());
        assert_eq!(redirect.target(), "/login");
    }
}
