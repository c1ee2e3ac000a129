//! Global auth error handler
//!
//! Every request failure in the application can be routed through
//! [`ErrorInterceptor`]. A 401 or 403 from anywhere ends the session and
//! sends the user to the login route; everything else is left to the caller.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::state::SessionState;
use crate::error::HttpStatus;
use crate::navigation::Navigator;

/// What the host knows about a failed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDescriptor {
    pub message: String,
    pub status: Option<u16>,
}

impl ErrorDescriptor {
    pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    pub fn from_error<E: HttpStatus + Display>(error: &E) -> Self {
        Self::new(error.to_string(), error.http_status())
    }

    pub const fn is_auth_failure(&self) -> bool {
        matches!(self.status, Some(401 | 403))
    }
}

/// What the interceptor did with an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDisposition {
    /// Session cleared and login navigation issued
    LoggedOut,
    /// Not an auth failure; left to the default handling
    Declined,
}

/// Clear everything and go to the login route; navigation failures are logged only
pub(crate) async fn end_session(state: &SessionState, navigator: &Navigator, login_route: &str) {
    state.clear();
    if let Err(e) = navigator.goto(login_route).await {
        warn!(error = %e, "Failed to navigate to login");
    }
}

/// Converts authentication failures anywhere into a forced logout
pub struct ErrorInterceptor {
    state: Arc<SessionState>,
    navigator: Arc<Navigator>,
    login_route: String,
}

impl ErrorInterceptor {
    pub fn new(
        state: Arc<SessionState>,
        navigator: Arc<Navigator>,
        login_route: impl Into<String>,
    ) -> Self {
        Self {
            state,
            navigator,
            login_route: login_route.into(),
        }
    }

    /// Handle a request error; never fails
    pub async fn handle_error(&self, error: &ErrorDescriptor) -> ErrorDisposition {
        if cfg!(debug_assertions) {
            debug!(status = ?error.status, message = %error.message, "Client error");
        }

        if !error.is_auth_failure() {
            return ErrorDisposition::Declined;
        }

        warn!(status = ?error.status, "Authentication rejected, ending session");
        end_session(&self.state, &self.navigator, &self.login_route).await;
        ErrorDisposition::LoggedOut
    }
}

/// Wrapper for API calls that handles auth errors
///
/// The call's error is returned unchanged after the interceptor has seen it.
pub async fn with_auth_error_handling<T, E, F>(
    interceptor: &ErrorInterceptor,
    api_call: F,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: HttpStatus + Display,
{
    match api_call.await {
        Ok(result) => Ok(result),
        Err(error) => {
            interceptor
                .handle_error(&ErrorDescriptor::from_error(&error))
                .await;
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::error::AuthError;
    use crate::navigation::{MemoryRouter, Router};
    use crate::storage::MemoryStore;
    use checker_core::User;
    use std::time::Duration;

    struct Fixture {
        store: Arc<MemoryStore>,
        router: Arc<MemoryRouter>,
        state: Arc<SessionState>,
        interceptor: ErrorInterceptor,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let router = Arc::new(MemoryRouter::new("/dashboard"));
        let state = Arc::new(SessionState::hydrate(store.clone()));
        let navigator = Arc::new(Navigator::new(router.clone(), Duration::ZERO));
        let interceptor = ErrorInterceptor::new(state.clone(), navigator, "/login");

        state.set_access_token("a1");
        state.set_refresh_token("r1");
        state.set_user(User {
            id: 1,
            username: "asha".to_string(),
            email: None,
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            role: "student".to_string(),
            registration_number: None,
        });

        Fixture {
            store,
            router,
            state,
            interceptor,
        }
    }

    #[tokio::test]
    async fn unauthorized_clears_everything_and_redirects() {
        let f = fixture();

        let disposition = f
            .interceptor
            .handle_error(&ErrorDescriptor::new("expired", Some(401)))
            .await;

        assert_eq!(disposition, ErrorDisposition::LoggedOut);
        assert_eq!(f.state.access_token(), None);
        assert_eq!(f.state.user(), None);
        for key in AuthConfig::SESSION_KEYS {
            assert!(!f.store.contains(key), "{key} should be removed");
        }
        assert_eq!(f.router.current_path(), "/login");
    }

    #[tokio::test]
    async fn forbidden_is_an_auth_failure_too() {
        let f = fixture();
        let disposition = f
            .interceptor
            .handle_error(&ErrorDescriptor::new("nope", Some(403)))
            .await;
        assert_eq!(disposition, ErrorDisposition::LoggedOut);
        assert_eq!(f.state.refresh_token(), None);
    }

    #[tokio::test]
    async fn other_statuses_are_declined() {
        let f = fixture();
        for status in [Some(404), Some(500), None] {
            let disposition = f
                .interceptor
                .handle_error(&ErrorDescriptor::new("boom", status))
                .await;
            assert_eq!(disposition, ErrorDisposition::Declined);
        }
        assert_eq!(f.state.access_token().as_deref(), Some("a1"));
        assert_eq!(f.router.history(), vec!["/dashboard"]);
    }

    #[tokio::test]
    async fn wrapper_returns_the_original_error() {
        let f = fixture();
        let call = async {
            Err::<(), _>(AuthError::FetchUser {
                status: Some(401),
                message: "expired".to_string(),
            })
        };

        let result = with_auth_error_handling(&f.interceptor, call).await;
        assert!(matches!(result, Err(AuthError::FetchUser { .. })));
        assert_eq!(f.router.current_path(), "/login");
    }
}
