//! Session manager errors

use checker_http::ClientError;
use thiserror::Error;

/// Errors surfaced by the auth service
///
/// Variants carry the HTTP status and message instead of the transport error
/// so that a single refresh outcome can be handed to every coalesced caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("No refresh token available")]
    NoRefreshToken,

    #[error("No access token available")]
    NoAccessToken,

    #[error("Failed to refresh access token: {message}")]
    Refresh { status: Option<u16>, message: String },

    #[error("Login failed: {message}")]
    Login { status: Option<u16>, message: String },

    #[error("Registration failed: {message}")]
    Registration { status: Option<u16>, message: String },

    #[error("Failed to fetch user data: {message}")]
    FetchUser { status: Option<u16>, message: String },

    /// Corrupt cached user record; recovered locally, never returned by the service
    #[error("Failed to parse stored user data: {0}")]
    StorageParse(String),

    /// The response arrived after the session it belonged to was cleared
    #[error("Session was cleared while the request was in flight")]
    SessionCleared,
}

impl AuthError {
    pub(crate) fn refresh(err: &ClientError) -> Self {
        Self::Refresh {
            status: err.status(),
            message: err.to_string(),
        }
    }

    pub(crate) fn login(err: &ClientError) -> Self {
        Self::Login {
            status: err.status(),
            message: err.to_string(),
        }
    }

    pub(crate) fn registration(err: &ClientError) -> Self {
        Self::Registration {
            status: err.status(),
            message: err.to_string(),
        }
    }

    pub(crate) fn fetch_user(err: &ClientError) -> Self {
        Self::FetchUser {
            status: err.status(),
            message: err.to_string(),
        }
    }

    /// HTTP status of the failed request, when the server answered
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Refresh { status, .. }
            | Self::Login { status, .. }
            | Self::Registration { status, .. }
            | Self::FetchUser { status, .. } => *status,
            Self::NoRefreshToken
            | Self::NoAccessToken
            | Self::StorageParse(_)
            | Self::SessionCleared => None,
        }
    }
}

/// Errors that may carry an HTTP status
pub trait HttpStatus {
    fn http_status(&self) -> Option<u16>;
}

impl HttpStatus for ClientError {
    fn http_status(&self) -> Option<u16> {
        self.status()
    }
}

impl HttpStatus for AuthError {
    fn http_status(&self) -> Option<u16> {
        self.status()
    }
}
