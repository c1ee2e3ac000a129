//! Checker HTTP client
//!
//! Typed access to the four backend endpoints the session manager depends on:
//! registration, login, token refresh and the current-user lookup.

pub mod client;
pub mod types;

pub use client::{ApiClient, ApiClientBuilder, error::ClientError};
