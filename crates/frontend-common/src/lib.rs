//! Client-side authentication session manager
//!
//! Holds the access/refresh tokens and the current user, mirrors them to
//! persistent storage, refreshes expired access tokens and guards
//! navigation. Start from [`AuthContext::builder`].

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod navigation;
pub mod observable;
pub mod services;
pub mod storage;

#[cfg(target_arch = "wasm32")]
pub mod logging;

pub use auth::{
    AuthContext, ErrorDescriptor, ErrorDisposition, GuardOutcome, GuardState, RouteTable,
    SessionState,
};
pub use client::create_api_client;
pub use config::AuthConfig;
pub use error::AuthError;
pub use navigation::{MemoryRouter, NavigationError, Navigator, Router};
pub use services::AuthApiService;
pub use storage::{MemoryStore, NullStore, PersistentStore};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;

#[cfg(target_arch = "wasm32")]
pub use {logging::init_browser_tracing, navigation::BrowserRouter, storage::LocalStore};
