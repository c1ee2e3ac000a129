//! Checker core types and utilities

pub mod config;
pub mod error;
pub mod types;

pub use config::ClientConfig;
pub use error::{CoreError, CoreResult};
pub use types::{Role, TokenPair, User};
