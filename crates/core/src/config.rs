//! Client configuration
//!
//! Values come from built-in defaults, an optional configuration file, and
//! `CHECKER_*` environment variables, in increasing order of precedence.
//! List values in the environment are comma separated, e.g.
//! `CHECKER_PROTECTED_ROUTES=/dashboard,/submissions`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::CoreResult;

const ENV_PREFIX: &str = "CHECKER";
const LIST_KEYS: [&str; 2] = ["auth_routes", "protected_routes"];

/// Session manager configuration shared by every host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend origin; empty means "same origin as the page"
    pub api_base_url: String,
    /// Where unauthenticated navigation is sent
    pub login_route: String,
    /// Routes the startup check never redirects away from
    pub auth_routes: Vec<String>,
    /// Routes that require a valid session
    pub protected_routes: Vec<String>,
    /// How long the navigating flag stays up after a transition completes
    pub navigation_settle_ms: u64,
    /// Per-request timeout (native hosts only)
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            login_route: "/login".to_string(),
            auth_routes: vec!["/login".to_string(), "/register".to_string()],
            protected_routes: vec!["/dashboard".to_string()],
            navigation_settle_ms: 300,
            request_timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Load configuration from file, layered over defaults and under the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let settings = Self::defaults()?
            .add_source(config::File::from(path.as_ref()))
            .add_source(Self::environment())
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load configuration with defaults and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed
    pub fn from_env() -> CoreResult<Self> {
        let settings = Self::defaults()?.add_source(Self::environment()).build()?;

        Ok(settings.try_deserialize()?)
    }

    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.navigation_settle_ms)
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn defaults() -> CoreResult<config::builder::ConfigBuilder<config::builder::DefaultState>> {
        let defaults = Self::default();

        Ok(config::Config::builder()
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default("login_route", defaults.login_route)?
            .set_default("auth_routes", defaults.auth_routes)?
            .set_default("protected_routes", defaults.protected_routes)?
            .set_default("navigation_settle_ms", defaults.navigation_settle_ms)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?)
    }

    fn environment() -> config::Environment {
        LIST_KEYS.iter().fold(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(","),
            |env, key| env.with_list_parse_key(key),
        )
    }
}
