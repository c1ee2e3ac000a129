//! CLI configuration utilities

use anyhow::{Context, Result};
use checker_core::ClientConfig;
use std::path::{Path, PathBuf};

const SESSION_FILE: &str = "session.json";

/// Data directory from the flag, or the platform data dir
pub fn resolve_data_dir(data_dir: Option<PathBuf>) -> PathBuf {
    data_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("checker")
    })
}

/// Where the persisted session lives inside the data directory
pub fn session_file(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE)
}

/// Load client configuration; `api_url` wins over file and environment
pub fn load_client_config(path: Option<&Path>, api_url: Option<String>) -> Result<ClientConfig> {
    let mut config = match path {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ClientConfig::from_env().context("Invalid CHECKER_* environment")?,
    };

    if let Some(url) = api_url {
        config.api_base_url = url;
    }

    // nothing animates in a terminal
    config.navigation_settle_ms = 0;

    Ok(config)
}
