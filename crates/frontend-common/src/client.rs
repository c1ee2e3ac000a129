//! Client configuration and initialization

use checker_core::ClientConfig;
use checker_http::{ApiClient, ClientError};

/// Get the base URL for API calls
///
/// An explicit `api_base_url` wins; in the browser an empty one means the
/// page's own origin.
fn get_base_url(config: &ClientConfig) -> String {
    if !config.api_base_url.is_empty() {
        return config.api_base_url.clone();
    }

    #[cfg(target_arch = "wasm32")]
    if let Some(origin) = web_sys::window().and_then(|w| w.location().origin().ok()) {
        return origin;
    }

    String::new()
}

/// Build the API client described by `config`
pub fn create_api_client(config: &ClientConfig) -> Result<ApiClient, ClientError> {
    ApiClient::builder()
        .base_url(get_base_url(config))
        .timeout(config.request_timeout())
        .build()
}
