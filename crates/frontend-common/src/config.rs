//! Frontend configuration

/// Authentication configuration
pub struct AuthConfig;

impl AuthConfig {
    /// Storage key for the raw access token
    pub const ACCESS_TOKEN_KEY: &'static str = "access_token";

    /// Storage key for the raw refresh token
    pub const REFRESH_TOKEN_KEY: &'static str = "refresh_token";

    /// Storage key for the JSON-serialized user
    pub const USER_DATA_KEY: &'static str = "user_data";

    /// Every key the session manager persists
    pub const SESSION_KEYS: [&'static str; 3] = [
        Self::ACCESS_TOKEN_KEY,
        Self::REFRESH_TOKEN_KEY,
        Self::USER_DATA_KEY,
    ];
}
