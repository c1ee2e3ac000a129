//! Authentication API client methods

use super::{ApiClient, ClientError};
use crate::types::{
    LoginForm, RefreshRequest, RefreshResponse, RegisterForm, TokenPair, User,
};
use reqwest::Method;

impl ApiClient {
    /// Create an account
    pub async fn register(&self, form: &RegisterForm) -> Result<(), ClientError> {
        let req = self
            .request(Method::POST, "/api/register")
            .multipart(form.to_multipart());
        self.execute_discarding(req).await
    }

    /// Exchange credentials for an access/refresh token pair
    pub async fn login(&self, form: &LoginForm) -> Result<TokenPair, ClientError> {
        let req = self
            .request(Method::POST, "/api/login")
            .multipart(form.to_multipart());
        self.execute(req).await
    }

    /// Obtain a fresh access token from a refresh token
    pub async fn refresh_token(&self, refresh: &str) -> Result<RefreshResponse, ClientError> {
        let req = self
            .request(Method::POST, "/api/token/refresh")
            .json(&RefreshRequest {
                refresh: refresh.to_string(),
            });
        self.execute(req).await
    }

    /// Fetch the user the access token belongs to
    pub async fn current_user(&self, access_token: &str) -> Result<User, ClientError> {
        let req = self.request_with_bearer(Method::GET, "/api/user", access_token);
        self.execute(req).await
    }
}
