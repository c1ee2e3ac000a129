//! Request and response bodies for the auth endpoints

use reqwest::multipart::Form;
use serde::{Deserialize, Serialize};

pub use checker_core::{TokenPair, User};

/// Login form, sent as multipart form data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub(crate) fn to_multipart(&self) -> Form {
        Form::new()
            .text("username", self.username.clone())
            .text("password", self.password.clone())
    }
}

/// Registration form, sent as multipart form data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub password: String,
    /// Password confirmation, checked by the backend
    pub password2: String,
    /// Registration number; students only
    #[serde(default)]
    pub regdno: Option<String>,
}

impl RegisterForm {
    pub(crate) fn to_multipart(&self) -> Form {
        let form = Form::new()
            .text("username", self.username.clone())
            .text("email", self.email.clone())
            .text("first_name", self.first_name.clone())
            .text("last_name", self.last_name.clone())
            .text("role", self.role.clone())
            .text("password", self.password.clone())
            .text("password2", self.password2.clone());

        match &self.regdno {
            Some(regdno) => form.text("regdno", regdno.clone()),
            None => form,
        }
    }
}

/// Refresh request body
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Refresh response; only the access token is required
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}
