use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Access/refresh token pair returned by a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// The authenticated user as returned by `GET /api/user`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    #[serde(rename = "regdno", default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
}

impl User {
    /// Parse the free-form role into a known [`Role`], if it is one
    pub fn role_kind(&self) -> Option<Role> {
        self.role.parse().ok()
    }

    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Roles accepted in role-scoped routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
        }
    }

    /// Route parameter matcher: only `student` and `teacher` are accepted
    pub fn matches_param(param: &str) -> bool {
        param.parse::<Self>().is_ok()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            other => Err(CoreError::InvalidRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 7,
            username: "asha".to_string(),
            email: None,
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            role: "student".to_string(),
            registration_number: Some("21CS042".to_string()),
        }
    }

    #[test]
    fn user_uses_backend_field_names() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert_eq!(json["first_name"], "Asha");
        assert_eq!(json["regdno"], "21CS042");
        assert!(json.get("email").is_none());
        assert!(json.get("registration_number").is_none());
    }

    #[test]
    fn user_without_regdno_deserializes() {
        let user: User = serde_json::from_str(
            r#"{"id":1,"username":"t","first_name":"T","last_name":"K","role":"teacher"}"#,
        )
        .unwrap();
        assert_eq!(user.registration_number, None);
        assert_eq!(user.role_kind(), Some(Role::Teacher));
    }

    #[test]
    fn role_param_matcher() {
        assert!(Role::matches_param("student"));
        assert!(Role::matches_param("teacher"));
        assert!(!Role::matches_param("admin"));
        assert!(!Role::matches_param("Student"));
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let mut user = sample_user();
        assert_eq!(user.display_name(), "Asha Rao");
        user.first_name.clear();
        user.last_name.clear();
        assert_eq!(user.display_name(), "asha");
    }
}
