// Authentication types

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::deserialize_id;

/// Authenticated user identity (`perfil` on the wire)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub login: String,
}

/// Register and login request body
#[derive(Serialize)]
pub struct CredentialsRequest<'a> {
    pub login: &'a str,
    pub password: &'a str,
}

/// Login response
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub perfil: Profile,
    pub access_token: String,
}

pub const MIN_LOGIN_LENGTH: usize = 3;
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Form rules for the login screen
pub fn validate_login(login: &str, password: &str) -> Result<(), ApiError> {
    if login.trim().is_empty() {
        return Err(ApiError::Validation("Please enter your login".to_string()));
    }
    if password.trim().is_empty() {
        return Err(ApiError::Validation("Please enter your password".to_string()));
    }
    Ok(())
}

/// Form rules for the registration screen
pub fn validate_registration(login: &str, password: &str) -> Result<(), ApiError> {
    validate_login(login, password)?;

    if login.trim().chars().count() < MIN_LOGIN_LENGTH {
        return Err(ApiError::Validation(format!(
            "The login must be at least {} characters",
            MIN_LOGIN_LENGTH
        )));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::Validation(format!(
            "The password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_shape() {
        let data: LoginResponse = serde_json::from_str(
            r#"{"perfil":{"id":1,"login":"alice"},"accessToken":"tok"}"#,
        )
        .unwrap();
        assert_eq!(data.perfil.id, "1");
        assert_eq!(data.access_token, "tok");
    }

    #[test]
    fn test_credentials_request_body() {
        let body = serde_json::to_value(CredentialsRequest {
            login: "alice",
            password: "secret",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"login": "alice", "password": "secret"}));
    }

    #[test]
    fn test_validate_login() {
        assert!(validate_login("alice", "secret").is_ok());
        assert!(validate_login("  ", "secret").is_err());
        assert!(validate_login("alice", "").is_err());
    }

    #[test]
    fn test_validate_registration() {
        assert!(validate_registration("alice", "secret").is_ok());
        assert!(validate_registration(" al ", "secret").is_err());
        assert!(validate_registration("alice", "12345").is_err());
        assert!(validate_registration("alice", "123456").is_ok());
    }
}
