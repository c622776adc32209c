// Auth service client
// Talks to the authentication microservice directly: no bearer token exists
// before login, so the authenticated API client is bypassed.

use anyhow::Result;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use super::credentials::CredentialStore;
use super::types::{CredentialsRequest, LoginResponse, Profile};
use crate::error::{self, ApiError, RequestFailure, AUTH_POLICY};
use crate::http_client::{build_client, dispatch};

const REGISTER_DEFAULT_MESSAGE: &str = "Failed to register user";
const LOGIN_DEFAULT_MESSAGE: &str = "Failed to log in";

pub struct AuthService {
    client: Client,

    /// Auth service root, e.g. `http://localhost:3000`
    base_url: String,

    /// Where a successful login is persisted
    credentials: Arc<dyn CredentialStore>,
}

impl AuthService {
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(request_timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Create a user account; returns the new identity
    pub async fn register(&self, login: &str, password: &str) -> error::Result<Profile> {
        tracing::info!(login = %login, "Registering user");

        let profile: Profile = self
            .post("/api/register", login, password)
            .await
            .map_err(|f| error::normalize(f, &AUTH_POLICY, REGISTER_DEFAULT_MESSAGE))?;

        tracing::info!(user_id = %profile.id, "User registered");
        Ok(profile)
    }

    /// Log in and persist the token and profile before returning the profile
    pub async fn login(&self, login: &str, password: &str) -> error::Result<Profile> {
        tracing::info!(login = %login, "Logging in");

        let data: LoginResponse = self
            .post("/api/login", login, password)
            .await
            .map_err(|f| error::normalize(f, &AUTH_POLICY, LOGIN_DEFAULT_MESSAGE))?;

        if data.access_token.is_empty() {
            return Err(ApiError::Unknown(
                "Login response does not contain accessToken".to_string(),
            ));
        }

        self.credentials
            .save(&data.access_token, &data.perfil)
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to store credentials");
                ApiError::Unknown(format!("{}: {}", LOGIN_DEFAULT_MESSAGE, e))
            })?;

        tracing::info!(
            user_id = %data.perfil.id,
            token_prefix = %data.access_token.chars().take(8).collect::<String>(),
            "Logged in"
        );
        Ok(data.perfil)
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        login: &str,
        password: &str,
    ) -> std::result::Result<T, RequestFailure> {
        let url = format!("{}{}", self.base_url, path);
        let builder = self
            .client
            .post(&url)
            .json(&CredentialsRequest { login, password });

        let response = dispatch(builder).await?;
        let body = response
            .text()
            .await
            .map_err(|e| RequestFailure::NoResponse(format!("Failed to read response body: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| RequestFailure::Local(format!("Failed to decode auth response: {}", e)))
    }
}
