use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::CredentialStore;
use crate::error::RequestFailure;

/// Build the shared reqwest client with the configured timeout
pub fn build_client(request_timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(request_timeout)
        .build()
        .context("Failed to create HTTP client")
}

/// Bearer-authenticated HTTP client for the primary API
///
/// Reads the token from the credential store before every request and
/// clears the store when the server answers 401. Every other response is
/// handed back to the caller untouched.
pub struct ApiHttpClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Base URL without trailing slash
    base_url: String,

    /// Source of the bearer token
    credentials: Arc<dyn CredentialStore>,
}

impl ApiHttpClient {
    /// Create a new HTTP client
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

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestFailure> {
        let response = self.execute(Method::GET, path, None::<&()>).await?;
        decode(response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, RequestFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(Method::POST, path, Some(body)).await?;
        decode(response).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, RequestFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(Method::PUT, path, Some(body)).await?;
        decode(response).await
    }

    /// DELETE, discarding any response body
    pub async fn delete(&self, path: &str) -> Result<(), RequestFailure> {
        self.execute(Method::DELETE, path, None::<&()>).await?;
        Ok(())
    }

    async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, RequestFailure>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.request(method, &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        match self.credentials.token() {
            Ok(Some(token)) => builder = builder.bearer_auth(token),
            Ok(None) => tracing::debug!(url = %url, "No stored token, sending unauthenticated"),
            Err(e) => tracing::warn!(error = %e, "Failed to read stored token, sending unauthenticated"),
        }

        let result = dispatch(builder).await;

        if let Err(RequestFailure::Status { status: 401, .. }) = &result {
            tracing::warn!(url = %url, "Received 401, clearing stored credentials");
            if let Err(e) = self.credentials.clear() {
                tracing::error!(error = %e, "Failed to clear credentials after 401");
            }
        }

        result
    }
}

/// Send a request and split the outcome into success or `RequestFailure`
///
/// Non-success statuses carry the `message` field of the error body when
/// the server sent one.
pub async fn dispatch(builder: RequestBuilder) -> Result<Response, RequestFailure> {
    let (client, request) = builder.build_split();
    let request =
        request.map_err(|e| RequestFailure::Local(format!("Failed to build request: {}", e)))?;

    let request_id = uuid::Uuid::new_v4();
    let method = request.method().clone();
    let url = request.url().clone();
    tracing::debug!(
        request_id = %request_id,
        method = %method,
        url = %url,
        "Sending HTTP request"
    );

    let response = match client.execute(request).await {
        Ok(response) => response,
        Err(e) => {
            let error_kind = if e.is_timeout() {
                "timeout"
            } else if e.is_connect() {
                "connection_failed"
            } else if e.is_builder() {
                "builder_error"
            } else {
                "request_error"
            };

            tracing::warn!(
                request_id = %request_id,
                error_kind = error_kind,
                error = %e,
                url = %url,
                "HTTP request error"
            );

            if e.is_builder() {
                return Err(RequestFailure::Local(e.to_string()));
            }
            return Err(RequestFailure::NoResponse(format!("{} (kind: {})", e, error_kind)));
        }
    };

    let status = response.status();
    tracing::debug!(request_id = %request_id, status = %status, "Received HTTP response");

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(
        request_id = %request_id,
        status = status.as_u16(),
        url = %url,
        response_body = %body,
        "Received error response"
    );

    Err(RequestFailure::Status {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Read a success body as JSON
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RequestFailure> {
    let body = response
        .text()
        .await
        .map_err(|e| RequestFailure::NoResponse(format!("Failed to read response body: {}", e)))?;

    serde_json::from_str(&body)
        .map_err(|e| RequestFailure::Local(format!("Failed to decode response: {}", e)))
}

/// Pull `message` out of a JSON error body
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
