use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

use super::common::ApiErrorResponse;
use super::error::ApiError;

/// Control plane API client
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    auth_header: String,
    retry_config: RetryConfig,
}

#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(endpoint: &str, auth_token: &str, insecure: bool) -> Result<Self, ApiError> {
        Self::with_config(endpoint, auth_token, insecure, RetryConfig::default())
    }

    /// Create a new API client with custom retry configuration
    pub fn with_config(
        endpoint: &str,
        auth_token: &str,
        insecure: bool,
        retry_config: RetryConfig,
    ) -> Result<Self, ApiError> {
        Url::parse(endpoint).map_err(|e| ApiError::InvalidEndpoint(format!("{endpoint}: {e}")))?;

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(retry_config.timeout_seconds))
            .danger_accept_invalid_certs(insecure)
            .build()?;

        let base_url = endpoint.trim_end_matches('/').to_string();
        let auth_header = format!("Bearer {auth_token}");

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                auth_header,
                retry_config,
            }),
        })
    }

    /// Identity service operations
    pub fn identity(&self) -> super::identity::IdentityApi<'_> {
        super::identity::IdentityApi::new(self)
    }

    /// Core (networking and compute) service operations
    pub fn core(&self) -> super::core::CoreApi<'_> {
        super::core::CoreApi::new(self)
    }

    /// Execute a GET request with retry logic
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .execute_with_retry(
                || async {
                    let url = format!("{}{}", self.inner.base_url, path);

                    tracing::debug!("GET request to: {}", url);

                    self.inner
                        .http_client
                        .get(&url)
                        .header(AUTHORIZATION, &self.inner.auth_header)
                        .send()
                        .await
                },
                path,
            )
            .await?;
        self.parse_success_response(response).await
    }

    /// Execute a POST request with retry logic
    pub async fn post<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .execute_with_retry(
                || async {
                    let url = format!("{}{}", self.inner.base_url, path);

                    tracing::debug!("POST request to: {}", url);

                    self.inner
                        .http_client
                        .post(&url)
                        .header(AUTHORIZATION, &self.inner.auth_header)
                        .json(body)
                        .send()
                        .await
                },
                path,
            )
            .await?;
        self.parse_success_response(response).await
    }

    /// Execute a DELETE request with retry logic; the control plane returns
    /// an empty body on success
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute_with_retry(
            || async {
                let url = format!("{}{}", self.inner.base_url, path);

                tracing::debug!("DELETE request to: {}", url);

                self.inner
                    .http_client
                    .delete(&url)
                    .header(AUTHORIZATION, &self.inner.auth_header)
                    .send()
                    .await
            },
            path,
        )
        .await?;
        Ok(())
    }

    /// Execute a request, retrying rate limits, server errors and timeouts
    /// with exponential backoff. Returns the successful response.
    async fn execute_with_retry<F, Fut>(
        &self,
        request_fn: F,
        path: &str,
    ) -> Result<reqwest::Response, ApiError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.inner.retry_config.max_retries {
            if attempt > 0 {
                let backoff = std::cmp::min(
                    self.inner.retry_config.initial_backoff_ms * (2_u64.pow(attempt - 1)),
                    self.inner.retry_config.max_backoff_ms,
                );
                tracing::debug!(
                    "Retrying request to {} after {}ms (attempt {})",
                    path,
                    backoff,
                    attempt
                );
                tokio::time::sleep(tokio::time::Duration::from_millis(backoff)).await;
            }

            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response);
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(ApiError::AuthError);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(ApiError::RateLimited);
                    } else if status.is_server_error() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(Self::error_from_response(response).await);
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error =
                            Some(ApiError::Timeout(self.inner.retry_config.timeout_seconds));
                    } else if e.is_connect() || e.is_request() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(ApiError::RequestError(e));
                    }
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or(ApiError::ServiceUnavailable))
    }

    async fn parse_success_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        serde_json::from_str::<T>(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(format!("failed to parse response: {e}"))
        })
    }

    async fn error_from_response(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        match serde_json::from_str::<ApiErrorResponse>(&text) {
            Ok(body) => ApiError::ServiceError {
                status,
                code: body.code.unwrap_or_else(|| "Unknown".to_string()),
                message: body.message.unwrap_or(text),
            },
            Err(_) => ApiError::ServiceError {
                status,
                code: "Unknown".to_string(),
                message: text,
            },
        }
    }
}
