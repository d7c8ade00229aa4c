//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - Exponential backoff retry on timeouts, transport errors and HTTP 429
//! - 404 reported as `PackageNotFound` without retrying

use crate::error::RegistryError;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default timeout for HTTP requests (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("monorel/", env!("CARGO_PKG_VERSION"));

/// Abbreviated npm metadata document; carries the `versions` map without readmes
const NPM_ABBREVIATED_METADATA: &str =
    "application/vnd.npm.install-v1+json; q=1.0, application/json; q=0.8";

/// Maximum number of retry attempts
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                RegistryError::network_error(
                    "",
                    "HTTP client",
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// GET `url` and decode the JSON body.
    ///
    /// `package` and `registry` only feed error messages.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        package: &str,
        registry: &str,
    ) -> Result<T, RegistryError> {
        let mut delay = BASE_DELAY_MS;
        let mut attempt = 0;

        loop {
            let error = match self.try_get_json(url, package, registry).await {
                Ok(parsed) => return Ok(parsed),
                Err(e) if !is_retryable(&e) => return Err(e),
                Err(e) => e,
            };

            if attempt >= self.max_retries {
                return Err(error);
            }
            attempt += 1;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            delay *= 2;
        }
    }

    async fn try_get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        package: &str,
        registry: &str,
    ) -> Result<T, RegistryError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static(NPM_ABBREVIATED_METADATA))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RegistryError::timeout(package, registry)
                } else {
                    RegistryError::network_error(package, registry, e.to_string())
                }
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(RegistryError::package_not_found(package, registry));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(RegistryError::RateLimitExceeded {
                    registry: registry.to_string(),
                });
            }
            status if !status.is_success() => {
                return Err(RegistryError::network_error(
                    package,
                    registry,
                    format!("HTTP {}", status),
                ));
            }
            _ => {}
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RegistryError::InvalidResponse {
                package: package.to_string(),
                registry: registry.to_string(),
                message: format!("failed to parse JSON: {}", e),
            })
    }
}

fn is_retryable(error: &RegistryError) -> bool {
    matches!(
        error,
        RegistryError::Timeout { .. }
            | RegistryError::RateLimitExceeded { .. }
            | RegistryError::NetworkError { .. }
    )
}
