//! IBM Cloud IAM token exchange and token caching.

use super::retry::send_with_retry;
use super::TokenProvider;
use crate::config::Config;
use crate::models::BearerToken;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const API_KEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

// Share of the token lifetime after which a cached token is replaced.
const REFRESH_FRACTION: f64 = 0.8;

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Exchanges an API key for a bearer token at the IAM identity endpoint.
pub struct IamTokenClient {
    client: Client,
    url: String,
    timeout: Duration,
    max_retries: usize,
}

impl IamTokenClient {
    pub fn new(url: String, timeout: Duration) -> Self {
        Self::new_with_client(url, timeout, Client::new())
    }

    pub fn new_with_client(url: String, timeout: Duration, client: Client) -> Self {
        Self {
            client,
            url,
            timeout,
            max_retries: 0,
        }
    }

    pub fn from_config(config: &Config, client: Client) -> Self {
        Self::new_with_client(config.iam_url.clone(), config.timeout, client)
            .with_max_retries(config.max_retries)
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }
}

#[async_trait]
impl TokenProvider for IamTokenClient {
    async fn acquire_token(&self, api_key: &str) -> Result<BearerToken> {
        tracing::debug!("Requesting IAM access token from {}", self.url);

        let form = [("grant_type", API_KEY_GRANT_TYPE), ("apikey", api_key)];
        let response = send_with_retry(self.max_retries, "IAM", || {
            self.client
                .post(&self.url)
                .timeout(self.timeout)
                .header(ACCEPT, "application/json")
                .form(&form)
                .send()
        })
        .await
        .map_err(|e| {
            tracing::error!("Error getting IAM token: {}", e);
            Error::Auth(format!("Failed to reach IAM token endpoint: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("IAM token error (status {}): {}", status, error_text);
            return Err(Error::Auth(format!(
                "IAM token request failed (status {}): {}",
                status, error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Auth(format!("Failed to read IAM token response: {}", e)))?;

        // The body carries the token itself, so it is not logged on failure.
        let parsed: IamTokenResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Auth(format!("Failed to parse IAM token response: {}", e)))?;

        if parsed.access_token.trim().is_empty() {
            return Err(Error::Auth(
                "IAM token response contained an empty access_token".to_string(),
            ));
        }

        Ok(BearerToken::new(
            parsed.access_token,
            parsed.expires_in.map(Duration::from_secs),
        ))
    }
}

struct CachedToken {
    api_key: String,
    token: BearerToken,
    refresh_at: Option<Instant>,
}

impl CachedToken {
    /// A lifetime too large to add to `issued_at` means no refresh deadline.
    fn new(api_key: &str, token: BearerToken, issued_at: Instant) -> Self {
        let refresh_at = token
            .expires_in
            .and_then(|lifetime| issued_at.checked_add(lifetime.mul_f64(REFRESH_FRACTION)));
        Self {
            api_key: api_key.to_string(),
            token,
            refresh_at,
        }
    }

    fn is_fresh_for(&self, api_key: &str, now: Instant) -> bool {
        self.api_key == api_key && self.refresh_at.map_or(true, |refresh_at| now < refresh_at)
    }
}

/// Caches a token from an underlying provider and refreshes it once most of
/// its lifetime has passed, or when asked for a different API key. Tokens
/// without an expiry are kept for the life of the manager.
pub struct TokenManager {
    provider: Arc<dyn TokenProvider>,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenManager {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider,
            cached: Mutex::new(None),
        }
    }

    pub async fn token(&self, api_key: &str) -> Result<BearerToken> {
        let mut cached = self.cached.lock().await;

        if let Some(entry) = cached.as_ref() {
            if entry.is_fresh_for(api_key, Instant::now()) {
                return Ok(entry.token.clone());
            }
            tracing::debug!("Cached IAM token is due for refresh");
        }

        let token = self.provider.acquire_token(api_key).await?;
        *cached = Some(CachedToken::new(api_key, token.clone(), Instant::now()));
        Ok(token)
    }
}
