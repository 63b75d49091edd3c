use super::types::{TextGenerationRequest, TextGenerationResponse};
use crate::ai::retry::send_with_retry;
use crate::config::Config;
use crate::models::BearerToken;
use crate::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Lightweight watsonx.ai REST transport used by the managed client.
pub struct WatsonxHttpClient {
    client: Client,
    url: String,
    timeout: Duration,
    max_retries: usize,
}

impl WatsonxHttpClient {
    pub fn new(config: &Config) -> Self {
        Self::new_with_client(config, Client::new())
    }

    pub fn new_with_client(config: &Config, client: Client) -> Self {
        Self {
            client,
            url: config.generation_url(),
            timeout: config.timeout,
            max_retries: config.max_retries,
        }
    }

    /// Full generation URL, including the `version` query.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Calls the text generation endpoint with a bearer token.
    pub async fn generate_text(
        &self,
        token: &BearerToken,
        request: &TextGenerationRequest,
    ) -> Result<TextGenerationResponse> {
        tracing::debug!(
            "Sending text generation request for model {}",
            request.model_id
        );

        let response = send_with_retry(self.max_retries, "watsonx.ai", || {
            self.client
                .post(&self.url)
                .timeout(self.timeout)
                .bearer_auth(&token.value)
                .json(request)
                .send()
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to send request to watsonx.ai: {}", e);
            e
        })?;

        parse_response(response).await
    }
}

/// Rejects non-2xx statuses and decodes the body as `T`.
pub(crate) async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        tracing::error!("watsonx.ai API error (status {}): {}", status, error_text);
        return Err(Error::Generation(format!(
            "watsonx.ai API error (status {}): {}",
            status, error_text
        )));
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        tracing::error!("Failed to parse watsonx.ai response: {}\nBody: {}", e, body);
        Error::Generation(format!("Failed to parse watsonx.ai response: {}", e))
    })
}
