use super::client::parse_response;
use super::types::TextGenerationRequest;
use crate::ai::retry::send_with_retry;
use crate::ai::{GenerationService, TokenProvider};
use crate::config::{Config, Credentials};
use crate::models::{GenerationRequest, GenerationResult};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Raw REST client: a fresh IAM token per call, a hand-serialized body, and
/// only `results[0].generated_text` read back from the response.
pub struct DirectHttpClient {
    client: Client,
    credentials: Credentials,
    tokens: Arc<dyn TokenProvider>,
    url: String,
    timeout: Duration,
    max_retries: usize,
}

impl DirectHttpClient {
    pub fn new(credentials: Credentials, config: &Config, tokens: Arc<dyn TokenProvider>) -> Self {
        Self::new_with_client(credentials, config, tokens, Client::new())
    }

    pub fn new_with_client(
        credentials: Credentials,
        config: &Config,
        tokens: Arc<dyn TokenProvider>,
        client: Client,
    ) -> Self {
        Self {
            client,
            credentials,
            tokens,
            url: config.generation_url(),
            timeout: config.timeout,
            max_retries: config.max_retries,
        }
    }

    fn first_generated_text(body: &Value) -> Result<String> {
        body.get("results")
            .and_then(|results| results.get(0))
            .and_then(|first| first.get("generated_text"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                Error::Generation("Response has no results[0].generated_text".to_string())
            })
    }
}

#[async_trait]
impl GenerationService for DirectHttpClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let token = self
            .tokens
            .acquire_token(self.credentials.api_key())
            .await?;

        let payload = serde_json::to_string(&TextGenerationRequest::build(
            request,
            self.credentials.project_id(),
        ))?;

        tracing::debug!(
            "Posting text generation request for model {} over REST",
            request.model_id
        );

        let response = send_with_retry(self.max_retries, "watsonx.ai", || {
            self.client
                .post(&self.url)
                .timeout(self.timeout)
                .header(CONTENT_TYPE, "application/json")
                .header(ACCEPT, "application/json")
                .header(AUTHORIZATION, format!("Bearer {}", token.value))
                .body(payload.clone())
                .send()
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to send REST request to watsonx.ai: {}", e);
            e
        })?;

        let body: Value = parse_response(response).await?;
        Ok(GenerationResult::new(Self::first_generated_text(&body)?))
    }
}
