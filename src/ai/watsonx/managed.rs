use super::client::WatsonxHttpClient;
use super::types::TextGenerationRequest;
use crate::ai::{GenerationService, TokenManager, TokenProvider};
use crate::config::{Config, Credentials};
use crate::models::{GenerationRequest, GenerationResult};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

/// Managed inference client, configured once with credentials and a service
/// URL. Keeps one bearer token and refreshes it only when it nears expiry.
pub struct ModelInference {
    http: WatsonxHttpClient,
    credentials: Credentials,
    tokens: TokenManager,
}

impl ModelInference {
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
            http: WatsonxHttpClient::new_with_client(config, client),
            credentials,
            tokens: TokenManager::new(tokens),
        }
    }
}

#[async_trait]
impl GenerationService for ModelInference {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let token = self.tokens.token(self.credentials.api_key()).await?;
        let body = TextGenerationRequest::build(request, self.credentials.project_id());

        tracing::debug!("Managed client generating via {}", self.http.url());
        let result = self.http.generate_text(&token, &body).await?.into_result()?;

        tracing::info!(
            "Generated {} tokens with {} (stop reason: {})",
            result
                .generated_token_count
                .map_or_else(|| "?".to_string(), |n| n.to_string()),
            request.model_id,
            result.stop_reason.as_deref().unwrap_or("unknown")
        );

        Ok(result)
    }
}
