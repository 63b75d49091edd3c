//! Text generation payloads shared by the managed and direct clients.

use crate::models::{DecodingMethod, GenerationRequest, GenerationResult};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Request body for `POST /ml/v1-beta/generation/text`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TextGenerationRequest {
    pub model_id: String,
    pub input: String,
    pub parameters: TextGenerationParameters,
    pub project_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TextGenerationParameters {
    pub decoding_method: DecodingMethod,
    pub max_new_tokens: u32,
    pub min_new_tokens: u32,
    pub temperature: f64,
    pub stop_sequences: Vec<String>,
}

impl TextGenerationRequest {
    /// The single place a [`GenerationRequest`] is mapped onto the wire format.
    pub fn build(request: &GenerationRequest, project_id: &str) -> Self {
        Self {
            model_id: request.model_id.clone(),
            input: request.prompt.clone(),
            parameters: TextGenerationParameters {
                decoding_method: request.decoding_method,
                max_new_tokens: request.max_tokens,
                min_new_tokens: request.min_tokens,
                temperature: request.temperature,
                stop_sequences: request.stop_sequences.clone(),
            },
            project_id: project_id.to_string(),
        }
    }
}

/// Top-level text generation response envelope.
#[derive(Debug, Deserialize)]
pub struct TextGenerationResponse {
    #[serde(default)]
    pub model_id: Option<String>,
    pub results: Vec<TextGenerationResultItem>,
}

#[derive(Debug, Deserialize)]
pub struct TextGenerationResultItem {
    pub generated_text: String,
    #[serde(default)]
    pub generated_token_count: Option<u32>,
    #[serde(default)]
    pub input_token_count: Option<u32>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl TextGenerationResponse {
    /// Take the first result; an empty `results` array is an error.
    pub fn into_result(self) -> Result<GenerationResult> {
        let item = self.results.into_iter().next().ok_or_else(|| {
            Error::Generation("No results in watsonx.ai response".to_string())
        })?;

        Ok(GenerationResult {
            generated_text: item.generated_text,
            generated_token_count: item.generated_token_count,
            input_token_count: item.input_token_count,
            stop_reason: item.stop_reason,
        })
    }
}
