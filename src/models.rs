//! Data models and structures
//!
//! Defines the generation request/result types shared by both generation
//! strategies, plus the bearer token issued by IAM.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Model identifier for Llama 2 13B chat.
pub const LLAMA_2_13B_CHAT: &str = "meta-llama/llama-2-13b-chat";
/// Model identifier for FLAN-UL2.
pub const FLAN_UL2: &str = "google/flan-ul2";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DecodingMethod {
    Greedy,
    Sample,
}

/// Parameters for a single text generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model_id: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub min_tokens: u32,
    pub decoding_method: DecodingMethod,
    pub temperature: f64,
    pub stop_sequences: Vec<String>,
}

impl GenerationRequest {
    pub fn new(
        model_id: impl Into<String>,
        prompt: impl Into<String>,
        max_tokens: u32,
        min_tokens: u32,
        decoding_method: DecodingMethod,
        temperature: f64,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            prompt: prompt.into(),
            max_tokens,
            min_tokens,
            decoding_method,
            temperature,
            stop_sequences: Vec::new(),
        }
    }

    pub fn with_stop_sequences(mut self, stop_sequences: Vec<String>) -> Self {
        self.stop_sequences = stop_sequences;
        self
    }
}

/// Text produced by the model, with whatever usage metadata the service sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub generated_text: String,
    pub generated_token_count: Option<u32>,
    pub input_token_count: Option<u32>,
    pub stop_reason: Option<String>,
}

impl GenerationResult {
    pub fn new(generated_text: impl Into<String>) -> Self {
        Self {
            generated_text: generated_text.into(),
            generated_token_count: None,
            input_token_count: None,
            stop_reason: None,
        }
    }
}

/// Short-lived IAM access token.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    pub value: String,
    pub expires_in: Option<Duration>,
}

impl BearerToken {
    pub fn new(value: impl Into<String>, expires_in: Option<Duration>) -> Self {
        Self {
            value: value.into(),
            expires_in,
        }
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("value", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}
