//! watsonx.ai service integration
//!
//! Provides the IAM token exchange and the two text generation strategies:
//! a managed client that caches its token, and a direct HTTP client that
//! fetches a fresh token for every call.

pub mod iam;
pub mod mock;
pub mod retry;
pub mod watsonx;

pub use iam::{IamTokenClient, TokenManager};
pub use mock::{MockGenerationClient, MockTokenProvider};
pub use watsonx::{DirectHttpClient, ModelInference};

use crate::models::{BearerToken, GenerationRequest, GenerationResult};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn acquire_token(&self, api_key: &str) -> Result<BearerToken>;
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult>;
}
