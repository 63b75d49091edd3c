use super::{GenerationService, TokenProvider};
use crate::models::{BearerToken, GenerationRequest, GenerationResult};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct MockTokenProvider {
    token: String,
    expires_in: Option<Duration>,
    failure: Option<String>,
    call_count: Arc<Mutex<usize>>,
}

impl MockTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_in: None,
            failure: None,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    /// Make every call fail with an [`Error::Auth`] carrying `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl TokenProvider for MockTokenProvider {
    async fn acquire_token(&self, _api_key: &str) -> Result<BearerToken> {
        *self.call_count.lock().unwrap() += 1;

        match &self.failure {
            Some(message) => Err(Error::Auth(message.clone())),
            None => Ok(BearerToken::new(self.token.clone(), self.expires_in)),
        }
    }
}

#[derive(Clone)]
pub struct MockGenerationClient {
    responses: Arc<Mutex<Vec<String>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    failure: Option<String>,
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            failure: None,
        }
    }

    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(response.into());
        self
    }

    /// Make every call fail with an [`Error::Generation`] carrying `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for MockGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationService for MockGenerationClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        if let Some(message) = &self.failure {
            return Err(Error::Generation(message.clone()));
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Default mock response
            Ok(GenerationResult::new(format!(
                "Generated by {}",
                request.model_id
            )))
        } else {
            let index = (count - 1) % responses.len();
            Ok(GenerationResult::new(responses[index].clone()))
        }
    }
}
