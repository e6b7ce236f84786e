//! LLM client trait, error types, and test double
//!
//! The generation backend is an opaque collaborator: one call in, one text
//! plus metadata out, bounded by the client's configured timeout.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::types::{GenerationRequest, GenerationResponse, TokenUsage};

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing API key: environment variable {env_var} not set")]
    MissingApiKey { env_var: String },

    #[error("Generation timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

impl LlmError {
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::ApiError { status, .. } => *status >= 500 || *status == 429,
            LlmError::Network(_) => true,
            LlmError::Timeout { .. } => true,
            LlmError::InvalidResponse(_) => false,
            LlmError::MissingApiKey { .. } => false,
        }
    }
}

/// Stateless text-generation client - each call is independent
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single generation request (blocking until complete or timed out)
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError>;

    /// Model identifier this client targets
    fn model(&self) -> &str;
}

/// Scripted LLM client for tests
///
/// Returns queued responses in order, then falls back to a fixed default.
/// `failing` builds a client whose every call errors; `failing_first` fails
/// only the first N calls.
pub struct MockLlmClient {
    queued: Mutex<VecDeque<String>>,
    default_response: String,
    failure_mode: Mutex<FailureMode>,
    calls: Mutex<u64>,
}

enum FailureMode {
    Never,
    Always(String),
    FirstN(u64, String),
}

impl MockLlmClient {
    /// Create a mock that always answers with a fixed default
    pub fn new() -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            default_response: "mock response".to_string(),
            failure_mode: Mutex::new(FailureMode::Never),
            calls: Mutex::new(0),
        }
    }

    /// Set the fallback response text
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Queue responses returned in order before the fallback kicks in
    pub fn with_responses(self, responses: Vec<String>) -> Self {
        self.queued.lock().unwrap().extend(responses);
        self
    }

    /// Create a mock whose every call fails with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        let mock = Self::new();
        *mock.failure_mode.lock().unwrap() = FailureMode::Always(message.into());
        mock
    }

    /// Fail the first `count` calls, then answer normally
    pub fn failing_first(self, count: u64, message: impl Into<String>) -> Self {
        *self.failure_mode.lock().unwrap() = FailureMode::FirstN(count, message.into());
        self
    }

    /// Number of generate calls made so far
    pub fn call_count(&self) -> u64 {
        *self.calls.lock().unwrap()
    }

    /// Error to return for this call, if any
    fn next_failure(&self) -> Option<String> {
        let mut mode = self.failure_mode.lock().unwrap();
        match &mut *mode {
            FailureMode::Never => None,
            FailureMode::Always(message) => Some(message.clone()),
            FailureMode::FirstN(remaining, message) => {
                if *remaining == 0 {
                    None
                } else {
                    *remaining -= 1;
                    Some(message.clone())
                }
            }
        }
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        *self.calls.lock().unwrap() += 1;

        if let Some(message) = self.next_failure() {
            return Err(LlmError::ApiError { status: 500, message });
        }

        let response = self
            .queued
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone());

        Ok(GenerationResponse {
            response,
            model: self.model().to_string(),
            usage: TokenUsage::new((request.query.len() / 4) as u64, 16),
        })
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
