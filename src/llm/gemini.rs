//! Gemini API client implementation
//!
//! Implements the LlmClient trait for the Google Generative Language API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::memory::Role;

use super::client::{LlmClient, LlmError};
use super::types::{GenerationRequest, GenerationResponse, TokenUsage};

/// Gemini API base URL
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Environment variable holding the API key
const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Default model to use
const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Default max output tokens
const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Default sampling temperature
const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Configuration for the Gemini client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(60),
        }
    }
}

impl GeminiConfig {
    /// Create a new config with a specific model
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// Reads GEMINI_API_KEY from environment
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(GEMINI_API_KEY_VAR).map_err(|_| LlmError::MissingApiKey {
            env_var: GEMINI_API_KEY_VAR.to_string(),
        })?;

        Self::with_api_key(api_key, config)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(api_key: String, config: GeminiConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    /// Build the generateContent request body
    fn build_request(&self, request: &GenerationRequest) -> Value {
        let mut contents: Vec<Value> = request
            .history
            .iter()
            .map(|turn| {
                json!({
                    "role": match turn.role {
                        Role::User => "user",
                        Role::Assistant => "model",
                    },
                    "parts": [{ "text": turn.content }]
                })
            })
            .collect();

        contents.push(json!({
            "role": "user",
            "parts": [{ "text": request.query }]
        }));

        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_tokens
            }
        });

        if !request.system.is_empty() {
            body["systemInstruction"] = json!({
                "parts": [{ "text": request.system }]
            });
        }

        body
    }

    /// Parse the generateContent response body
    fn parse_response(&self, body: Value) -> Result<GenerationResponse, LlmError> {
        let parts = body["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| LlmError::InvalidResponse("missing candidates[0].content.parts".to_string()))?;

        let text: String = parts
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(LlmError::InvalidResponse("empty candidate text".to_string()));
        }

        let usage = TokenUsage::new(
            body["usageMetadata"]["promptTokenCount"].as_u64().unwrap_or(0),
            body["usageMetadata"]["candidatesTokenCount"].as_u64().unwrap_or(0),
        );

        Ok(GenerationResponse {
            response: text,
            model: self.config.model.clone(),
            usage,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_URL, self.config.model, self.api_key
        )
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let body = self.build_request(&request);

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        seconds: self.config.timeout.as_secs(),
                    }
                } else {
                    LlmError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "<no body>".to_string());
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await.map_err(LlmError::Network)?;
        self.parse_response(body)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
