//! LLM types for text-generation requests and responses
//!
//! These are the shapes the pipeline exchanges with the generation backend;
//! the backend itself is opaque behind the `LlmClient` trait.

use serde::{Deserialize, Serialize};

use crate::memory::Turn;

/// Everything needed for one generation call
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// System prompt
    pub system: String,

    /// Prior conversation turns, oldest first
    pub history: Vec<Turn>,

    /// The user query for this call
    pub query: String,
}

impl GenerationRequest {
    /// Create a new request with a system prompt
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            ..Default::default()
        }
    }

    /// Set the user query
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Set prior conversation history
    pub fn with_history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }
}

/// Response from the generation backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated text
    pub response: String,

    /// Model that produced it
    pub model: String,

    /// Token usage for accounting
    pub usage: TokenUsage,
}

/// Result of the intent-analysis collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentAnalysis {
    /// Free-text analysis of the query's intent
    pub analysis: String,

    /// The query that was analyzed
    pub query: String,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Create new usage stats
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Calculate total tokens
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Accumulate usage from another instance
    pub fn add(&mut self, other: &TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}
