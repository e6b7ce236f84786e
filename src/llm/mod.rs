//! LLM layer - generation client abstraction and the chat agent
//!
//! This module provides:
//! - Request/response types for text generation
//! - LlmClient trait with Gemini and mock implementations
//! - The Agent that builds prompts and manages session history

pub mod agent;
pub mod client;
pub mod gemini;
pub mod types;

pub use agent::{Agent, DEFAULT_MAX_HISTORY_TURNS};
pub use client::{LlmClient, LlmError, MockLlmClient};
pub use gemini::{GeminiClient, GeminiConfig};
pub use types::{GenerationRequest, GenerationResponse, IntentAnalysis, TokenUsage};
