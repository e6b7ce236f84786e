//! Error types for Chatr
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Chatr
#[derive(Debug, Error)]
pub enum ChatrError {
    /// Catalog construction or lookup error
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Configuration loading/parsing error
    #[error("Config error: {0}")]
    Config(String),

    /// LLM API error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Tool execution error
    #[error("Tool error: {0}")]
    Tool(String),

    /// Session memory error
    #[error("Session error: {0}")]
    Session(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Chatr operations
pub type Result<T> = std::result::Result<T, ChatrError>;
