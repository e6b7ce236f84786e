//! Intent analysis and response generation on top of an LlmClient
//!
//! The agent owns the prompt construction and the session-memory handoff;
//! the actual text generation is whatever client it was built with.

use std::sync::Arc;

use log::{debug, info};
use serde_json::Value;

use crate::memory::{SessionMemory, Turn};

use super::client::{LlmClient, LlmError};
use super::types::{GenerationRequest, GenerationResponse, IntentAnalysis};

/// Base system prompt for response generation
const SYSTEM_PROMPT: &str = r#"You are an AI assistant that orchestrates a set of named tools to answer user queries.

You can help users with natural conversation, weather lookups, web search, calculations, translations, file operations, and system monitoring.

Guidelines:
1. Be helpful, accurate, and concise
2. When tool results are provided in the context, base your answer on them
3. Provide step-by-step explanations for complex tasks
4. If you're unsure, say so rather than guessing"#;

/// System prompt for the intent-analysis call
const INTENT_SYSTEM_PROMPT: &str = "You are an intent analysis assistant.";

/// Default number of prior turns spliced into a generation request
pub const DEFAULT_MAX_HISTORY_TURNS: usize = 20;

/// Intent analyzer and response generator
#[derive(Clone)]
pub struct Agent {
    client: Arc<dyn LlmClient>,
    memory: SessionMemory,
    max_history_turns: usize,
}

impl Agent {
    /// Create an agent over a generation client and session store
    pub fn new(client: Arc<dyn LlmClient>, memory: SessionMemory) -> Self {
        Self {
            client,
            memory,
            max_history_turns: DEFAULT_MAX_HISTORY_TURNS,
        }
    }

    /// Limit how many prior turns are included per request
    pub fn with_max_history_turns(mut self, max_history_turns: usize) -> Self {
        self.max_history_turns = max_history_turns;
        self
    }

    /// Analyze a query's intent
    ///
    /// A failed analysis is reported to the caller; it does not touch
    /// session memory.
    pub async fn analyze_intent(&self, query: &str) -> Result<IntentAnalysis, LlmError> {
        let prompt = format!(
            "Analyze the following user query and determine:\n\
             1. The primary intent\n\
             2. Which tools would be most helpful\n\
             3. Any parameters needed\n\n\
             Query: {}\n\n\
             Respond in a structured format.",
            query
        );

        let request = GenerationRequest::new(INTENT_SYSTEM_PROMPT).with_query(prompt);
        let response = self.client.generate(request).await?;

        Ok(IntentAnalysis {
            analysis: response.response,
            query: query.to_string(),
        })
    }

    /// Generate the final response for a query
    ///
    /// Splices session history into the request and, on success, appends the
    /// user and assistant turns to memory. A failed generation leaves memory
    /// untouched.
    pub async fn generate_response(
        &self,
        query: &str,
        session_id: &str,
        active_tools: &[String],
        context: &Value,
    ) -> Result<GenerationResponse, LlmError> {
        let history = self.memory.recent(session_id, self.max_history_turns);
        debug!(
            "generating response for session {} with {} prior turns",
            session_id,
            history.len()
        );

        let query_with_context = if context.is_null() {
            query.to_string()
        } else {
            format!("{}\n\nContext: {}", query, context)
        };

        let request = GenerationRequest::new(self.build_system_prompt(active_tools))
            .with_history(history)
            .with_query(query_with_context);

        let response = self.client.generate(request).await?;

        self.memory.append(session_id, Turn::user(query));
        self.memory.append(session_id, Turn::assistant(response.response.clone()));
        info!("session {}: response generated by {}", session_id, response.model);

        Ok(response)
    }

    /// Build the system prompt, appending the active tool list when present
    fn build_system_prompt(&self, active_tools: &[String]) -> String {
        if active_tools.is_empty() {
            return SYSTEM_PROMPT.to_string();
        }

        let tool_list: Vec<String> = active_tools.iter().map(|tool| format!("- {}", tool)).collect();
        format!("{}\n\nCurrently active tools:\n{}", SYSTEM_PROMPT, tool_list.join("\n"))
    }
}
