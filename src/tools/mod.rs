//! Tool system - the handler contract, the registry, and built-in tools
//!
//! Every tool satisfies one narrow contract: an async `execute(action,
//! params)` returning a structured value or an error. Handlers carry their
//! own identity and routing keywords as static data; the registry builds
//! catalog descriptors from them at startup.

mod calculator;
mod climate;
mod executor;
mod file_manager;
mod memory_tool;
mod system_monitor;
mod translator;
mod web_search;
mod wikipedia;

pub use calculator::CalculatorTool;
pub use climate::ClimateTool;
pub use executor::{ToolBatchOutcome, ToolExecutor, ToolInvocationResult, ToolRequest};
pub use file_manager::FileManagerTool;
pub use memory_tool::MemoryTool;
pub use system_monitor::SystemMonitorTool;
pub use translator::TranslatorTool;
pub use web_search::WebSearchTool;
pub use wikipedia::WikipediaTool;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::catalog::{ToolCatalog, ToolDescriptor};
use crate::error::Result;

/// Errors a tool handler can raise
///
/// All of these stop at the executor boundary, where they become failure
/// envelopes; nothing here reaches the pipeline as an error.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Unknown action: {action}")]
    UnknownAction { action: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Upstream response error: {message}")]
    Upstream { message: String },

    #[error("Path {path} escapes the workspace")]
    PathEscape { path: String },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HandlerError {
    /// Shorthand for invalid-input errors
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// A tool that can be selected by the router and invoked by the executor
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Tool name (the catalog key)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Keywords the router matches queries against
    fn keywords(&self) -> &'static [&'static str];

    /// Execute an action with a parameter mapping
    async fn execute(&self, action: &str, params: &Value) -> std::result::Result<Value, HandlerError>;
}

/// Registry mapping tool names to their handlers, in registration order
pub struct HandlerRegistry {
    order: Vec<String>,
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry (for custom tool sets)
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Create a registry with the standard built-in tools
    ///
    /// `workspace` scopes the file manager; everything else is
    /// self-contained.
    pub fn standard(workspace: PathBuf) -> std::result::Result<Self, HandlerError> {
        let mut registry = Self::new();

        registry.register(Arc::new(WebSearchTool::new()?));
        registry.register(Arc::new(FileManagerTool::new(workspace)));
        registry.register(Arc::new(MemoryTool::new()));
        registry.register(Arc::new(ClimateTool::new()?));
        registry.register(Arc::new(WikipediaTool::new()?));
        registry.register(Arc::new(SystemMonitorTool::new()));
        registry.register(Arc::new(CalculatorTool::new()));
        registry.register(Arc::new(TranslatorTool::new()?));

        Ok(registry)
    }

    /// Add a handler to the registry
    ///
    /// A handler re-registered under an existing name replaces the previous
    /// one without changing its position.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        let name = handler.name().to_string();
        if !self.handlers.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.handlers.insert(name, handler);
    }

    /// Get a handler by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Check if a handler exists
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Handler names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    /// Number of handlers
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Build a catalog with one descriptor per registered handler
    ///
    /// Descriptors inherit the handler's name, description, and keywords and
    /// start out enabled. Registration order carries over, which is what
    /// makes routing tie-breaks deterministic.
    pub fn build_catalog(&self) -> Result<ToolCatalog> {
        let mut catalog = ToolCatalog::new();
        for name in &self.order {
            if let Some(handler) = self.handlers.get(name) {
                catalog.register(
                    ToolDescriptor::new(handler.name(), handler.description())
                        .with_keywords(handler.keywords()),
                )?;
            }
        }
        Ok(catalog)
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
