//! Tool executor - invokes handlers and normalizes every outcome
//!
//! This is the failure-isolation boundary of the system: handlers wrap
//! unreliable third-party calls, so whatever they raise is converted into a
//! failure envelope here and never propagates to the pipeline.

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::timeout;

use crate::catalog::SharedCatalog;

use super::HandlerRegistry;

/// Normalized outcome of one tool invocation
///
/// Exactly one of payload/error is meaningful: `error` is always None on
/// success, and `payload` is Null on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocationResult {
    pub tool_name: String,
    pub action: String,
    pub success: bool,
    #[serde(default)]
    pub payload: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolInvocationResult {
    /// Create a successful result
    pub fn success(tool_name: impl Into<String>, action: impl Into<String>, payload: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            action: action.into(),
            success: true,
            payload,
            error: None,
        }
    }

    /// Create a failure result
    pub fn failure(tool_name: impl Into<String>, action: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            action: action.into(),
            success: false,
            payload: Value::Null,
            error: Some(error.into()),
        }
    }
}

/// One entry of a multi-tool batch
#[derive(Debug, Clone)]
pub struct ToolRequest {
    pub tool_name: String,
    pub action: String,
    pub params: Value,
}

impl ToolRequest {
    /// Create a new tool request
    pub fn new(tool_name: impl Into<String>, action: impl Into<String>, params: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            action: action.into(),
            params,
        }
    }
}

/// Aggregate outcome of a batch run
#[derive(Debug, Clone)]
pub struct ToolBatchOutcome {
    /// One result per request, in request order
    pub results: Vec<ToolInvocationResult>,
    /// Logical AND of the individual success flags
    pub overall_success: bool,
}

/// Invokes tools through the catalog's enabled gate and the handler registry
pub struct ToolExecutor {
    catalog: SharedCatalog,
    handlers: Arc<HandlerRegistry>,
}

impl ToolExecutor {
    /// Create an executor over the shared catalog and handler registry
    pub fn new(catalog: SharedCatalog, handlers: Arc<HandlerRegistry>) -> Self {
        Self { catalog, handlers }
    }

    /// Invoke one tool
    ///
    /// Never returns an error and never panics: unknown tools, disabled
    /// tools, handler failures, and timeouts all come back as failure
    /// envelopes. The enabled flag is a snapshot read; a toggle landing
    /// mid-run is observed by the next invocation.
    pub async fn invoke(&self, tool_name: &str, action: &str, params: &Value) -> ToolInvocationResult {
        let descriptor = match self.catalog.get(tool_name) {
            Some(descriptor) => descriptor,
            None => {
                warn!("invoke of unknown tool '{}'", tool_name);
                return ToolInvocationResult::failure(tool_name, action, format!("tool '{}' not found", tool_name));
            }
        };

        if !descriptor.enabled {
            return ToolInvocationResult::failure(tool_name, action, format!("tool '{}' is disabled", tool_name));
        }

        let handler = match self.handlers.get(tool_name) {
            Some(handler) => handler,
            None => {
                return ToolInvocationResult::failure(
                    tool_name,
                    action,
                    format!("no handler registered for tool '{}'", tool_name),
                );
            }
        };

        info!("executing {}.{}", tool_name, action);

        let budget = Duration::from_millis(descriptor.effective_timeout_ms());
        match timeout(budget, handler.execute(action, params)).await {
            Ok(Ok(payload)) => ToolInvocationResult::success(tool_name, action, payload),
            Ok(Err(e)) => {
                warn!("tool {} failed: {}", tool_name, e);
                ToolInvocationResult::failure(tool_name, action, e.to_string())
            }
            Err(_) => {
                warn!("tool {} timed out after {:?}", tool_name, budget);
                ToolInvocationResult::failure(
                    tool_name,
                    action,
                    format!("tool '{}' timed out after {}ms", tool_name, budget.as_millis()),
                )
            }
        }
    }

    /// Invoke a batch of tools strictly in order
    ///
    /// Best-effort: one failure does not stop the remaining requests.
    pub async fn invoke_many(&self, requests: &[ToolRequest]) -> ToolBatchOutcome {
        let mut results = Vec::with_capacity(requests.len());

        for request in requests {
            let result = self.invoke(&request.tool_name, &request.action, &request.params).await;
            results.push(result);
        }

        let overall_success = results.iter().all(|r| r.success);

        ToolBatchOutcome {
            results,
            overall_success,
        }
    }
}
