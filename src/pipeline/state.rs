//! Pipeline state threaded through the four stages
//!
//! One `PipelineState` is owned exclusively by one run: stages append to the
//! message log, accumulate tool results, and record at most one error (first
//! error wins, later stages still run).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::llm::IntentAnalysis;
use crate::router::RoutingDecision;
use crate::tools::ToolInvocationResult;

/// The four pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    AnalyzeIntent,
    Route,
    ExecuteTools,
    GenerateResponse,
}

impl Stage {
    /// Stage name as it appears in logs and stage records
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::AnalyzeIntent => "analyze_intent",
            Stage::Route => "route",
            Stage::ExecuteTools => "execute_tools",
            Stage::GenerateResponse => "generate_response",
        }
    }
}

/// Typed payload of one stage record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageResult {
    Intent(IntentAnalysis),
    Route(RoutingDecision),
    Execute(ToolInvocationResult),
    Response { response: String, model: String },
}

/// One entry of the append-only stage log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: Stage,
    pub result: StageResult,
}

/// Mutable context for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub query: String,
    pub session_id: String,
    pub active_tools: Vec<String>,
    /// Append-only, in execution order
    pub stage_messages: Vec<StageRecord>,
    /// Tool results accumulated by the execute stage, keyed by tool name
    pub tool_results: HashMap<String, ToolInvocationResult>,
    /// Set only by the terminal stage
    pub final_response: String,
    /// Sticky: the first recorded error survives the rest of the run
    pub error: Option<String>,
}

impl PipelineState {
    /// Create the state for one run
    pub fn new(query: impl Into<String>, session_id: impl Into<String>, active_tools: Vec<String>) -> Self {
        Self {
            query: query.into(),
            session_id: session_id.into(),
            active_tools,
            stage_messages: Vec::new(),
            tool_results: HashMap::new(),
            final_response: String::new(),
            error: None,
        }
    }

    /// Append a stage record
    pub fn push_stage(&mut self, stage: Stage, result: StageResult) {
        self.stage_messages.push(StageRecord { stage, result });
    }

    /// Record a stage failure; the first error wins
    pub fn record_error(&mut self, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        log::error!("stage {} failed: {}", stage.as_str(), message);
        if self.error.is_none() {
            self.error = Some(message);
        }
    }

    /// Most recent routing decision in the stage log, if any
    pub fn latest_route(&self) -> Option<&RoutingDecision> {
        self.stage_messages.iter().rev().find_map(|record| match &record.result {
            StageResult::Route(decision) => Some(decision),
            _ => None,
        })
    }
}

/// Structured result of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub success: bool,
    pub response: String,
    pub tool_results: HashMap<String, ToolInvocationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub session_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::RoutingCandidate;

    #[test]
    fn test_stage_as_str() {
        assert_eq!(Stage::AnalyzeIntent.as_str(), "analyze_intent");
        assert_eq!(Stage::Route.as_str(), "route");
        assert_eq!(Stage::ExecuteTools.as_str(), "execute_tools");
        assert_eq!(Stage::GenerateResponse.as_str(), "generate_response");
    }

    #[test]
    fn test_stage_serialization() {
        assert_eq!(serde_json::to_string(&Stage::Route).unwrap(), "\"route\"");
        assert_eq!(
            serde_json::to_string(&Stage::GenerateResponse).unwrap(),
            "\"generate_response\""
        );
    }

    #[test]
    fn test_new_state_empty() {
        let state = PipelineState::new("query", "s1", vec!["climate".to_string()]);

        assert_eq!(state.query, "query");
        assert_eq!(state.session_id, "s1");
        assert!(state.stage_messages.is_empty());
        assert!(state.tool_results.is_empty());
        assert!(state.final_response.is_empty());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_push_stage_preserves_order() {
        let mut state = PipelineState::new("q", "s", vec![]);

        state.push_stage(
            Stage::AnalyzeIntent,
            StageResult::Intent(IntentAnalysis {
                analysis: "a".to_string(),
                query: "q".to_string(),
            }),
        );
        state.push_stage(Stage::Route, StageResult::Route(RoutingDecision::default()));

        assert_eq!(state.stage_messages.len(), 2);
        assert_eq!(state.stage_messages[0].stage, Stage::AnalyzeIntent);
        assert_eq!(state.stage_messages[1].stage, Stage::Route);
    }

    #[test]
    fn test_record_error_first_wins() {
        let mut state = PipelineState::new("q", "s", vec![]);

        state.record_error(Stage::AnalyzeIntent, "first failure");
        state.record_error(Stage::GenerateResponse, "second failure");

        assert_eq!(state.error.as_deref(), Some("first failure"));
    }

    #[test]
    fn test_latest_route_none() {
        let state = PipelineState::new("q", "s", vec![]);
        assert!(state.latest_route().is_none());
    }

    #[test]
    fn test_latest_route_finds_most_recent() {
        let mut state = PipelineState::new("q", "s", vec![]);

        state.push_stage(Stage::Route, StageResult::Route(RoutingDecision::default()));

        let second = RoutingDecision {
            candidates: vec![RoutingCandidate {
                tool_name: "climate".to_string(),
                confidence: 0.8,
            }],
            primary: Some(RoutingCandidate {
                tool_name: "climate".to_string(),
                confidence: 0.8,
            }),
            requires_multiple: false,
        };
        state.push_stage(Stage::Route, StageResult::Route(second));

        let latest = state.latest_route().unwrap();
        assert_eq!(latest.primary_tool(), Some("climate"));
    }

    #[test]
    fn test_outcome_serialization_skips_missing_error() {
        let outcome = PipelineOutcome {
            success: true,
            response: "hi".to_string(),
            tool_results: HashMap::new(),
            error: None,
            session_id: "s1".to_string(),
        };

        let json = serde_json::to_string(&outcome).unwrap();
        assert!(!json.contains("\"error\""));
        assert!(json.contains("\"success\":true"));
    }

    #[test]
    fn test_stage_record_tagged_serialization() {
        let record = StageRecord {
            stage: Stage::Route,
            result: StageResult::Route(RoutingDecision::default()),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["stage"], "route");
        assert_eq!(json["result"]["kind"], "route");
    }
}
