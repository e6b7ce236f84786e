//! Pipeline orchestrator - the four-stage query pipeline
//!
//! ANALYZE_INTENT -> ROUTE -> [branch] -> EXECUTE_TOOLS -> GENERATE_RESPONSE
//!
//! Stages run strictly in order within one run; intent and routing failures
//! degrade the run without aborting it, and only the terminal stage's
//! failure becomes the user-visible response. `run` always returns a
//! structured outcome.

pub mod state;

pub use state::{PipelineOutcome, PipelineState, Stage, StageRecord, StageResult};

use log::{debug, info};
use serde_json::json;

use crate::llm::Agent;
use crate::router::Router;
use crate::tools::ToolExecutor;

/// Generic action used when executing a routed tool
const EXECUTE_ACTION: &str = "execute";

/// Drives one query through the four stages
pub struct Orchestrator {
    router: Router,
    executor: ToolExecutor,
    agent: Agent,
}

impl Orchestrator {
    /// Create an orchestrator from its three collaborators
    pub fn new(router: Router, executor: ToolExecutor, agent: Agent) -> Self {
        Self {
            router,
            executor,
            agent,
        }
    }

    /// Run the pipeline for one query
    ///
    /// Never fails and never panics: every stage converts its collaborator's
    /// failure into state, and `success` reflects whether any stage recorded
    /// an error.
    pub async fn run(&self, query: &str, session_id: &str, active_tools: Vec<String>) -> PipelineOutcome {
        info!("pipeline run for session {}", session_id);
        let mut state = PipelineState::new(query, session_id, active_tools);

        self.analyze_intent(&mut state).await;
        self.route(&mut state);

        if self.should_execute(&state) {
            self.execute_tools(&mut state).await;
        } else {
            debug!("no routing candidates, skipping tool execution");
        }

        self.generate_response(&mut state).await;

        PipelineOutcome {
            success: state.error.is_none(),
            response: state.final_response,
            tool_results: state.tool_results,
            error: state.error,
            session_id: state.session_id,
        }
    }

    /// ANALYZE_INTENT: non-fatal on failure
    async fn analyze_intent(&self, state: &mut PipelineState) {
        match self.agent.analyze_intent(&state.query).await {
            Ok(analysis) => state.push_stage(Stage::AnalyzeIntent, StageResult::Intent(analysis)),
            Err(e) => state.record_error(Stage::AnalyzeIntent, e.to_string()),
        }
    }

    /// ROUTE: pure scoring over the catalog snapshot, cannot fail
    fn route(&self, state: &mut PipelineState) {
        let decision = self.router.route(&state.query, Some(&state.active_tools));
        debug!(
            "routing produced {} candidate(s), primary {:?}",
            decision.candidates.len(),
            decision.primary_tool()
        );
        state.push_stage(Stage::Route, StageResult::Route(decision));
    }

    /// Branch decision: execute tools iff the latest route has candidates
    fn should_execute(&self, state: &PipelineState) -> bool {
        state.latest_route().map(|d| d.has_candidates()).unwrap_or(false)
    }

    /// EXECUTE_TOOLS: invokes only the primary candidate with the generic
    /// action and empty params; the envelope itself is stored even when the
    /// invocation failed
    async fn execute_tools(&self, state: &mut PipelineState) {
        let primary = match state.latest_route().and_then(|d| d.primary.clone()) {
            Some(candidate) => candidate,
            None => return,
        };

        let result = self
            .executor
            .invoke(&primary.tool_name, EXECUTE_ACTION, &json!({}))
            .await;

        state.tool_results.insert(primary.tool_name.clone(), result.clone());
        state.push_stage(Stage::ExecuteTools, StageResult::Execute(result));
    }

    /// GENERATE_RESPONSE: terminal stage; its failure is the one the user
    /// sees directly
    async fn generate_response(&self, state: &mut PipelineState) {
        let context = json!({
            "tool_results": state.tool_results,
            "active_tools": state.active_tools,
        });

        match self
            .agent
            .generate_response(&state.query, &state.session_id, &state.active_tools, &context)
            .await
        {
            Ok(generated) => {
                state.final_response = generated.response.clone();
                state.push_stage(
                    Stage::GenerateResponse,
                    StageResult::Response {
                        response: generated.response,
                        model: generated.model,
                    },
                );
            }
            Err(e) => {
                state.record_error(Stage::GenerateResponse, e.to_string());
                state.final_response = format!("Error: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SharedCatalog;
    use crate::llm::MockLlmClient;
    use crate::memory::SessionMemory;
    use crate::tools::testing::MockHandler;
    use crate::tools::HandlerRegistry;
    use std::sync::Arc;

    fn orchestrator_with(client: MockLlmClient) -> Orchestrator {
        let mut registry = HandlerRegistry::new();
        registry.register(Arc::new(MockHandler::succeeding(
            "climate",
            &["weather", "climate", "temperature"],
            json!({"temperature": "20C"}),
        )));
        registry.register(Arc::new(MockHandler::failing(
            "broken",
            &["broken"],
            "handler exploded",
        )));

        let catalog = SharedCatalog::new(registry.build_catalog().unwrap());
        let registry = Arc::new(registry);

        Orchestrator::new(
            Router::new(catalog.clone()),
            ToolExecutor::new(catalog, registry),
            Agent::new(Arc::new(client), SessionMemory::new()),
        )
    }

    fn active(tools: &[&str]) -> Vec<String> {
        tools.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_run_with_matching_tool() {
        let orchestrator = orchestrator_with(MockLlmClient::new().with_response("sunny answer"));
        let outcome = orchestrator
            .run("what is the weather in Paris", "s1", active(&["climate"]))
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.response, "sunny answer");
        assert_eq!(outcome.tool_results.len(), 1);
        assert!(outcome.tool_results["climate"].success);
        assert_eq!(outcome.session_id, "s1");
    }

    #[tokio::test]
    async fn test_run_without_match_skips_execution() {
        let orchestrator = orchestrator_with(MockLlmClient::new());
        let outcome = orchestrator.run("hello", "s1", active(&["climate"])).await;

        assert!(outcome.success);
        assert!(outcome.tool_results.is_empty());
    }

    #[tokio::test]
    async fn test_run_empty_active_set_skips_execution() {
        let orchestrator = orchestrator_with(MockLlmClient::new());
        let outcome = orchestrator.run("what is the weather", "s1", vec![]).await;

        assert!(outcome.success);
        assert!(outcome.tool_results.is_empty());
    }

    #[tokio::test]
    async fn test_tool_failure_is_recorded_not_fatal() {
        let orchestrator = orchestrator_with(MockLlmClient::new().with_response("degraded answer"));
        let outcome = orchestrator.run("broken please", "s1", active(&["broken"])).await;

        // The envelope records the failure; the pipeline itself succeeds
        assert!(outcome.success);
        assert!(!outcome.tool_results["broken"].success);
        assert_eq!(outcome.response, "degraded answer");
    }

    #[tokio::test]
    async fn test_all_collaborators_failing_still_structured() {
        let orchestrator = orchestrator_with(MockLlmClient::failing("everything is down"));
        let outcome = orchestrator
            .run("what is the weather", "s1", active(&["climate"]))
            .await;

        assert!(!outcome.success);
        assert!(outcome.error.as_ref().unwrap().contains("everything is down"));
        assert!(outcome.response.starts_with("Error:"));
        assert_eq!(outcome.session_id, "s1");
    }

    #[tokio::test]
    async fn test_intent_failure_is_sticky() {
        // First LLM call (intent analysis) fails; routing, execution, and
        // generation all succeed. The sticky error still fails the run.
        let client = MockLlmClient::new()
            .with_response("recovered answer")
            .failing_first(1, "intent backend down");
        let orchestrator = orchestrator_with(client);

        let outcome = orchestrator
            .run("what is the weather", "s1", active(&["climate"]))
            .await;

        assert!(!outcome.success);
        assert!(outcome.error.as_ref().unwrap().contains("intent backend down"));
        // Later stages still ran: the tool executed and the answer was generated
        assert_eq!(outcome.tool_results.len(), 1);
        assert_eq!(outcome.response, "recovered answer");
    }

    #[tokio::test]
    async fn test_generate_response_receives_tool_context() {
        // The mock returns a fixed response; what matters is that the run
        // reaches generation with accumulated tool results intact
        let orchestrator = orchestrator_with(MockLlmClient::new());
        let outcome = orchestrator
            .run("temperature today", "s1", active(&["climate"]))
            .await;

        assert_eq!(outcome.tool_results["climate"].payload["temperature"], "20C");
    }

    #[tokio::test]
    async fn test_runs_do_not_share_state() {
        let orchestrator = orchestrator_with(MockLlmClient::new());

        let first = orchestrator
            .run("weather now", "s1", active(&["climate"]))
            .await;
        let second = orchestrator.run("hello again", "s2", active(&["climate"])).await;

        assert_eq!(first.tool_results.len(), 1);
        assert!(second.tool_results.is_empty());
        assert_eq!(second.session_id, "s2");
    }
}
