//! Web search tool - DuckDuckGo instant-answer API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::{HandlerError, ToolHandler};

/// DuckDuckGo instant-answer endpoint
const DUCKDUCKGO_API_URL: &str = "https://api.duckduckgo.com/";

/// Max related topics folded into the result list
const MAX_RELATED_TOPICS: usize = 3;

/// Upstream request timeout
const HTTP_TIMEOUT_SECS: u64 = 10;

/// Web search tool
pub struct WebSearchTool {
    client: Client,
}

impl WebSearchTool {
    pub fn new() -> Result<Self, HandlerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    /// Shape an instant-answer body into a result list
    fn parse_results(query: &str, body: &Value) -> Value {
        let mut results = Vec::new();

        if let Some(abstract_text) = body["AbstractText"].as_str() {
            if !abstract_text.is_empty() {
                results.push(json!({
                    "title": body["Heading"].as_str().unwrap_or("Result"),
                    "snippet": abstract_text,
                    "url": body["AbstractURL"].as_str().unwrap_or("")
                }));
            }
        }

        if let Some(topics) = body["RelatedTopics"].as_array() {
            for topic in topics.iter().take(MAX_RELATED_TOPICS) {
                if let Some(text) = topic["Text"].as_str() {
                    results.push(json!({
                        "title": text.chars().take(50).collect::<String>(),
                        "snippet": text,
                        "url": topic["FirstURL"].as_str().unwrap_or("")
                    }));
                }
            }
        }

        if results.is_empty() {
            results.push(json!({
                "title": "No results",
                "snippet": "Try a different search term"
            }));
        }

        let count = results.len();
        json!({
            "query": query,
            "results": results,
            "count": count
        })
    }

    async fn search(&self, query: &str) -> Result<Value, HandlerError> {
        let response = self
            .client
            .get(DUCKDUCKGO_API_URL)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HandlerError::Upstream {
                message: format!("duckduckgo returned status {}", status),
            });
        }

        let body: Value = response.json().await?;
        Ok(Self::parse_results(query, &body))
    }
}

#[async_trait]
impl ToolHandler for WebSearchTool {
    fn name(&self) -> &'static str {
        "web_search"
    }

    fn description(&self) -> &'static str {
        "Search the web for current information"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["search", "find", "look up", "google", "web", "internet", "online"]
    }

    async fn execute(&self, action: &str, params: &Value) -> Result<Value, HandlerError> {
        match action {
            "search" | "execute" => {
                let query = params["query"]
                    .as_str()
                    .filter(|q| !q.is_empty())
                    .ok_or_else(|| HandlerError::invalid("no search query provided"))?;
                self.search(query).await
            }
            other => Err(HandlerError::UnknownAction {
                action: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_results_with_abstract() {
        let body = json!({
            "Heading": "Rust",
            "AbstractText": "A systems programming language.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Rust",
            "RelatedTopics": []
        });

        let payload = WebSearchTool::parse_results("rust language", &body);
        assert_eq!(payload["count"], 1);
        assert_eq!(payload["results"][0]["title"], "Rust");
        assert_eq!(payload["results"][0]["snippet"], "A systems programming language.");
    }

    #[test]
    fn test_parse_results_related_topics_capped() {
        let topics: Vec<Value> = (0..5)
            .map(|i| json!({"Text": format!("topic {}", i), "FirstURL": "https://example.com"}))
            .collect();
        let body = json!({ "AbstractText": "", "RelatedTopics": topics });

        let payload = WebSearchTool::parse_results("anything", &body);
        assert_eq!(payload["count"], MAX_RELATED_TOPICS);
    }

    #[test]
    fn test_parse_results_empty_fallback() {
        let payload = WebSearchTool::parse_results("obscure", &json!({}));
        assert_eq!(payload["count"], 1);
        assert_eq!(payload["results"][0]["title"], "No results");
    }

    #[test]
    fn test_parse_results_title_truncated() {
        let long_text = "x".repeat(120);
        let body = json!({ "RelatedTopics": [{"Text": long_text}] });

        let payload = WebSearchTool::parse_results("q", &body);
        assert_eq!(payload["results"][0]["title"].as_str().unwrap().len(), 50);
    }

    #[tokio::test]
    async fn test_execute_missing_query() {
        let tool = WebSearchTool::new().unwrap();
        let err = tool.execute("search", &json!({})).await.unwrap_err();
        assert!(err.to_string().contains("no search query"));
    }

    #[tokio::test]
    async fn test_execute_empty_query() {
        let tool = WebSearchTool::new().unwrap();
        let err = tool.execute("search", &json!({"query": ""})).await.unwrap_err();
        assert!(matches!(err, HandlerError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_unknown_action() {
        let tool = WebSearchTool::new().unwrap();
        let err = tool.execute("crawl", &json!({})).await.unwrap_err();
        assert!(matches!(err, HandlerError::UnknownAction { .. }));
    }
}
