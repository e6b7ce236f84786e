//! Wikipedia tool - article search and summaries via the MediaWiki API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::{HandlerError, ToolHandler};

/// MediaWiki API endpoint
const WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Max characters of extract included in the payload
const MAX_SUMMARY_CHARS: usize = 500;

/// Upstream request timeout
const HTTP_TIMEOUT_SECS: u64 = 10;

/// Wikipedia lookup tool
pub struct WikipediaTool {
    client: Client,
}

impl WikipediaTool {
    pub fn new() -> Result<Self, HandlerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    /// Pull the first search hit's title out of a search response
    fn parse_search_title(body: &Value) -> Result<String, HandlerError> {
        body["query"]["search"]
            .get(0)
            .and_then(|hit| hit["title"].as_str())
            .map(|title| title.to_string())
            .ok_or_else(|| HandlerError::NotFound {
                what: "no matching article".to_string(),
            })
    }

    /// Shape an extracts response into the result payload
    fn parse_summary(query: &str, body: &Value) -> Result<Value, HandlerError> {
        let pages = body["query"]["pages"].as_object().ok_or_else(|| HandlerError::Upstream {
            message: "missing query.pages".to_string(),
        })?;

        let page = pages.values().next().ok_or_else(|| HandlerError::NotFound {
            what: "no article page".to_string(),
        })?;

        let extract = page["extract"].as_str().unwrap_or("");
        let summary: String = extract.chars().take(MAX_SUMMARY_CHARS).collect();
        let truncated = extract.chars().count() > MAX_SUMMARY_CHARS;

        Ok(json!({
            "query": query,
            "data": {
                "title": page["title"].as_str().unwrap_or(""),
                "summary": if truncated { format!("{}...", summary) } else { summary },
                "url": format!(
                    "https://en.wikipedia.org/wiki/{}",
                    page["title"].as_str().unwrap_or("").replace(' ', "_")
                )
            }
        }))
    }

    async fn lookup(&self, query: &str) -> Result<Value, HandlerError> {
        let search_body: Value = self
            .client
            .get(WIKIPEDIA_API_URL)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("format", "json"),
                ("srlimit", "1"),
            ])
            .send()
            .await?
            .json()
            .await?;

        let title = Self::parse_search_title(&search_body)?;

        let summary_body: Value = self
            .client
            .get(WIKIPEDIA_API_URL)
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("titles", title.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?
            .json()
            .await?;

        Self::parse_summary(query, &summary_body)
    }
}

#[async_trait]
impl ToolHandler for WikipediaTool {
    fn name(&self) -> &'static str {
        "wikipedia"
    }

    fn description(&self) -> &'static str {
        "Look up encyclopedia articles and definitions"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["wikipedia", "wiki", "encyclopedia", "definition", "explain"]
    }

    async fn execute(&self, action: &str, params: &Value) -> Result<Value, HandlerError> {
        match action {
            "lookup" | "search" | "execute" => {
                let query = params["query"]
                    .as_str()
                    .filter(|q| !q.is_empty())
                    .ok_or_else(|| HandlerError::invalid("no lookup query provided"))?;
                self.lookup(query).await
            }
            other => Err(HandlerError::UnknownAction {
                action: other.to_string(),
            }),
        }
    }
}
