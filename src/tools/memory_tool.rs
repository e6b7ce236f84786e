//! Memory tool - session-keyed key/value store for conversational context
//!
//! The store lives behind a concurrency-safe handle owned by the tool
//! instance; there is no module-level global.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};

use super::{HandlerError, ToolHandler};

#[derive(Debug, Clone)]
struct MemoryItem {
    value: Value,
    timestamp: String,
}

/// Conversational memory tool: store, retrieve, search, clear
pub struct MemoryTool {
    store: Arc<RwLock<HashMap<String, HashMap<String, MemoryItem>>>>,
}

impl MemoryTool {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, HandlerError> {
        params[key]
            .as_str()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| HandlerError::invalid(format!("missing '{}' parameter", key)))
    }

    fn store_item(&self, session_id: &str, key: &str, value: Value) -> Value {
        let mut store = self.store.write().unwrap();
        store.entry(session_id.to_string()).or_default().insert(
            key.to_string(),
            MemoryItem {
                value,
                timestamp: Utc::now().to_rfc3339(),
            },
        );

        json!({
            "action": "store",
            "session_id": session_id,
            "key": key
        })
    }

    fn retrieve(&self, session_id: &str, key: Option<&str>) -> Value {
        let store = self.store.read().unwrap();
        let session = store.get(session_id);

        let data = match (session, key) {
            (Some(items), Some(key)) => items
                .get(key)
                .map(|item| json!({"value": item.value, "timestamp": item.timestamp}))
                .unwrap_or(Value::Null),
            (Some(items), None) => {
                let all: serde_json::Map<String, Value> = items
                    .iter()
                    .map(|(k, item)| {
                        (k.clone(), json!({"value": item.value, "timestamp": item.timestamp}))
                    })
                    .collect();
                Value::Object(all)
            }
            (None, _) => json!({}),
        };

        json!({
            "action": "retrieve",
            "session_id": session_id,
            "data": data
        })
    }

    fn search(&self, session_id: &str, query: &str) -> Value {
        let store = self.store.read().unwrap();
        let query_lower = query.to_lowercase();

        let results: Vec<Value> = store
            .get(session_id)
            .map(|items| {
                items
                    .iter()
                    .filter(|(_, item)| item.value.to_string().to_lowercase().contains(&query_lower))
                    .map(|(key, item)| {
                        json!({"key": key, "value": item.value, "timestamp": item.timestamp})
                    })
                    .collect()
            })
            .unwrap_or_default();

        let count = results.len();
        json!({
            "action": "search",
            "session_id": session_id,
            "results": results,
            "count": count
        })
    }

    fn clear(&self, session_id: &str) -> Value {
        let mut store = self.store.write().unwrap();
        let existed = store.remove(session_id).is_some();

        json!({
            "action": "clear",
            "session_id": session_id,
            "cleared": existed
        })
    }
}

impl Default for MemoryTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolHandler for MemoryTool {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn description(&self) -> &'static str {
        "Store and retrieve conversation context"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["remember", "recall", "memory", "history", "context"]
    }

    async fn execute(&self, action: &str, params: &Value) -> Result<Value, HandlerError> {
        match action {
            "store" => {
                let session_id = Self::required_str(params, "session_id")?;
                let key = Self::required_str(params, "key")?;
                let value = params["value"].clone();
                Ok(self.store_item(session_id, key, value))
            }
            "retrieve" | "execute" => {
                let session_id = Self::required_str(params, "session_id")?;
                Ok(self.retrieve(session_id, params["key"].as_str()))
            }
            "search" => {
                let session_id = Self::required_str(params, "session_id")?;
                let query = Self::required_str(params, "query")?;
                Ok(self.search(session_id, query))
            }
            "clear" => {
                let session_id = Self::required_str(params, "session_id")?;
                Ok(self.clear(session_id))
            }
            other => Err(HandlerError::UnknownAction {
                action: other.to_string(),
            }),
        }
    }
}
