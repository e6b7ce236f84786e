//! Tool catalog - descriptors, enabled flags, and registration-ordered lookup
//!
//! The catalog is the single source of truth for which tools exist and which
//! are currently enabled. Registration order is preserved because routing
//! tie-breaks depend on it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{ChatrError, Result};

/// Default timeout for a tool invocation when the descriptor does not set one
pub const DEFAULT_TOOL_TIMEOUT_MS: u64 = 30_000;

fn default_enabled() -> bool {
    true
}

/// Identity and routing metadata for one pluggable tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool name (e.g., "climate", "calculator")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Whether the tool can currently be routed to and invoked
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Keywords used for query matching
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Timeout in milliseconds for one invocation
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ToolDescriptor {
    /// Create a new descriptor, enabled by default
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            enabled: true,
            keywords: Vec::new(),
            timeout_ms: None,
        }
    }

    /// Set routing keywords
    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Set invocation timeout
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Start out disabled
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Get effective timeout (module default if not specified)
    pub fn effective_timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(DEFAULT_TOOL_TIMEOUT_MS)
    }
}

/// Catalog of tool descriptors, iterated in registration order
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    order: Vec<String>,
    tools: HashMap<String, ToolDescriptor>,
}

impl ToolCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor
    ///
    /// Rejects duplicate names and empty-string keywords; both are
    /// catalog-build-time invariants the router relies on.
    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<()> {
        if descriptor.name.is_empty() {
            return Err(ChatrError::Catalog("tool name must not be empty".to_string()));
        }
        if self.tools.contains_key(&descriptor.name) {
            return Err(ChatrError::Catalog(format!("duplicate tool: {}", descriptor.name)));
        }
        if descriptor.keywords.iter().any(|k| k.is_empty()) {
            return Err(ChatrError::Catalog(format!(
                "tool '{}' has an empty keyword",
                descriptor.name
            )));
        }

        self.order.push(descriptor.name.clone());
        self.tools.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// Get a descriptor by name
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all tool names in registration order
    pub fn list(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    /// Names of enabled tools, in registration order
    pub fn active(&self) -> Vec<String> {
        self.descriptors()
            .filter(|d| d.enabled)
            .map(|d| d.name.clone())
            .collect()
    }

    /// Iterate descriptors in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.order.iter().filter_map(|name| self.tools.get(name))
    }

    /// Set a tool's enabled flag; returns false if the tool is unknown
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.tools.get_mut(name) {
            Some(tool) => {
                tool.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Flip a tool's enabled flag; returns the new state, or None if unknown
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        self.tools.get_mut(name).map(|tool| {
            tool.enabled = !tool.enabled;
            tool.enabled
        })
    }

    /// Get number of tools
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if catalog is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Cloneable handle to a catalog shared between the router, the executor,
/// and admin surfaces
///
/// Reads are snapshot reads: a toggle landing mid-run is observed by later
/// lookups, with no cross-run transactional guarantee.
#[derive(Clone, Default)]
pub struct SharedCatalog {
    inner: Arc<RwLock<ToolCatalog>>,
}

impl SharedCatalog {
    /// Wrap a catalog in a shared handle
    pub fn new(catalog: ToolCatalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(catalog)),
        }
    }

    /// Clone the full catalog state
    pub fn snapshot(&self) -> ToolCatalog {
        self.inner.read().unwrap().clone()
    }

    /// Get a descriptor snapshot by name
    pub fn get(&self, name: &str) -> Option<ToolDescriptor> {
        self.inner.read().unwrap().get(name).cloned()
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().unwrap().contains(name)
    }

    /// List all tool names in registration order
    pub fn list(&self) -> Vec<String> {
        self.inner.read().unwrap().list().iter().map(|s| s.to_string()).collect()
    }

    /// Names of enabled tools, in registration order
    pub fn active(&self) -> Vec<String> {
        self.inner.read().unwrap().active()
    }

    /// Set a tool's enabled flag; returns false if the tool is unknown
    pub fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        self.inner.write().unwrap().set_enabled(name, enabled)
    }

    /// Flip a tool's enabled flag; returns the new state, or None if unknown
    pub fn toggle(&self, name: &str) -> Option<bool> {
        self.inner.write().unwrap().toggle(name)
    }

    /// Get number of tools
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    /// Check if catalog is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }
}
