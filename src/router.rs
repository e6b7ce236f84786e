//! Query routing - score catalog tools against a query by keyword overlap
//!
//! Routing is a pure function of (query, active set, catalog snapshot): no
//! hidden state, no randomness, and never a terminal error for business
//! input.

use serde::{Deserialize, Serialize};

use crate::catalog::SharedCatalog;

/// Additive baseline ensuring any keyword match scores above 0.5
const CONFIDENCE_BASELINE: f64 = 0.5;

/// One tool judged relevant to a query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingCandidate {
    pub tool_name: String,
    /// Confidence in (0, 1]
    pub confidence: f64,
}

/// Aggregate routing result for one query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// Candidates sorted by confidence descending; catalog registration
    /// order breaks ties
    pub candidates: Vec<RoutingCandidate>,
    /// Highest-confidence candidate, if any
    pub primary: Option<RoutingCandidate>,
    /// True iff more than one candidate matched
    pub requires_multiple: bool,
}

impl RoutingDecision {
    /// Name of the primary candidate, if any
    pub fn primary_tool(&self) -> Option<&str> {
        self.primary.as_ref().map(|c| c.tool_name.as_str())
    }

    /// Check if any tool matched
    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }
}

/// Scores catalog entries against queries
///
/// Holds a handle to the shared catalog; each `route` call works on a
/// snapshot, so a concurrent toggle is observed atomically per call.
#[derive(Clone)]
pub struct Router {
    catalog: SharedCatalog,
}

impl Router {
    /// Create a router over the given catalog handle
    pub fn new(catalog: SharedCatalog) -> Self {
        Self { catalog }
    }

    /// Route a query against the catalog
    ///
    /// With `active = None` the enabled flag alone decides which tools are
    /// scanned. With `Some(list)` the list is the filter (pure membership;
    /// names absent from the catalog are silently ignored) and the enabled
    /// flag is left to the executor, which reports disabled tools as
    /// invocation failures.
    ///
    /// Matching is case-folded literal substring. A single pass per tool
    /// counts every matching keyword; a tool is admitted as a candidate iff
    /// that count is non-zero, and its confidence is
    /// `min(count / keywords + 0.5, 1.0)`.
    pub fn route(&self, query: &str, active: Option<&[String]>) -> RoutingDecision {
        let query_lower = query.to_lowercase();
        let snapshot = self.catalog.snapshot();

        let mut candidates = Vec::new();

        for descriptor in snapshot.descriptors() {
            let admitted = match active {
                Some(allow) => allow.iter().any(|name| name == &descriptor.name),
                None => descriptor.enabled,
            };
            if !admitted || descriptor.keywords.is_empty() {
                continue;
            }

            let matched = descriptor
                .keywords
                .iter()
                .filter(|keyword| query_lower.contains(&keyword.to_lowercase()))
                .count();

            if matched > 0 {
                let total = descriptor.keywords.len();
                let confidence = (matched as f64 / total as f64 + CONFIDENCE_BASELINE).min(1.0);
                candidates.push(RoutingCandidate {
                    tool_name: descriptor.name.clone(),
                    confidence,
                });
            }
        }

        // Stable sort keeps registration order on equal confidence
        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let primary = candidates.first().cloned();
        let requires_multiple = candidates.len() > 1;

        RoutingDecision {
            candidates,
            primary,
            requires_multiple,
        }
    }
}
