//! Session memory - per-session conversation history
//!
//! An explicit keyed store behind a narrow get/append/clear interface,
//! shared between concurrent pipeline runs via a cloneable handle. Appends
//! to the same session from concurrent runs are last-writer-wins; the
//! system defines no cross-run ordering within a session.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Speaker role in a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire/name form of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One conversation turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a user turn stamped now
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant turn stamped now
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Cloneable handle to the shared session store
#[derive(Clone, Default)]
pub struct SessionMemory {
    sessions: Arc<RwLock<HashMap<String, Vec<Turn>>>>,
}

impl SessionMemory {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn to a session, creating the session if needed
    pub fn append(&self, session_id: &str, turn: Turn) {
        let mut sessions = self.sessions.write().unwrap();
        sessions.entry(session_id.to_string()).or_default().push(turn);
    }

    /// Full history for a session, oldest first; empty if unknown
    pub fn history(&self, session_id: &str) -> Vec<Turn> {
        let sessions = self.sessions.read().unwrap();
        sessions.get(session_id).cloned().unwrap_or_default()
    }

    /// Most recent `limit` turns for a session, oldest first
    pub fn recent(&self, session_id: &str, limit: usize) -> Vec<Turn> {
        let sessions = self.sessions.read().unwrap();
        match sessions.get(session_id) {
            Some(turns) => {
                let skip = turns.len().saturating_sub(limit);
                turns[skip..].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Remove a session's history entirely; returns whether it existed
    pub fn clear(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().unwrap();
        sessions.remove(session_id).is_some()
    }

    /// Known session ids (unordered)
    pub fn sessions(&self) -> Vec<String> {
        let sessions = self.sessions.read().unwrap();
        sessions.keys().cloned().collect()
    }

    /// Number of turns stored for a session
    pub fn len(&self, session_id: &str) -> usize {
        let sessions = self.sessions.read().unwrap();
        sessions.get(session_id).map(|t| t.len()).unwrap_or(0)
    }

    /// Check if a session has no history
    pub fn is_empty(&self, session_id: &str) -> bool {
        self.len(session_id) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }

    #[test]
    fn test_turn_constructors() {
        let user = Turn::user("Hello");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.content, "Hello");

        let assistant = Turn::assistant("Hi there");
        assert_eq!(assistant.role, Role::Assistant);
        assert_eq!(assistant.content, "Hi there");
    }

    #[test]
    fn test_append_and_history() {
        let memory = SessionMemory::new();
        memory.append("s1", Turn::user("question"));
        memory.append("s1", Turn::assistant("answer"));

        let history = memory.history("s1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Assistant);
    }

    #[test]
    fn test_history_unknown_session_empty() {
        let memory = SessionMemory::new();
        assert!(memory.history("nope").is_empty());
    }

    #[test]
    fn test_sessions_isolated() {
        let memory = SessionMemory::new();
        memory.append("s1", Turn::user("one"));
        memory.append("s2", Turn::user("two"));

        assert_eq!(memory.len("s1"), 1);
        assert_eq!(memory.len("s2"), 1);
        assert_eq!(memory.history("s1")[0].content, "one");
    }

    #[test]
    fn test_recent_limits_turns() {
        let memory = SessionMemory::new();
        for i in 0..5 {
            memory.append("s1", Turn::user(format!("turn {}", i)));
        }

        let recent = memory.recent("s1", 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "turn 3");
        assert_eq!(recent[1].content, "turn 4");
    }

    #[test]
    fn test_recent_larger_than_history() {
        let memory = SessionMemory::new();
        memory.append("s1", Turn::user("only"));

        let recent = memory.recent("s1", 10);
        assert_eq!(recent.len(), 1);
    }

    #[test]
    fn test_clear() {
        let memory = SessionMemory::new();
        memory.append("s1", Turn::user("hello"));

        assert!(memory.clear("s1"));
        assert!(memory.history("s1").is_empty());
        assert!(!memory.clear("s1"));
    }

    #[test]
    fn test_clone_shares_state() {
        let memory = SessionMemory::new();
        let other = memory.clone();

        memory.append("s1", Turn::user("shared"));
        assert_eq!(other.len("s1"), 1);
    }

    #[test]
    fn test_sessions_listing() {
        let memory = SessionMemory::new();
        memory.append("a", Turn::user("x"));
        memory.append("b", Turn::user("y"));

        let mut names = memory.sessions();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
    }
}
