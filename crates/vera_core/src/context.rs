//! Conversation context - per-session turn log.
//!
//! Append-only within a session, cleared when the session ends. Only the
//! judgment strategy reads it; only the session driver appends, and only
//! after a turn has fully completed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One utterance in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Ordered log of prior turns for one session.
///
/// No eviction: bounded by session lifetime only. Long-lived sessions would
/// need a cap before this is production-ready.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    session_id: Uuid,
    turns: Vec<Turn>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            turns: Vec::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn push(&mut self, role: Role, text: impl Into<String>) {
        self.turns.push(Turn {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        });
    }

    /// Drop all turns, ending the session's history.
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new()
    }
}
