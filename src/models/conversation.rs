use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Appointment;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// At most one in-flight state-changing request per session. While one
/// exists, the next turn is read as a reply to it before any intent
/// classification happens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingAction {
    /// A fully-normalized booking waiting for an explicit yes/no.
    AwaitingConfirmation {
        appointment: Appointment,
        pretty_date: String,
    },
    /// A booking request that arrived without a name. Date/time are kept so
    /// the follow-up turn only has to supply the name; confirmation is not
    /// reachable until it does.
    NameRequired {
        date: String,
        time: String,
        pretty_date: String,
    },
}

/// One chat conversation, owned by the session map. History is append-only;
/// only a trailing window is ever sent to the completion service.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: String,
    pub messages: Vec<ChatMessage>,
    pub pending: Option<PendingAction>,
    pub last_activity: NaiveDateTime,
}

impl ChatSession {
    pub fn new(id: String, now: NaiveDateTime) -> Self {
        Self {
            id,
            messages: Vec::new(),
            pending: None,
            last_activity: now,
        }
    }
}
