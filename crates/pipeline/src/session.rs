//! Per-session conversation state.

use serde::{Deserialize, Serialize};

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Display label for transcripts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Append-only conversation history for one session.
///
/// Lives in memory only: created when the session starts, dropped when it
/// ends. Turns are never edited or removed.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns in insertion order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the conversation has no turns yet.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append a user turn.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::User,
            content: content.into(),
        });
    }

    /// Append an assistant turn.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    /// Render the transcript for display.
    ///
    /// Pure formatting over the current turns; rendering twice without new
    /// messages produces identical output.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for turn in &self.turns {
            out.push_str(turn.role.as_str());
            out.push_str(": ");
            out.push_str(&turn.content);
            out.push('\n');
        }
        out
    }
}
