//! UI-agnostic conversation log types
//!
//! Each chat mode owns exactly one transcript. The log is append-only:
//! entries are never edited or removed individually, only the whole
//! transcript is cleared when a mode resets.

use serde::{Deserialize, Serialize};

/// A single turn in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Set for product recommendation entries so the UI can style them
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_product: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            is_product: false,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            is_product: false,
        }
    }

    pub fn product(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            is_product: true,
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

/// Ordered, append-only conversation log for one mode
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.entries.push(message);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.entries.last()
    }
}
