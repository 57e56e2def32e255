//! Caller-owned conversation context.
//!
//! Holds chat history, saved snapshots and attached document metadata for
//! one user session. The classifier never sees this; the advocate reads the
//! recent history window from it and appends to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const WELCOME_MESSAGE: &str = "Welcome to PakkiBL AI Legal Advocate!\n\n\
I'm here to help you with legal information and guidance. How can I assist you today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A timestamped copy of the message list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedConversation {
    pub timestamp: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
}

/// Metadata for a document the user attached to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub name: String,
    pub media_type: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// Message counts for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationStats {
    pub total: usize,
    pub user: usize,
    pub assistant: usize,
}

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    saved: Vec<SavedConversation>,
    documents: Vec<DocumentInfo>,
    total_queries: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Start a conversation seeded with the welcome message.
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(WELCOME_MESSAGE)],
            saved: Vec::new(),
            documents: Vec::new(),
            total_queries: 0,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    /// The last `n` messages, oldest first.
    pub fn recent(&self, n: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Drop the history and start over from the welcome message.
    ///
    /// Saved snapshots, documents and the query counter survive.
    pub fn clear(&mut self) {
        self.messages = vec![ChatMessage::assistant(WELCOME_MESSAGE)];
    }

    /// Snapshot the current messages.
    pub fn save(&mut self, now: DateTime<Utc>) -> &SavedConversation {
        self.saved.push(SavedConversation {
            timestamp: now,
            messages: self.messages.clone(),
        });
        &self.saved[self.saved.len() - 1]
    }

    pub fn saved(&self) -> &[SavedConversation] {
        &self.saved
    }

    /// Record an attached document. Returns `false` if one with the same
    /// name is already attached.
    pub fn attach_document(
        &mut self,
        name: impl Into<String>,
        media_type: impl Into<String>,
        size: u64,
        now: DateTime<Utc>,
    ) -> bool {
        let name = name.into();
        if self.documents.iter().any(|d| d.name == name) {
            return false;
        }
        self.documents.push(DocumentInfo {
            name,
            media_type: media_type.into(),
            size,
            uploaded_at: now,
        });
        true
    }

    pub fn documents(&self) -> &[DocumentInfo] {
        &self.documents
    }

    /// The most recently attached document, if any.
    pub fn latest_document(&self) -> Option<&DocumentInfo> {
        self.documents.last()
    }

    pub fn record_query(&mut self) {
        self.total_queries += 1;
    }

    pub fn total_queries(&self) -> u64 {
        self.total_queries
    }

    pub fn stats(&self) -> ConversationStats {
        let user = self
            .messages
            .iter()
            .filter(|m| m.role == Role::User)
            .count();
        let total = self.messages.len();
        ConversationStats {
            total,
            user,
            assistant: total - user,
        }
    }

    /// Saved snapshots as pretty-printed JSON.
    pub fn transcript_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.saved)
    }
}
