//! Bounded conversation log
//!
//! Invariant: `messages.len() <= max_messages` holds after every insert;
//! the oldest message is evicted silently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use crate::context::memory::{MemoryItem, WorkingMemory};

pub const DEFAULT_MAX_MESSAGES: usize = 100;

/// Conversation message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    fn display_prefix(&self) -> &str {
        match self {
            MessageRole::System => "System",
            MessageRole::User => "User",
            MessageRole::Assistant => "Assistant",
        }
    }
}

/// A message in a conversation context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }
}

/// History rendering style for [`Context::conversation_history`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFormat {
    #[default]
    Simple,
    Detailed,
}

/// Conversational context and working memory for one agent.
///
/// Owned exclusively by its agent; reset at the start of every `run()`.
#[derive(Debug, Clone, Default)]
pub struct Context {
    messages: VecDeque<Message>,
    pub memory: WorkingMemory,
    max_messages: usize,
}

impl Context {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_MESSAGES)
    }

    pub fn with_capacity(max_messages: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            memory: WorkingMemory::new(),
            max_messages,
        }
    }

    pub fn add_message(&mut self, role: MessageRole, content: impl Into<String>) {
        self.push(Message::new(role, content));
    }

    pub fn add_system_message(&mut self, content: impl Into<String>) {
        self.add_message(MessageRole::System, content);
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.add_message(MessageRole::User, content);
    }

    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.add_message(MessageRole::Assistant, content);
    }

    /// Record an error as a tagged system message.
    pub fn add_error(&mut self, error_message: impl std::fmt::Display) {
        let mut message = Message::new(MessageRole::System, format!("Error: {error_message}"));
        message.metadata.insert("error".to_string(), serde_json::Value::Bool(true));
        self.push(message);
    }

    fn push(&mut self, message: Message) {
        self.messages.push_back(message);
        while self.messages.len() > self.max_messages {
            self.messages.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The `n` most recent messages, oldest first.
    pub fn recent_messages(&self, n: usize) -> Vec<&Message> {
        let skip = self.messages.len().saturating_sub(n);
        self.messages.iter().skip(skip).collect()
    }

    pub fn all_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn conversation_history(&self, format: HistoryFormat) -> String {
        let lines: Vec<String> = match format {
            HistoryFormat::Detailed => self
                .messages
                .iter()
                .map(|msg| {
                    let metadata: Vec<String> =
                        msg.metadata.iter().map(|(k, v)| format!("{k}={v}")).collect();
                    format!("[{}] ({}): {}", msg.role.as_str(), metadata.join(", "), msg.content)
                })
                .collect(),
            HistoryFormat::Simple => self
                .messages
                .iter()
                .map(|msg| format!("{}: {}", msg.role.display_prefix(), msg.content))
                .collect(),
        };
        lines.join("\n")
    }

    /// Clear all messages and working memory.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.memory.clear();
    }

    /// Store an item in working memory, returning its id.
    pub fn remember(&mut self, content: impl Into<String>, kind: impl Into<String>) -> String {
        self.memory.add(MemoryItem::new(kind, content))
    }

    /// Recall the most relevant memory items for a query.
    pub fn recall(&self, query: &str, limit: usize) -> Vec<&MemoryItem> {
        self.memory.search(query, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_order_is_arrival_order() {
        let mut context = Context::new();
        context.add_system_message("first");
        context.add_user_message("second");

        let history = context.conversation_history(HistoryFormat::Simple);
        assert_eq!(history, "System: first\nUser: second");
    }

    #[test]
    fn test_oldest_message_evicted_at_capacity() {
        let mut context = Context::with_capacity(3);
        for n in 0..5 {
            context.add_user_message(format!("msg {n}"));
        }

        assert_eq!(context.len(), 3);
        let recent: Vec<&str> = context
            .recent_messages(10)
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(recent, vec!["msg 2", "msg 3", "msg 4"]);
    }

    #[test]
    fn test_recent_messages_takes_tail() {
        let mut context = Context::new();
        for n in 0..10 {
            context.add_user_message(format!("msg {n}"));
        }

        let recent = context.recent_messages(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].content, "msg 7");
        assert_eq!(recent[2].content, "msg 9");
    }

    #[test]
    fn test_add_error_tags_message() {
        let mut context = Context::new();
        context.add_error("tool exploded");

        let message = context.recent_messages(1)[0];
        assert_eq!(message.role, MessageRole::System);
        assert_eq!(message.content, "Error: tool exploded");
        assert_eq!(message.metadata.get("error"), Some(&serde_json::Value::Bool(true)));
    }

    #[test]
    fn test_clear_empties_messages_and_memory() {
        let mut context = Context::new();
        context.add_user_message("hello");
        context.remember("a fact", "note");

        context.clear();
        assert!(context.is_empty());
        assert!(context.recall("fact", 5).is_empty());
    }
}
