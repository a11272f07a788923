//! Per-sender conversation windows
//!
//! Each sender gets an independent, bounded history of turns. Histories never
//! grow past the window size (oldest turns are dropped first), and at most
//! `max_conversations` senders are tracked; the least recently active sender
//! is forgotten when a new one arrives. Nothing is persisted.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A single (role, text) turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Bounded store of conversation windows keyed by sender
pub struct ConversationStore {
    conversations: Mutex<LruCache<String, VecDeque<Turn>>>,
    window: usize,
}

impl ConversationStore {
    /// Create a store keeping `window` turns for each of at most
    /// `max_conversations` senders
    #[must_use]
    pub fn new(window: usize, max_conversations: usize) -> Self {
        let capacity = NonZeroUsize::new(max_conversations).unwrap_or(NonZeroUsize::MIN);
        Self {
            conversations: Mutex::new(LruCache::new(capacity)),
            window: window.max(1),
        }
    }

    /// Append a turn to a sender's history and return the resulting window
    pub async fn push(&self, sender: &str, turn: Turn) -> Vec<Turn> {
        let mut conversations = self.conversations.lock().await;
        let history = conversations.get_or_insert_mut(sender.to_string(), VecDeque::new);
        history.push_back(turn);
        while history.len() > self.window {
            history.pop_front();
        }
        history.iter().cloned().collect()
    }

    /// Snapshot of a sender's current window (oldest first)
    pub async fn window(&self, sender: &str) -> Vec<Turn> {
        let mut conversations = self.conversations.lock().await;
        conversations
            .get(sender)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of senders currently tracked
    pub async fn len(&self) -> usize {
        self.conversations.lock().await.len()
    }

    /// Whether no sender is tracked
    pub async fn is_empty(&self) -> bool {
        self.conversations.lock().await.is_empty()
    }

    /// Forget a sender's history
    pub async fn clear(&self, sender: &str) {
        self.conversations.lock().await.pop(sender);
    }
}

/// Build a completion request: the fixed system turn followed by the window
#[must_use]
pub fn build_request(system_prompt: &str, window: &[Turn]) -> Vec<Turn> {
    let mut turns = Vec::with_capacity(window.len() + 1);
    turns.push(Turn::system(system_prompt));
    turns.extend_from_slice(window);
    turns
}
