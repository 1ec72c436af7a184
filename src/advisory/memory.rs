//! Bounded conversation history replayed to the advisory service

use crate::advisory::backend::ChatMessage;
use std::collections::VecDeque;

/// FIFO of (prompt, reply) exchanges
///
/// Holds at most `2 * exchanges` messages; recording a new exchange past the
/// limit evicts the oldest whole exchange.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    entries: VecDeque<ChatMessage>,
    capacity: usize,
}

impl ConversationMemory {
    pub fn new(exchanges: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: exchanges.saturating_mul(2),
        }
    }

    pub fn record(&mut self, prompt: &str, reply: &str) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_back(ChatMessage::user(prompt));
        self.entries.push_back(ChatMessage::assistant(reply));
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Oldest first
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

}
