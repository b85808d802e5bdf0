//! Outbound message queue.
//!
//! Messages leave in [`MessagePriority`] order. Within one priority they
//! leave in the order they were queued.

use std::collections::BTreeMap;

use col_core::protocol::{Message, MessagePriority};

/// Stable priority queue of outbound messages.
#[derive(Debug, Clone, Default)]
pub struct OutboundQueue {
    entries: BTreeMap<(MessagePriority, u64), Message>,
    next_seq: u64,
}

impl OutboundQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message at its own priority.
    pub fn push(&mut self, message: Message) {
        let key = (message.priority(), self.next_seq);
        self.next_seq += 1;
        tracing::trace!(tag = message.tag(), priority = ?key.0, seq = key.1, "Message queued");
        self.entries.insert(key, message);
    }

    /// Take the next message to deliver.
    pub fn pop(&mut self) -> Option<Message> {
        self.entries.pop_first().map(|(_, message)| message)
    }

    /// Number of queued messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every queued message in delivery order.
    pub fn drain(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.entries).into_values().collect()
    }
}
