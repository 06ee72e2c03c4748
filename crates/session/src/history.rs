//! Ordered conversation history.

use sourcechat_core::message::ChatTurn;

/// The turns of one session, oldest first.
///
/// Append-only, except that the most recent turn can be rolled back when
/// the submission that produced it fails.
#[derive(Debug, Default, Clone)]
pub struct ConversationHistory {
    turns: Vec<ChatTurn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    /// Remove and return the most recent turn.
    pub fn rollback_last(&mut self) -> Option<ChatTurn> {
        self.turns.pop()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
