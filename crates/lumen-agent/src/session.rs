// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded history of the current conversation.

use std::collections::VecDeque;

use lumen_core::{ChatTurn, Role};

/// Fixed-capacity ring buffer of chat turns; the oldest turn is evicted first.
#[derive(Debug, Clone)]
pub struct SessionState {
    turns: VecDeque<ChatTurn>,
    capacity: usize,
}

impl SessionState {
    /// Creates an empty session holding at most `capacity` turns (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a turn, evicting the oldest one when full.
    pub fn append(&mut self, turn: ChatTurn) {
        if self.turns.len() == self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    /// Appends a new turn stamped with the current time.
    pub fn append_message(&mut self, role: Role, content: impl Into<String>) {
        self.append(ChatTurn::new(role, content));
    }

    /// All held turns, oldest first.
    pub fn recent(&self) -> Vec<ChatTurn> {
        self.turns.iter().cloned().collect()
    }

    pub fn reset(&mut self) {
        self.turns.clear();
    }

    pub fn last_user_message(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .map(|t| t.content.as_str())
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_first() {
        let mut session = SessionState::new(3);
        for i in 0..5 {
            session.append_message(Role::User, format!("m{i}"));
        }
        let contents: Vec<String> = session.recent().into_iter().map(|t| t.content).collect();
        assert_eq!(contents, vec!["m2", "m3", "m4"]);
        assert_eq!(session.len(), 3);
    }

    #[test]
    fn last_user_message_skips_assistant() {
        let mut session = SessionState::new(10);
        assert!(session.last_user_message().is_none());
        session.append_message(Role::User, "question");
        session.append_message(Role::Assistant, "answer");
        assert_eq!(session.last_user_message(), Some("question"));
    }

    #[test]
    fn reset_clears_history() {
        let mut session = SessionState::new(4);
        session.append_message(Role::User, "hi");
        session.reset();
        assert!(session.is_empty());
        assert_eq!(session.capacity(), 4);
    }

    #[test]
    fn zero_capacity_still_holds_one_turn() {
        let mut session = SessionState::new(0);
        session.append_message(Role::User, "a");
        session.append_message(Role::User, "b");
        assert_eq!(session.recent()[0].content, "b");
    }
}
