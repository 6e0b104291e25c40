//! Caller-owned conversation history.

use std::collections::VecDeque;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
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

/// Append-only conversation history holding at most `max_turns` turns.
///
/// The oldest turns are dropped first. Nothing here is global: every chat
/// session or HTTP request owns its own context.
#[derive(Debug, Clone, Default)]
pub struct ConversationContext {
    turns: VecDeque<Turn>,
    max_turns: usize,
}

impl ConversationContext {
    /// Create an empty context.
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(max_turns),
            max_turns,
        }
    }

    /// Rebuild a context from turns sent by a client, keeping the newest.
    pub fn from_turns(turns: impl IntoIterator<Item = Turn>, max_turns: usize) -> Self {
        let mut context = Self::new(max_turns);
        for turn in turns {
            context.push(turn);
        }
        context
    }

    /// Append a turn, dropping the oldest if over capacity.
    pub fn push(&mut self, turn: Turn) {
        if self.max_turns == 0 {
            return;
        }
        self.turns.push_back(turn);
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    /// Record one request/response exchange.
    pub fn record_exchange(&mut self, message: &str, response: &str) {
        self.push(Turn::user(message));
        self.push(Turn::assistant(response));
    }

    /// Turns, oldest first.
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Render as `Role: content` lines for a prompt. Empty when there is no
    /// history.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for turn in &self.turns {
            let _ = writeln!(out, "{}: {}", turn.role.label(), turn.content);
        }
        out
    }

    pub fn clear(&mut self) {
        self.turns.clear();
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
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_keeps_last_turns() {
        let mut context = ConversationContext::new(3);
        context.push(Turn::user("Hello"));
        context.push(Turn::assistant("Hi"));
        context.push(Turn::user("How are you?"));
        context.push(Turn::assistant("Good!"));

        assert_eq!(context.len(), 3);
        assert_eq!(context.turns().next().unwrap().content, "Hi");
    }

    #[test]
    fn test_render() {
        let mut context = ConversationContext::new(10);
        assert_eq!(context.render(), "");

        context.record_exchange("¿Cuánto es 5 + 3?", "5 add 3 = 8");
        assert_eq!(context.render(), "User: ¿Cuánto es 5 + 3?\nAssistant: 5 add 3 = 8\n");
    }

    #[test]
    fn test_from_turns_truncates_client_history() {
        let turns = (0..6).map(|i| Turn::user(format!("m{}", i)));
        let context = ConversationContext::from_turns(turns, 4);
        let contents: Vec<&str> = context.turns().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["m2", "m3", "m4", "m5"]);
    }

    #[test]
    fn test_turn_wire_format() {
        let turn: Turn = serde_json::from_str(r#"{"role": "assistant", "content": "ok"}"#).unwrap();
        assert_eq!(turn, Turn::assistant("ok"));
    }
}
