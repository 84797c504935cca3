use crate::responder::Responder;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
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

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// In-memory transcript of a chat session. Append-only; dropped with the
/// session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the user's turn, answer it, and record the answer.
    ///
    /// The responder sees the history as it was before this turn.
    pub fn ask(&mut self, responder: &Responder, input: &str) -> &Message {
        let reply = responder.respond(&self.messages, input);
        self.messages.push(Message::user(input));
        self.messages.push(reply);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn ask_appends_user_then_assistant() {
        let responder = Responder::default();
        let mut convo = Conversation::new();
        assert!(convo.is_empty());

        let reply = convo.ask(&responder, "show me a checklist").clone();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(convo.len(), 2);
        assert_eq!(convo.messages()[0], Message::user("show me a checklist"));
        assert_eq!(convo.messages()[1], reply);
    }

    #[test]
    fn earlier_turns_are_untouched() {
        let responder = Responder::default();
        let mut convo = Conversation::new();
        convo.ask(&responder, "hello");
        let first = convo.messages().to_vec();

        convo.ask(&responder, "what about risk?");
        assert_eq!(convo.len(), 4);
        assert_eq!(&convo.messages()[..2], first.as_slice());
    }
}
