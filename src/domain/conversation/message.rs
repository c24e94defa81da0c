//! Message entity and the transcript reducer.
//!
//! A transcript is an ordered, append-only list of messages. Only the last
//! message may change after it is appended, and only through
//! [`Transcript::apply_fragment`] / [`Transcript::finalize_last`], which return
//! a new transcript instead of mutating in place.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Model,
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: MessageRole,
    content: String,
    created_at: Timestamp,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Timestamp::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Model, content)
    }

    /// Empty model message that streamed text will fill in.
    pub fn placeholder() -> Self {
        Self::model(String::new())
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    /// Same message with new content; role and timestamp are kept.
    fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            role: self.role,
            content: content.into(),
            created_at: self.created_at,
        }
    }
}

/// Ordered conversation history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript opened by a model greeting.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self::new().append(Message::model(greeting))
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

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn append(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Replaces the in-progress model message with the accumulated text.
    ///
    /// A transcript whose last message is not a model message is returned
    /// unchanged; user messages are never rewritten.
    pub fn apply_fragment(self, accumulated: &str) -> Self {
        self.replace_last_model(accumulated)
    }

    /// Sets the final content of the in-progress model message.
    pub fn finalize_last(self, content: impl Into<String>) -> Self {
        self.replace_last_model(content)
    }

    fn replace_last_model(mut self, content: impl Into<String>) -> Self {
        if let Some(last) = self.messages.last_mut() {
            if last.role == MessageRole::Model {
                *last = last.with_content(content);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod message {
        use super::*;

        #[test]
        fn placeholder_is_empty_model_message() {
            let msg = Message::placeholder();
            assert_eq!(msg.role(), MessageRole::Model);
            assert!(msg.content().is_empty());
        }

        #[test]
        fn role_serializes_snake_case() {
            let json = serde_json::to_string(&MessageRole::Model).unwrap();
            assert_eq!(json, "\"model\"");
        }
    }

    mod reducer {
        use super::*;

        fn in_progress() -> Transcript {
            Transcript::with_greeting("Hello")
                .append(Message::user("Hi"))
                .append(Message::placeholder())
        }

        #[test]
        fn apply_fragment_replaces_only_the_last_message() {
            let before = in_progress();
            let after = before.clone().apply_fragment("Par");
            assert_eq!(after.len(), 3);
            assert_eq!(after.messages()[..2], before.messages()[..2]);
            assert_eq!(after.last().unwrap().content(), "Par");
        }

        #[test]
        fn apply_fragment_keeps_timestamp() {
            let before = in_progress();
            let created = *before.last().unwrap().created_at();
            let after = before.apply_fragment("x").apply_fragment("xy");
            assert_eq!(after.last().unwrap().created_at(), &created);
        }

        #[test]
        fn user_message_is_never_rewritten() {
            let t = Transcript::new().append(Message::user("question"));
            let after = t.clone().apply_fragment("leak");
            assert_eq!(after, t);
        }

        #[test]
        fn empty_transcript_is_unchanged() {
            assert!(Transcript::new().finalize_last("x").is_empty());
        }

        #[test]
        fn replaying_fragments_matches_final_text() {
            let fragments = ["Hel", "Hello, ", "Hello, world"];
            let replayed = fragments
                .iter()
                .fold(in_progress(), |t, acc| t.apply_fragment(acc));
            assert_eq!(replayed.last().unwrap().content(), "Hello, world");
        }
    }
}
