//! Conversation module - the streaming dialogue engine.
//!
//! # Module Organization
//!
//! - `message` - Message entity and the transcript reducer
//! - `state` - Turn lifecycle state machine
//! - `directive` - Suggestion directive scanner
//! - `session` - ConversationSession, turn tickets and turn events
//! - `prompt` - System instruction builder for generation adapters

mod directive;
mod message;
mod prompt;
mod session;
mod state;

pub use directive::{
    extract_suggestions, DirectiveExtractor, Extraction, SUGGESTION_CLOSE, SUGGESTION_OPEN,
};
pub use message::{Message, MessageRole, Transcript};
pub use prompt::{PromptBuilder, MAX_SUGGESTIONS};
pub use session::{
    ConversationSession, SessionConfig, SessionSeed, SessionSnapshot, SubmitRejected, TurnEvent,
    TurnTicket, DEFAULT_CANCELLED_NOTICE, DEFAULT_FAILURE_NOTICE,
};
pub use state::ConversationState;
