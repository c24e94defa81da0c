//! HTTP DTOs for session endpoints.

use serde::{Deserialize, Serialize};

use crate::application::StartSessionCommand;
use crate::domain::conversation::{
    ConversationSession, ConversationState, Message, SessionSnapshot, TurnEvent,
};
use crate::domain::foundation::{CategoryId, PersonaId, SessionId, TurnId, ValidationError};

use crate::adapters::http::catalog::dto::profile_from;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to open a session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub persona_id: Option<String>,
    #[serde(default)]
    pub school_id: Option<String>,
    /// Index of an interactive concept in `school_id`.
    #[serde(default)]
    pub concept_index: Option<usize>,
    /// Four-letter personality code.
    #[serde(default)]
    pub code: Option<String>,
    /// The user's dominant category.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl CreateSessionRequest {
    pub fn into_command(self) -> Result<StartSessionCommand, ValidationError> {
        Ok(StartSessionCommand {
            persona_id: self.persona_id.map(PersonaId::new).transpose()?,
            school_id: self.school_id.map(CategoryId::new).transpose()?,
            concept_index: self.concept_index,
            profile: profile_from(self.code, self.category)?,
            language: self.language,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectSuggestionRequest {
    pub suggestion: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Full session view.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: SessionId,
    pub persona_id: Option<PersonaId>,
    pub language: String,
    pub state: ConversationState,
    pub in_flight: bool,
    pub messages: Vec<Message>,
    pub suggestions: Vec<String>,
}

impl From<&ConversationSession> for SessionResponse {
    fn from(session: &ConversationSession) -> Self {
        let SessionSnapshot {
            id,
            state,
            messages,
            suggestions,
            in_flight,
        } = session.snapshot();
        Self {
            id,
            persona_id: session.persona().map(|p| p.id.clone()),
            language: session.language().to_string(),
            state,
            in_flight,
            messages,
            suggestions,
        }
    }
}

/// Returned when a turn was accepted; progress follows on the event stream.
#[derive(Debug, Clone, Serialize)]
pub struct TurnAcceptedResponse {
    pub turn_id: TurnId,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelTurnResponse {
    pub cancelled: bool,
}

// ════════════════════════════════════════════════════════════════════════════════
// Event stream
// ════════════════════════════════════════════════════════════════════════════════

/// Progress pushed to event-stream subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    TurnStarted { turn_id: TurnId },
    Streaming { turn_id: TurnId },
    /// Cumulative reply text so far.
    Fragment { turn_id: TurnId, text: String },
    /// Final reply with suggestions already extracted.
    Settled {
        turn_id: TurnId,
        text: String,
        suggestions: Vec<String>,
    },
    Failed { turn_id: TurnId, notice: String },
    Cancelled { turn_id: TurnId },
    Closed,
}

impl SessionEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::TurnStarted { .. } => "turn_started",
            SessionEvent::Streaming { .. } => "streaming",
            SessionEvent::Fragment { .. } => "fragment",
            SessionEvent::Settled { .. } => "settled",
            SessionEvent::Failed { .. } => "failed",
            SessionEvent::Cancelled { .. } => "cancelled",
            SessionEvent::Closed => "closed",
        }
    }

    /// Describes an event the session just accepted, reading finalized text
    /// back from the session.
    pub fn applied(event: TurnEvent, session: &ConversationSession) -> Self {
        let last_text = || {
            session
                .messages()
                .last()
                .map(|m| m.content().to_string())
                .unwrap_or_default()
        };
        match event {
            TurnEvent::Streaming { turn } => SessionEvent::Streaming { turn_id: turn },
            TurnEvent::Fragment { turn, accumulated } => SessionEvent::Fragment {
                turn_id: turn,
                text: accumulated,
            },
            TurnEvent::Settled { turn, .. } => SessionEvent::Settled {
                turn_id: turn,
                text: last_text(),
                suggestions: session.suggestions().to_vec(),
            },
            TurnEvent::Failed { turn, .. } => SessionEvent::Failed {
                turn_id: turn,
                notice: last_text(),
            },
        }
    }
}
