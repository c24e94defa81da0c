//! ConversationSession - the turn-driving state machine.
//!
//! The session owns its transcript, pending suggestions and turn state. It does
//! not perform I/O itself: `submit` hands out a [`TurnTicket`] describing the
//! turn to run, and whoever runs it feeds [`TurnEvent`]s back through
//! [`ConversationSession::apply`]. Events carry the turn id they belong to, so
//! late events from a cancelled turn are dropped.

use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::catalog::Persona;
use crate::domain::foundation::{DomainError, ErrorCode, SessionId, StateMachine, TurnId};
use crate::domain::relevance::UserProfile;

use super::directive::DirectiveExtractor;
use super::message::{Message, Transcript};
use super::state::ConversationState;

pub const DEFAULT_FAILURE_NOTICE: &str =
    "Sorry, I could not answer just now. Please try again in a moment.";
pub const DEFAULT_CANCELLED_NOTICE: &str = "(This answer was cancelled.)";

/// Why a submission was refused. Refusals never change session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("message is empty")]
    EmptyInput,

    #[error("a turn is already in flight")]
    TurnInFlight,
}

impl From<SubmitRejected> for DomainError {
    fn from(err: SubmitRejected) -> Self {
        match err {
            SubmitRejected::EmptyInput => DomainError::new(ErrorCode::EmptyField, err.to_string())
                .with_detail("field", "text"),
            SubmitRejected::TurnInFlight => DomainError::new(ErrorCode::TurnInFlight, err.to_string()),
        }
    }
}

/// User-visible texts used to finalize a turn that did not settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub failure_notice: String,
    pub cancelled_notice: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            failure_notice: DEFAULT_FAILURE_NOTICE.to_string(),
            cancelled_notice: DEFAULT_CANCELLED_NOTICE.to_string(),
        }
    }
}

/// Construction inputs for a session.
#[derive(Debug, Clone)]
pub struct SessionSeed {
    pub persona: Option<Persona>,
    pub profile: Option<UserProfile>,
    pub greeting: String,
    /// Sent automatically once, right after construction.
    pub opening_question: Option<String>,
    pub language: String,
}

impl SessionSeed {
    pub fn new(greeting: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            persona: None,
            profile: None,
            greeting: greeting.into(),
            opening_question: None,
            language: language.into(),
        }
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = Some(persona);
        self
    }

    pub fn with_profile(mut self, profile: Option<UserProfile>) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_opening_question(mut self, question: impl Into<String>) -> Self {
        self.opening_question = Some(question.into());
        self
    }
}

/// Everything needed to run one turn against a generation service.
#[derive(Debug, Clone)]
pub struct TurnTicket {
    pub session_id: SessionId,
    pub turn_id: TurnId,
    pub persona: Option<Persona>,
    pub profile: Option<UserProfile>,
    pub language: String,
    /// Transcript up to and including the new user message.
    pub history: Vec<Message>,
    /// Cancelled when the turn is abandoned.
    pub cancellation: CancellationToken,
}

/// Progress reported by whoever runs a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    /// The service accepted the turn and fragments may follow.
    Streaming { turn: TurnId },
    /// Cumulative text after another fragment.
    Fragment { turn: TurnId, accumulated: String },
    /// The sequence ended normally with this final text.
    Settled { turn: TurnId, text: String },
    /// The service call or the sequence failed.
    Failed { turn: TurnId, reason: String },
}

impl TurnEvent {
    pub fn turn(&self) -> TurnId {
        match self {
            TurnEvent::Streaming { turn }
            | TurnEvent::Fragment { turn, .. }
            | TurnEvent::Settled { turn, .. }
            | TurnEvent::Failed { turn, .. } => *turn,
        }
    }
}

#[derive(Debug)]
struct ActiveTurn {
    id: TurnId,
    cancellation: CancellationToken,
}

/// Read-only view of a session for callers.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub state: ConversationState,
    pub messages: Vec<Message>,
    pub suggestions: Vec<String>,
    pub in_flight: bool,
}

/// A single conversation with one persona (or the generic guide).
#[derive(Debug)]
pub struct ConversationSession {
    id: SessionId,
    persona: Option<Persona>,
    profile: Option<UserProfile>,
    language: String,
    transcript: Transcript,
    state: ConversationState,
    suggestions: Vec<String>,
    active_turn: Option<ActiveTurn>,
    turns_started: usize,
    opening_question: Option<String>,
    auto_start_consumed: bool,
    config: SessionConfig,
    extractor: DirectiveExtractor,
}

impl ConversationSession {
    pub fn new(seed: SessionSeed, config: SessionConfig) -> Self {
        let opening_question = seed
            .opening_question
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());

        Self {
            id: SessionId::new(),
            persona: seed.persona,
            profile: seed.profile,
            language: seed.language,
            transcript: Transcript::with_greeting(seed.greeting),
            state: ConversationState::Idle,
            suggestions: Vec::new(),
            active_turn: None,
            turns_started: 0,
            opening_question,
            auto_start_consumed: false,
            config,
            extractor: DirectiveExtractor::new(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn persona(&self) -> Option<&Persona> {
        self.persona.as_ref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn messages(&self) -> &[Message] {
        self.transcript.messages()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn is_in_flight(&self) -> bool {
        self.active_turn.is_some()
    }

    pub fn active_turn(&self) -> Option<TurnId> {
        self.active_turn.as_ref().map(|turn| turn.id)
    }

    pub fn auto_start_consumed(&self) -> bool {
        self.auto_start_consumed
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            state: self.state,
            messages: self.transcript.messages().to_vec(),
            suggestions: self.suggestions.clone(),
            in_flight: self.is_in_flight(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Commands
    // ═══════════════════════════════════════════════════════════════════════

    /// Starts a new turn with the user's text.
    ///
    /// Appends the user message and an empty model placeholder, clears the
    /// pending suggestions and marks the turn in flight.
    ///
    /// # Errors
    ///
    /// - `EmptyInput` if `text` is blank
    /// - `TurnInFlight` if another turn has not finished
    pub fn submit(&mut self, text: &str) -> Result<TurnTicket, SubmitRejected> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SubmitRejected::EmptyInput);
        }
        if !self.state.accepts_submit() {
            return Err(SubmitRejected::TurnInFlight);
        }

        self.acknowledge();
        self.move_to(ConversationState::Sending);

        let transcript = std::mem::take(&mut self.transcript).append(Message::user(text));
        let history = transcript.messages().to_vec();
        self.transcript = transcript.append(Message::placeholder());
        self.suggestions.clear();

        let turn_id = TurnId::new();
        let cancellation = CancellationToken::new();
        self.active_turn = Some(ActiveTurn {
            id: turn_id,
            cancellation: cancellation.clone(),
        });
        self.turns_started += 1;

        tracing::info!(
            session_id = %self.id,
            turn_id = %turn_id,
            history_len = history.len(),
            "Turn submitted"
        );

        Ok(TurnTicket {
            session_id: self.id,
            turn_id,
            persona: self.persona.clone(),
            profile: self.profile.clone(),
            language: self.language.clone(),
            history,
            cancellation,
        })
    }

    /// Sends a suggestion as the next user message.
    pub fn select_suggestion(&mut self, suggestion: &str) -> Result<TurnTicket, SubmitRejected> {
        self.submit(suggestion)
    }

    /// Fires the opening question, at most once per session lifetime.
    ///
    /// Only fires while the transcript holds nothing but the greeting and no
    /// turn has ever started. Repeated calls return `None`.
    pub fn take_auto_start(&mut self) -> Option<TurnTicket> {
        if self.auto_start_consumed || self.turns_started > 0 || self.transcript.len() != 1 {
            return None;
        }
        let question = self.opening_question.clone()?;
        self.auto_start_consumed = true;
        self.submit(&question).ok()
    }

    /// Abandons the in-flight turn.
    ///
    /// The model message is finalized with the cancelled notice and partial
    /// text is dropped. Returns false when nothing was in flight.
    pub fn cancel_turn(&mut self) -> bool {
        let Some(turn) = self.active_turn.take() else {
            return false;
        };
        turn.cancellation.cancel();
        self.transcript =
            std::mem::take(&mut self.transcript).finalize_last(&self.config.cancelled_notice);
        self.move_to(ConversationState::Idle);

        tracing::info!(session_id = %self.id, turn_id = %turn.id, "Turn cancelled");
        true
    }

    /// Moves a finished turn's outcome state back to `Idle`.
    pub fn acknowledge(&mut self) {
        if self.state.is_turn_outcome() {
            self.move_to(ConversationState::Idle);
        }
    }

    /// Applies turn progress. Returns false if the event was ignored.
    ///
    /// Events for any turn other than the active one are ignored, as are events
    /// that do not fit the current state.
    pub fn apply(&mut self, event: TurnEvent) -> bool {
        if self.active_turn() != Some(event.turn()) {
            tracing::debug!(session_id = %self.id, turn_id = %event.turn(), "Stale turn event dropped");
            return false;
        }

        match event {
            TurnEvent::Streaming { .. } => self.try_move_to(ConversationState::Streaming),
            TurnEvent::Fragment { accumulated, .. } => {
                if self.state == ConversationState::Sending {
                    self.try_move_to(ConversationState::Streaming);
                }
                if self.state != ConversationState::Streaming {
                    return false;
                }
                self.transcript = std::mem::take(&mut self.transcript).apply_fragment(&accumulated);
                true
            }
            TurnEvent::Settled { turn, text } => {
                if self.state == ConversationState::Sending {
                    self.try_move_to(ConversationState::Streaming);
                }
                if !self.try_move_to(ConversationState::Settled) {
                    return false;
                }
                let extraction = self.extractor.extract(&text);
                let content = if extraction.has_suggestions() {
                    extraction.text
                } else {
                    text
                };
                self.transcript = std::mem::take(&mut self.transcript).finalize_last(content);
                self.suggestions = extraction.suggestions;
                self.active_turn = None;

                tracing::info!(
                    session_id = %self.id,
                    turn_id = %turn,
                    suggestion_count = self.suggestions.len(),
                    "Turn settled"
                );
                true
            }
            TurnEvent::Failed { turn, reason } => {
                if !self.try_move_to(ConversationState::Failed) {
                    return false;
                }
                self.transcript = std::mem::take(&mut self.transcript)
                    .finalize_last(&self.config.failure_notice);
                self.suggestions.clear();
                self.active_turn = None;

                tracing::warn!(session_id = %self.id, turn_id = %turn, reason = %reason, "Turn failed");
                true
            }
        }
    }

    fn try_move_to(&mut self, target: ConversationState) -> bool {
        match self.state.transition_to(target) {
            Ok(next) => {
                self.state = next;
                true
            }
            Err(err) => {
                tracing::debug!(session_id = %self.id, error = %err, "Turn event ignored");
                false
            }
        }
    }

    fn move_to(&mut self, target: ConversationState) {
        let moved = self.try_move_to(target);
        debug_assert!(moved, "unexpected transition to {:?}", target);
    }
}

impl Drop for ConversationSession {
    fn drop(&mut self) {
        if let Some(turn) = self.active_turn.take() {
            turn.cancellation.cancel();
        }
    }
}
