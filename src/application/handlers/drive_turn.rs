//! TurnDriver - runs one conversation turn against the generation service.
//!
//! The driver owns no session state. It turns a [`TurnTicket`] into a stream
//! of [`TurnEvent`]s handed to a caller-supplied sink, which normally applies
//! them to the session that issued the ticket.

use std::sync::Arc;

use crate::application::stream_consumer::{StreamConsumer, StreamError, StreamProgress};
use crate::domain::conversation::{ConversationSession, SubmitRejected, TurnEvent, TurnTicket};
use crate::ports::{GenerationRequest, GenerationService};

/// How a driven turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Settled,
    Failed(StreamError),
    /// Abandoned; nothing was reported after cancellation.
    Cancelled,
}

#[derive(Clone)]
pub struct TurnDriver {
    service: Arc<dyn GenerationService>,
    consumer: StreamConsumer,
}

impl TurnDriver {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self {
            service,
            consumer: StreamConsumer::new(),
        }
    }

    pub fn with_consumer(mut self, consumer: StreamConsumer) -> Self {
        self.consumer = consumer;
        self
    }

    /// Runs the turn, reporting progress to `sink`.
    ///
    /// `sink` receives `Streaming`, then one `Fragment` per fragment, then
    /// exactly one of `Settled` / `Failed`. Cancelled turns end without a
    /// final event.
    pub async fn drive<S>(&self, ticket: TurnTicket, mut sink: S) -> TurnOutcome
    where
        S: FnMut(TurnEvent),
    {
        let turn = ticket.turn_id;
        let request = GenerationRequest::for_turn(&ticket);

        tracing::debug!(
            session_id = %ticket.session_id,
            turn_id = %turn,
            provider = self.service.name(),
            "Driving turn"
        );

        let result = self
            .consumer
            .consume(
                self.service.open_stream(request),
                &ticket.cancellation,
                |progress| match progress {
                    StreamProgress::Opened => sink(TurnEvent::Streaming { turn }),
                    StreamProgress::Accumulated(text) => sink(TurnEvent::Fragment {
                        turn,
                        accumulated: text.to_string(),
                    }),
                },
            )
            .await;

        match result {
            Ok(text) => {
                sink(TurnEvent::Settled { turn, text });
                TurnOutcome::Settled
            }
            Err(StreamError::Cancelled) => {
                tracing::debug!(session_id = %ticket.session_id, turn_id = %turn, "Turn consumption stopped");
                TurnOutcome::Cancelled
            }
            Err(err) => {
                sink(TurnEvent::Failed {
                    turn,
                    reason: err.to_string(),
                });
                TurnOutcome::Failed(err)
            }
        }
    }

    /// Submits `text` and drives the resulting turn to completion.
    pub async fn submit_and_drive(
        &self,
        session: &mut ConversationSession,
        text: &str,
    ) -> Result<TurnOutcome, SubmitRejected> {
        let ticket = session.submit(text)?;
        Ok(self.drive_into(session, ticket).await)
    }

    /// Fires the session's opening question, if it has one left.
    pub async fn run_auto_start(&self, session: &mut ConversationSession) -> Option<TurnOutcome> {
        let ticket = session.take_auto_start()?;
        Some(self.drive_into(session, ticket).await)
    }

    async fn drive_into(&self, session: &mut ConversationSession, ticket: TurnTicket) -> TurnOutcome {
        self.drive(ticket, |event| {
            session.apply(event);
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockGenerationService;
    use crate::domain::conversation::{
        ConversationState, SessionConfig, SessionSeed, DEFAULT_FAILURE_NOTICE,
    };
    use crate::ports::GenerationError;

    fn session() -> ConversationSession {
        ConversationSession::new(SessionSeed::new("Hello.", "English"), SessionConfig::default())
    }

    fn driver(service: MockGenerationService) -> TurnDriver {
        TurnDriver::new(Arc::new(service))
    }

    #[tokio::test]
    async fn settled_turn_extracts_suggestions() {
        let service = MockGenerationService::new().with_fragments([
            "Try this.",
            "[SUGGESTION]Tell me more[/SUGGESTION]",
            "Also consider journaling.",
            "[SUGGESTION]What about dreams?[/SUGGESTION]",
        ]);
        let mut s = session();

        let outcome = driver(service).submit_and_drive(&mut s, "Help").await.unwrap();

        assert_eq!(outcome, TurnOutcome::Settled);
        assert_eq!(s.messages().last().unwrap().content(), "Try this.Also consider journaling.");
        assert_eq!(s.suggestions(), ["Tell me more", "What about dreams?"]);
        assert_eq!(s.state(), ConversationState::Settled);
    }

    #[tokio::test]
    async fn events_arrive_in_order() {
        let service = MockGenerationService::new().with_fragments(["a", "b"]);
        let mut s = session();
        let ticket = s.submit("go").unwrap();
        let turn = ticket.turn_id;
        let mut events = Vec::new();

        driver(service).drive(ticket, |e| events.push(e)).await;

        assert_eq!(
            events,
            vec![
                TurnEvent::Streaming { turn },
                TurnEvent::Fragment { turn, accumulated: "a".into() },
                TurnEvent::Fragment { turn, accumulated: "ab".into() },
                TurnEvent::Settled { turn, text: "ab".into() },
            ]
        );
    }

    #[tokio::test]
    async fn fault_discards_partial_text() {
        let service = MockGenerationService::new()
            .with_fragments(["partial", "never"])
            .with_fault_after(1, GenerationError::Network("reset".into()));
        let mut s = session();

        let outcome = driver(service).submit_and_drive(&mut s, "Help").await.unwrap();

        assert!(matches!(outcome, TurnOutcome::Failed(StreamError::Fault(_))));
        assert_eq!(s.messages().last().unwrap().content(), DEFAULT_FAILURE_NOTICE);
        assert!(!s.is_in_flight());
    }

    #[tokio::test]
    async fn open_failure_surfaces_as_notice() {
        let service = MockGenerationService::new()
            .with_open_error(GenerationError::Unavailable("down".into()));
        let mut s = session();

        let outcome = driver(service).submit_and_drive(&mut s, "Help").await.unwrap();

        assert!(matches!(outcome, TurnOutcome::Failed(StreamError::Init(_))));
        assert_eq!(s.state(), ConversationState::Failed);
    }

    #[tokio::test]
    async fn rejected_submit_never_calls_service() {
        let service = MockGenerationService::new();
        let driver = TurnDriver::new(Arc::new(service.clone()));
        let mut s = session();

        assert_eq!(
            driver.submit_and_drive(&mut s, "  ").await.unwrap_err(),
            SubmitRejected::EmptyInput
        );
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn auto_start_runs_once() {
        let service = MockGenerationService::new().with_fragments(["First answer"]);
        let driver = TurnDriver::new(Arc::new(service.clone()));
        let mut s = ConversationSession::new(
            SessionSeed::new("Welcome.", "English").with_opening_question("What is anxiety?"),
            SessionConfig::default(),
        );

        assert_eq!(driver.run_auto_start(&mut s).await, Some(TurnOutcome::Settled));
        assert_eq!(driver.run_auto_start(&mut s).await, None);
        assert_eq!(service.call_count(), 1);
        assert_eq!(service.calls()[0].history.last().unwrap().content(), "What is anxiety?");
    }
}
