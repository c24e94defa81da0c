//! In-memory registry of live sessions.
//!
//! Each session sits behind its own mutex and owns a broadcast channel that
//! fans applied turn progress out to event-stream subscribers. The mutex is
//! only ever held for a single reducer call, never across an await.
//!
//! Sessions that nobody touches for the configured idle timeout are swept
//! out by a background task, the same way an explicit close removes them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::application::{TurnDriver, TurnOutcome};
use crate::domain::conversation::{ConversationSession, SessionSnapshot, TurnEvent, TurnTicket};
use crate::domain::foundation::{DomainError, ErrorCode, SessionId};

use super::dto::SessionEvent;

const EVENT_CAPACITY: usize = 64;

/// One live session and its event channel.
#[derive(Debug)]
pub struct SessionEntry {
    id: SessionId,
    session: Mutex<ConversationSession>,
    events: broadcast::Sender<SessionEvent>,
    last_active: Mutex<Instant>,
}

impl SessionEntry {
    fn new(session: ConversationSession) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            id: session.id(),
            session: Mutex::new(session),
            events,
            last_active: Mutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Locks the session and marks it active.
    pub fn lock(&self) -> MutexGuard<'_, ConversationSession> {
        *self.last_active.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Idle when untouched for `max_idle` with no turn in flight.
    fn is_idle(&self, now: Instant, max_idle: Duration) -> bool {
        let last_active = *self.last_active.lock().unwrap_or_else(PoisonError::into_inner);
        now.saturating_duration_since(last_active) >= max_idle
            && !self
                .session
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_in_flight()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Sends an event to current subscribers. Having none is fine.
    pub fn publish(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    /// Applies turn progress and publishes what the session accepted.
    pub fn apply(&self, event: TurnEvent) -> bool {
        let published = {
            let mut session = self.lock();
            if !session.apply(event.clone()) {
                return false;
            }
            SessionEvent::applied(event, &session)
        };
        self.publish(published);
        true
    }

    /// Cancels the in-flight turn, if any.
    pub fn cancel_turn(&self) -> bool {
        let cancelled = {
            let mut session = self.lock();
            let turn = session.active_turn();
            session.cancel_turn().then_some(turn).flatten()
        };
        match cancelled {
            Some(turn_id) => {
                self.publish(SessionEvent::Cancelled { turn_id });
                true
            }
            None => false,
        }
    }
}

/// Runs `ticket` on a background task, feeding progress back into `entry`.
pub fn spawn_turn(driver: TurnDriver, entry: Arc<SessionEntry>, ticket: TurnTicket) {
    entry.publish(SessionEvent::TurnStarted {
        turn_id: ticket.turn_id,
    });
    tokio::spawn(async move {
        let turn_id = ticket.turn_id;
        let outcome = driver
            .drive(ticket, |event| {
                entry.apply(event);
            })
            .await;
        if let TurnOutcome::Failed(err) = &outcome {
            tracing::warn!(session_id = %entry.id(), turn_id = %turn_id, error = %err, "Turn task failed");
        }
    });
}

/// Shared map of live sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, Arc<SessionEntry>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: ConversationSession) -> Arc<SessionEntry> {
        let entry = Arc::new(SessionEntry::new(session));
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entry.id(), entry.clone());
        entry
    }

    /// # Errors
    ///
    /// `SessionNotFound` if no live session has this id.
    pub fn get(&self, id: &SessionId) -> Result<Arc<SessionEntry>, DomainError> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// Removes the session, cancelling its in-flight turn and ending its
    /// event streams once the turn task lets go.
    pub fn close(&self, id: &SessionId) -> Result<(), DomainError> {
        let entry = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .ok_or_else(|| not_found(id))?;
        entry.cancel_turn();
        entry.publish(SessionEvent::Closed);
        tracing::info!(session_id = %id, "Session closed");
        Ok(())
    }

    /// Closes every idle session and returns how many were removed.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let evicted: Vec<Arc<SessionEntry>> = {
            let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
            let idle: Vec<SessionId> = sessions
                .values()
                .filter(|entry| entry.is_idle(now, max_idle))
                .map(|entry| entry.id())
                .collect();
            idle.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for entry in &evicted {
            entry.publish(SessionEvent::Closed);
            tracing::info!(session_id = %entry.id(), "Idle session evicted");
        }
        evicted.len()
    }

    /// Sweeps idle sessions until the runtime shuts down.
    pub fn spawn_idle_sweeper(&self, max_idle: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        let period = (max_idle / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = registry.evict_idle(max_idle);
                if evicted > 0 {
                    tracing::debug!(evicted, remaining = registry.len(), "Idle sweep");
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn not_found(id: &SessionId) -> DomainError {
    DomainError::new(ErrorCode::SessionNotFound, "Session not found")
        .with_detail("session_id", id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::{SessionConfig, SessionSeed, DEFAULT_CANCELLED_NOTICE};

    fn session() -> ConversationSession {
        ConversationSession::new(SessionSeed::new("Hello.", "English"), SessionConfig::default())
    }

    #[test]
    fn get_unknown_session_is_not_found() {
        let registry = SessionRegistry::new();
        let err = registry.get(&SessionId::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionNotFound);
    }

    #[test]
    fn applied_events_are_published() {
        let registry = SessionRegistry::new();
        let entry = registry.insert(session());
        let mut events = entry.subscribe();

        let ticket = entry.lock().submit("Hi").unwrap();
        let turn = ticket.turn_id;
        assert!(entry.apply(TurnEvent::Fragment { turn, accumulated: "Hel".into() }));
        assert!(entry.apply(TurnEvent::Settled { turn, text: "Hello".into() }));

        assert_eq!(
            events.try_recv().unwrap(),
            SessionEvent::Fragment { turn_id: turn, text: "Hel".into() }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            SessionEvent::Settled {
                turn_id: turn,
                text: "Hello".into(),
                suggestions: vec![]
            }
        );
    }

    #[test]
    fn ignored_events_are_not_published() {
        let registry = SessionRegistry::new();
        let entry = registry.insert(session());
        let mut events = entry.subscribe();

        let ticket = entry.lock().submit("Hi").unwrap();
        assert!(entry.cancel_turn());
        assert!(!entry.apply(TurnEvent::Fragment {
            turn: ticket.turn_id,
            accumulated: "late".into()
        }));

        assert_eq!(
            events.try_recv().unwrap(),
            SessionEvent::Cancelled { turn_id: ticket.turn_id }
        );
        assert!(events.try_recv().is_err());
        assert_eq!(entry.snapshot().messages.last().unwrap().content(), DEFAULT_CANCELLED_NOTICE);
    }

    #[test]
    fn close_cancels_and_removes() {
        let registry = SessionRegistry::new();
        let entry = registry.insert(session());
        let ticket = entry.lock().submit("Hi").unwrap();

        registry.close(&entry.id()).unwrap();

        assert!(ticket.cancellation.is_cancelled());
        assert!(registry.is_empty());
        assert!(registry.close(&entry.id()).is_err());
    }

    mod idle {
        use super::*;

        const IDLE: Duration = Duration::from_secs(30 * 60);

        #[tokio::test(start_paused = true)]
        async fn untouched_session_is_evicted() {
            let registry = SessionRegistry::new();
            let entry = registry.insert(session());
            let mut events = entry.subscribe();

            tokio::time::advance(IDLE + Duration::from_secs(1)).await;

            assert_eq!(registry.evict_idle(IDLE), 1);
            assert!(registry.get(&entry.id()).is_err());
            assert_eq!(events.try_recv().unwrap(), SessionEvent::Closed);
        }

        #[tokio::test(start_paused = true)]
        async fn recent_use_keeps_session() {
            let registry = SessionRegistry::new();
            let entry = registry.insert(session());

            tokio::time::advance(Duration::from_secs(20 * 60)).await;
            let _ = entry.snapshot();
            tokio::time::advance(Duration::from_secs(20 * 60)).await;

            assert_eq!(registry.evict_idle(IDLE), 0);
            assert_eq!(registry.len(), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn in_flight_session_is_kept() {
            let registry = SessionRegistry::new();
            let entry = registry.insert(session());
            let ticket = entry.lock().submit("Hi").unwrap();

            tokio::time::advance(IDLE * 2).await;

            assert_eq!(registry.evict_idle(IDLE), 0);
            assert!(!ticket.cancellation.is_cancelled());
        }

        #[tokio::test(start_paused = true)]
        async fn sweeper_closes_idle_sessions() {
            let registry = SessionRegistry::new();
            registry.insert(session());
            let sweeper = registry.spawn_idle_sweeper(IDLE);

            tokio::time::sleep(IDLE + IDLE / 2).await;

            assert!(registry.is_empty());
            sweeper.abort();
        }
    }
}
