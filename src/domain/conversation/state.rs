//! Conversation turn state machine.
//!
//! Tracks where the current turn is in its lifecycle. `Settled` and `Failed`
//! are terminal for a turn and fall back to `Idle` before the next one.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Lifecycle state of the current turn.
///
/// - `Idle`: no turn running, input accepted
/// - `Sending`: user message appended, waiting for the service to respond
/// - `Streaming`: fragments are arriving
/// - `Settled`: the fragment sequence ended normally
/// - `Failed`: the service call or the sequence raised an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Idle,
    Sending,
    Streaming,
    Settled,
    Failed,
}

impl ConversationState {
    /// Returns true while a turn is in flight.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Sending | Self::Streaming)
    }

    /// Returns true if a new turn may start from this state.
    pub fn accepts_submit(&self) -> bool {
        !self.is_in_flight()
    }

    /// Returns true if this state ends a turn.
    pub fn is_turn_outcome(&self) -> bool {
        matches!(self, Self::Settled | Self::Failed)
    }
}

impl StateMachine for ConversationState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConversationState::*;
        matches!(
            (self, target),
            (Idle, Sending) |
            (Sending, Streaming) |
            (Streaming, Settled) |
            (Sending, Failed) |
            (Streaming, Failed) |
            // Outcome consumed
            (Settled, Idle) |
            (Failed, Idle) |
            // Cancelled turn
            (Sending, Idle) |
            (Streaming, Idle)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConversationState::*;
        match self {
            Idle => vec![Sending],
            Sending => vec![Streaming, Failed, Idle],
            Streaming => vec![Settled, Failed, Idle],
            Settled => vec![Idle],
            Failed => vec![Idle],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod state_definition {
        use super::*;

        #[test]
        fn default_state_is_idle() {
            assert_eq!(ConversationState::default(), ConversationState::Idle);
        }

        #[test]
        fn serializes_to_snake_case() {
            let json = serde_json::to_string(&ConversationState::Streaming).unwrap();
            assert_eq!(json, "\"streaming\"");
        }
    }

    mod in_flight {
        use super::*;

        #[test]
        fn sending_and_streaming_are_in_flight() {
            assert!(ConversationState::Sending.is_in_flight());
            assert!(ConversationState::Streaming.is_in_flight());
        }

        #[test]
        fn outcomes_accept_submit() {
            assert!(ConversationState::Idle.accepts_submit());
            assert!(ConversationState::Settled.accepts_submit());
            assert!(ConversationState::Failed.accepts_submit());
        }
    }

    mod transitions {
        use super::*;

        #[test]
        fn happy_path() {
            let state = ConversationState::Idle
                .transition_to(ConversationState::Sending)
                .and_then(|s| s.transition_to(ConversationState::Streaming))
                .and_then(|s| s.transition_to(ConversationState::Settled))
                .and_then(|s| s.transition_to(ConversationState::Idle));
            assert_eq!(state, Ok(ConversationState::Idle));
        }

        #[test]
        fn failure_from_sending() {
            assert!(ConversationState::Sending.can_transition_to(&ConversationState::Failed));
        }

        #[test]
        fn cannot_settle_without_streaming() {
            assert!(ConversationState::Sending
                .transition_to(ConversationState::Settled)
                .is_err());
        }

        #[test]
        fn cannot_send_from_streaming() {
            assert!(!ConversationState::Streaming.can_transition_to(&ConversationState::Sending));
        }

        #[test]
        fn no_state_is_terminal() {
            for state in [
                ConversationState::Idle,
                ConversationState::Sending,
                ConversationState::Streaming,
                ConversationState::Settled,
                ConversationState::Failed,
            ] {
                assert!(!state.is_terminal(), "{:?}", state);
            }
        }

        #[test]
        fn valid_transitions_agree_with_can_transition_to() {
            let all = [
                ConversationState::Idle,
                ConversationState::Sending,
                ConversationState::Streaming,
                ConversationState::Settled,
                ConversationState::Failed,
            ];
            for from in all {
                for to in all {
                    assert_eq!(
                        from.can_transition_to(&to),
                        from.valid_transitions().contains(&to),
                        "{:?} -> {:?}",
                        from,
                        to
                    );
                }
            }
        }
    }
}
