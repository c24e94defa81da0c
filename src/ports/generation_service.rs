//! Generation Service Port - source of streamed model output.
//!
//! The dialogue engine never builds a provider's transport. It asks this port
//! for a fragment sequence and consumes whatever comes back.
//!
//! # Example
//!
//! ```ignore
//! let mut fragments = service.open_stream(GenerationRequest::for_turn(&ticket)).await?;
//! while let Some(fragment) = fragments.next().await {
//!     print!("{}", fragment?.text);
//! }
//! ```

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::domain::catalog::Persona;
use crate::domain::conversation::{Message, TurnTicket};
use crate::domain::relevance::UserProfile;

/// Boxed fragment sequence returned by [`GenerationService::open_stream`].
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Fragment, GenerationError>> + Send>>;

/// Port for language model services.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Opens a fragment sequence for one turn.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be reached or returns no usable
    /// sequence.
    async fn open_stream(&self, request: GenerationRequest) -> Result<FragmentStream, GenerationError>;

    /// Short provider name for logs.
    fn name(&self) -> &str;
}

/// Inputs for one generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Persona to speak as, or `None` for the generic guide.
    pub persona: Option<Persona>,
    pub profile: Option<UserProfile>,
    /// Full history, ending with the user's message.
    pub history: Vec<Message>,
    /// Target reply language.
    pub language: String,
}

impl GenerationRequest {
    pub fn for_turn(ticket: &TurnTicket) -> Self {
        Self {
            persona: ticket.persona.clone(),
            profile: ticket.profile.clone(),
            history: ticket.history.clone(),
            language: ticket.language.clone(),
        }
    }
}

/// A text delta from the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
}

impl Fragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Generation service errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Response was blocked by the provider's safety filter.
    #[error("content blocked: {0}")]
    Blocked(String),
}

impl GenerationError {
    /// Returns true if trying again later may succeed.
    ///
    /// The session never retries on its own; callers may surface this.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::RateLimited { .. }
                | GenerationError::Unavailable(_)
                | GenerationError::Network(_)
        )
    }
}
