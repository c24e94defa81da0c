//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;
pub mod stream_consumer;

pub use handlers::{
    RecommendPersonasHandler, RecommendPersonasQuery, RecommendSchoolsHandler,
    RecommendSchoolsQuery, SchoolSummary, SessionDefaults, StartSessionCommand,
    StartSessionError, StartSessionHandler, TurnDriver, TurnOutcome, DEFAULT_GREETING,
};
pub use stream_consumer::{StreamConsumer, StreamError, StreamProgress};
