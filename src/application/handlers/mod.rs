//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

mod drive_turn;
mod recommend;
mod start_session;

pub use drive_turn::{TurnDriver, TurnOutcome};
pub use recommend::{
    RecommendPersonasHandler, RecommendPersonasQuery, RecommendSchoolsHandler,
    RecommendSchoolsQuery, SchoolSummary,
};
pub use start_session::{
    SessionDefaults, StartSessionCommand, StartSessionError, StartSessionHandler, DEFAULT_GREETING,
};
