//! HTTP adapter for conversation sessions.

pub mod dto;
mod handlers;
mod registry;
mod routes;

pub use registry::{spawn_turn, SessionEntry, SessionRegistry};
pub use routes::session_routes;
