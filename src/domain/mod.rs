//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `relevance` - Profile-based scoring and ranking
//! - `catalog` - Personas, schools and concepts
//! - `conversation` - Streaming dialogue engine

pub mod catalog;
pub mod conversation;
pub mod foundation;
pub mod relevance;
