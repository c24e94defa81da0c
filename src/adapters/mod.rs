//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Generation services (Gemini, scripted mock)
//! - `catalog` - File-backed read-only catalog
//! - `http` - REST and SSE surface (axum)

pub mod ai;
pub mod catalog;
pub mod http;
