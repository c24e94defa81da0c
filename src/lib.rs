//! Persona Advisor - conversations with simulated experts.
//!
//! Two engines sit at the core of this crate:
//!
//! - a streaming dialogue engine that drives one conversation turn at a time,
//!   folds streamed fragments into the transcript and extracts follow-up
//!   suggestions from the final reply
//! - a relevance engine that scores catalog entries against a user's
//!   personality profile and splits them into recommended and other lists
//!
//! The layout is hexagonal: `domain` holds the pure model, `ports` the traits
//! it needs from the outside world, `application` the use cases and
//! `adapters` the concrete implementations (Gemini, YAML catalog, axum).

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
