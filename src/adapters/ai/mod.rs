//! Generation Service Adapters.
//!
//! Implementations of the GenerationService port.
//!
//! ## Available Adapters
//!
//! - `MockGenerationService` - Scripted fragments for tests and offline mode
//! - `GeminiProvider` - Google Gemini models over SSE streaming

mod gemini_provider;
mod mock_generation;

pub use gemini_provider::{GeminiConfig, GeminiProvider, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use mock_generation::{MockGenerationService, MockScript};
