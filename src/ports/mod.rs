//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `GenerationService` - Streamed model output for conversation turns
//! - `CatalogReader` - Read-only persona and school lookup

mod catalog_reader;
mod generation_service;

pub use catalog_reader::{CatalogError, CatalogReader, EntryKind};
pub use generation_service::{
    Fragment, FragmentStream, GenerationError, GenerationRequest, GenerationService,
};
