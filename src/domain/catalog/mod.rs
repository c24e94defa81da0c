//! Catalog module - personas, schools and concepts.
//!
//! The catalog is static content: loaded once, never mutated at runtime, and
//! reached only through the `CatalogReader` port.

mod filter;
mod persona;
mod school;

pub use filter::CatalogFilter;
pub use persona::Persona;
pub use school::{ConceptEntry, School};
