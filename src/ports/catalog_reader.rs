//! Catalog Reader Port - read-only access to personas and schools.
//!
//! The catalog is loaded once and never written at runtime, so implementations
//! can be shared across sessions without locking.

use std::fmt;

use crate::domain::catalog::{ConceptEntry, Persona, School};
use crate::domain::foundation::{CategoryId, DomainError, ErrorCode, PersonaId};

/// Port for catalog lookups.
pub trait CatalogReader: Send + Sync {
    /// All schools in catalog order.
    fn schools(&self) -> &[School];

    /// All personas in catalog order.
    fn personas(&self) -> &[Persona];

    fn lookup_school(&self, id: &CategoryId) -> Result<&School, CatalogError> {
        self.schools()
            .iter()
            .find(|school| &school.id == id)
            .ok_or_else(|| CatalogError::not_found(EntryKind::School, id))
    }

    fn lookup_persona(&self, id: &PersonaId) -> Result<&Persona, CatalogError> {
        self.personas()
            .iter()
            .find(|persona| &persona.id == id)
            .ok_or_else(|| CatalogError::not_found(EntryKind::Persona, id))
    }

    fn lookup_concept(&self, school: &CategoryId, index: usize) -> Result<&ConceptEntry, CatalogError> {
        self.lookup_school(school)?
            .concept(index)
            .ok_or_else(|| CatalogError::not_found(EntryKind::Concept, format!("{}#{}", school, index)))
    }

    /// Personas of one school, in catalog order.
    fn personas_of(&self, school: &CategoryId) -> Vec<&Persona> {
        self.personas()
            .iter()
            .filter(|persona| &persona.school == school)
            .collect()
    }
}

/// Kind of catalog entry a lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Persona,
    School,
    Concept,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryKind::Persona => "persona",
            EntryKind::School => "school",
            EntryKind::Concept => "concept",
        };
        write!(f, "{}", s)
    }
}

/// Catalog errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntryKind, id: String },

    #[error("catalog load failed: {0}")]
    Load(String),
}

impl CatalogError {
    pub fn not_found(kind: EntryKind, id: impl fmt::Display) -> Self {
        CatalogError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<CatalogError> for DomainError {
    fn from(err: CatalogError) -> Self {
        let code = match &err {
            CatalogError::NotFound { kind: EntryKind::Persona, .. } => ErrorCode::PersonaNotFound,
            CatalogError::NotFound { kind: EntryKind::School, .. } => ErrorCode::CategoryNotFound,
            CatalogError::NotFound { kind: EntryKind::Concept, .. } => ErrorCode::ConceptNotFound,
            CatalogError::Load(_) => ErrorCode::CatalogError,
        };
        DomainError::new(code, err.to_string())
    }
}
