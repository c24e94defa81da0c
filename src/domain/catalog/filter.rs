//! Pre-ranking filters over catalog entries.

use crate::domain::foundation::CategoryId;

use super::{Persona, School};

/// Free-text and category filter, applied before scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    query: Option<String>,
    school: Option<CategoryId>,
}

impl CatalogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring search. Blank queries match everything.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into().trim().to_lowercase();
        self.query = (!query.is_empty()).then_some(query);
        self
    }

    /// Restricts personas to one school.
    pub fn with_school(mut self, school: CategoryId) -> Self {
        self.school = Some(school);
        self
    }

    pub fn matches_persona(&self, persona: &Persona) -> bool {
        if let Some(school) = &self.school {
            if &persona.school != school {
                return false;
            }
        }
        self.matches_text(&[
            persona.name.as_str(),
            persona.description.as_str(),
            persona.era.as_deref().unwrap_or_default(),
        ])
    }

    pub fn matches_school(&self, school: &School) -> bool {
        if let Some(wanted) = &self.school {
            if &school.id != wanted {
                return false;
            }
        }
        self.matches_text(&[school.name.as_str(), school.description.as_str()])
    }

    fn matches_text(&self, fields: &[&str]) -> bool {
        match &self.query {
            None => true,
            Some(query) => fields
                .iter()
                .any(|field| field.to_lowercase().contains(query.as_str())),
        }
    }
}
