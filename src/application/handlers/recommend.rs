//! Recommendation query handlers.
//!
//! Both queries filter first, then score, then rank. Filtering never looks at
//! scores, so a filtered-out entry cannot appear in either list.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::catalog::{CatalogFilter, Persona, School};
use crate::domain::foundation::CategoryId;
use crate::domain::relevance::{Ranker, Ranking, RelevanceScorer, ScoredEntity, UserProfile};
use crate::ports::{CatalogError, CatalogReader};

// ════════════════════════════════════════════════════════════════════════════
// RecommendPersonas
// ════════════════════════════════════════════════════════════════════════════

/// Ranks personas, optionally within one school.
#[derive(Debug, Clone, Default)]
pub struct RecommendPersonasQuery {
    pub school: Option<CategoryId>,
    pub search: Option<String>,
    pub profile: Option<UserProfile>,
    pub max_recommended: usize,
}

pub struct RecommendPersonasHandler {
    catalog: Arc<dyn CatalogReader>,
}

impl RecommendPersonasHandler {
    pub fn new(catalog: Arc<dyn CatalogReader>) -> Self {
        Self { catalog }
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the requested school does not exist.
    pub fn handle(&self, query: RecommendPersonasQuery) -> Result<Ranking<Persona>, CatalogError> {
        let mut filter = CatalogFilter::new();
        if let Some(school) = query.school {
            self.catalog.lookup_school(&school)?;
            filter = filter.with_school(school);
        }
        if let Some(search) = query.search {
            filter = filter.with_query(search);
        }

        let candidates = self
            .catalog
            .personas()
            .iter()
            .filter(|persona| filter.matches_persona(persona))
            .cloned();

        Ok(Ranker::new(RelevanceScorer::detail_view()).score_and_rank(
            candidates,
            query.profile.as_ref(),
            query.max_recommended,
        ))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RecommendSchools
// ════════════════════════════════════════════════════════════════════════════

/// Ranks whole schools by their aggregate relevance.
#[derive(Debug, Clone, Default)]
pub struct RecommendSchoolsQuery {
    pub search: Option<String>,
    pub profile: Option<UserProfile>,
    pub max_recommended: usize,
}

/// A school with the number of personas it groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchoolSummary {
    #[serde(flatten)]
    pub school: School,
    pub persona_count: usize,
}

pub struct RecommendSchoolsHandler {
    catalog: Arc<dyn CatalogReader>,
}

impl RecommendSchoolsHandler {
    pub fn new(catalog: Arc<dyn CatalogReader>) -> Self {
        Self { catalog }
    }

    /// A school's score is the sum over its own tags and every persona's tags,
    /// using the list-aggregate weighting.
    pub fn handle(&self, query: RecommendSchoolsQuery) -> Ranking<SchoolSummary> {
        let filter = match query.search {
            Some(search) => CatalogFilter::new().with_query(search),
            None => CatalogFilter::new(),
        };
        let scorer = RelevanceScorer::list_aggregate();
        let profile = query.profile.as_ref();

        let scored = self
            .catalog
            .schools()
            .iter()
            .filter(|school| filter.matches_school(school))
            .map(|school| {
                let members = self.catalog.personas_of(&school.id);
                let relevance = scorer.score_group(
                    profile,
                    std::iter::once(school.tags.as_slice())
                        .chain(members.iter().map(|persona| persona.tags.as_slice())),
                );
                let summary = SchoolSummary {
                    school: school.clone(),
                    persona_count: members.len(),
                };
                ScoredEntity::new(summary, relevance)
            })
            .collect();

        Ranker::rank(scored, query.max_recommended)
    }
}
