//! HTTP DTOs for catalog and recommendation endpoints.

use serde::{Deserialize, Serialize};

use crate::application::SchoolSummary;
use crate::domain::catalog::{ConceptEntry, Persona, School};
use crate::domain::foundation::{CategoryId, PersonaId, ValidationError};
use crate::domain::relevance::{Ranking, ReasonCode, ScoredEntity, UserProfile};

/// Builds a profile from its two query parts. Both or neither must be given.
pub fn profile_from(
    code: Option<String>,
    category: Option<String>,
) -> Result<Option<UserProfile>, ValidationError> {
    match (code, category) {
        (None, None) => Ok(None),
        (Some(code), Some(category)) => UserProfile::parse(&code, &category).map(Some),
        (Some(_), None) => Err(ValidationError::empty_field("category")),
        (None, Some(_)) => Err(ValidationError::empty_field("code")),
    }
}

/// Largest recommended list a client may ask for.
pub const MAX_RECOMMENDED_LIMIT: usize = 50;

/// Resolves the requested list size against the server default.
pub fn recommended_limit(requested: Option<usize>, default: usize) -> Result<usize, ValidationError> {
    match requested {
        None => Ok(default),
        Some(n) if (1..=MAX_RECOMMENDED_LIMIT).contains(&n) => Ok(n),
        Some(n) => Err(ValidationError::out_of_range(
            "max",
            1,
            MAX_RECOMMENDED_LIMIT as i32,
            i32::try_from(n).unwrap_or(i32::MAX),
        )),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query parameters
// ════════════════════════════════════════════════════════════════════════════════

/// `GET /api/personas` and `GET /api/schools/:id` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonaListParams {
    pub school: Option<String>,
    pub search: Option<String>,
    pub code: Option<String>,
    pub category: Option<String>,
    /// Size of the recommended list; the server default applies when absent.
    pub max: Option<usize>,
}

/// `GET /api/schools` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchoolListParams {
    pub search: Option<String>,
    pub code: Option<String>,
    pub category: Option<String>,
    pub max: Option<usize>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// A ranked list split into recommended and other entries.
#[derive(Debug, Clone, Serialize)]
pub struct RankingResponse<T> {
    pub recommended: Vec<T>,
    pub other: Vec<T>,
}

impl<E, T: From<ScoredEntity<E>>> From<Ranking<E>> for RankingResponse<T> {
    fn from(ranking: Ranking<E>) -> Self {
        Self {
            recommended: ranking.recommended.into_iter().map(T::from).collect(),
            other: ranking.other.into_iter().map(T::from).collect(),
        }
    }
}

/// Persona card.
#[derive(Debug, Clone, Serialize)]
pub struct PersonaItem {
    pub id: PersonaId,
    pub name: String,
    pub school: CategoryId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub era: Option<String>,
    pub description: String,
    pub score: u32,
    pub reason: Option<ReasonCode>,
}

impl From<ScoredEntity<Persona>> for PersonaItem {
    fn from(scored: ScoredEntity<Persona>) -> Self {
        let Persona {
            id,
            name,
            school,
            era,
            description,
            ..
        } = scored.entity;
        Self {
            id,
            name,
            school,
            era,
            description,
            score: scored.score,
            reason: scored.reason,
        }
    }
}

/// School card.
#[derive(Debug, Clone, Serialize)]
pub struct SchoolItem {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub persona_count: usize,
    pub score: u32,
    pub reason: Option<ReasonCode>,
}

impl From<ScoredEntity<SchoolSummary>> for SchoolItem {
    fn from(scored: ScoredEntity<SchoolSummary>) -> Self {
        let SchoolSummary {
            school,
            persona_count,
        } = scored.entity;
        Self {
            id: school.id,
            name: school.name,
            description: school.description,
            persona_count,
            score: scored.score,
            reason: scored.reason,
        }
    }
}

/// One school with its concepts and ranked personas.
#[derive(Debug, Clone, Serialize)]
pub struct SchoolDetailResponse {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub concepts: Vec<ConceptEntry>,
    pub personas: RankingResponse<PersonaItem>,
}

impl SchoolDetailResponse {
    pub fn new(school: School, personas: Ranking<Persona>) -> Self {
        Self {
            id: school.id,
            name: school.name,
            description: school.description,
            concepts: school.concepts,
            personas: personas.into(),
        }
    }
}

/// Full persona entry, greeting included.
#[derive(Debug, Clone, Serialize)]
pub struct PersonaDetailResponse {
    #[serde(flatten)]
    pub persona: Persona,
    pub school_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_needs_both_parts() {
        assert_eq!(profile_from(None, None).unwrap(), None);
        assert!(profile_from(Some("INFJ".into()), None).is_err());
        assert!(profile_from(None, Some("hades".into())).is_err());
        assert!(profile_from(Some("INFJ".into()), Some("hades".into()))
            .unwrap()
            .is_some());
    }

    #[test]
    fn limit_defaults_and_bounds() {
        assert_eq!(recommended_limit(None, 3).unwrap(), 3);
        assert_eq!(recommended_limit(Some(10), 3).unwrap(), 10);
        assert!(recommended_limit(Some(0), 3).is_err());
        assert!(recommended_limit(Some(51), 3).is_err());
    }

    #[test]
    fn invalid_code_is_rejected() {
        assert!(profile_from(Some("INFX".into()), Some("hades".into())).is_err());
    }
}
