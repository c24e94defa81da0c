//! StartSession command handler.
//!
//! Builds a [`ConversationSession`] from catalog entries: a persona
//! consultation, a single-topic chat seeded by an interactive concept, or a
//! generic session with neither.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::catalog::ConceptEntry;
use crate::domain::conversation::{ConversationSession, SessionConfig, SessionSeed};
use crate::domain::foundation::{CategoryId, DomainError, ErrorCode, PersonaId};
use crate::domain::relevance::UserProfile;
use crate::ports::{CatalogError, CatalogReader};

pub const DEFAULT_GREETING: &str = "Hello. What would you like to talk about today?";

/// Command to open a new session.
#[derive(Debug, Clone, Default)]
pub struct StartSessionCommand {
    pub persona_id: Option<PersonaId>,
    /// Required together with `concept_index`.
    pub school_id: Option<CategoryId>,
    pub concept_index: Option<usize>,
    pub profile: Option<UserProfile>,
    /// Falls back to the configured default.
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartSessionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("concept_index requires school_id")]
    MissingSchool,

    #[error("concept {index} of school '{school}' is not interactive")]
    ConceptNotInteractive { school: CategoryId, index: usize },
}

impl From<StartSessionError> for DomainError {
    fn from(err: StartSessionError) -> Self {
        match err {
            StartSessionError::Catalog(inner) => inner.into(),
            StartSessionError::MissingSchool => DomainError::validation("school_id", err.to_string()),
            StartSessionError::ConceptNotInteractive { .. } => {
                DomainError::new(ErrorCode::ValidationFailed, err.to_string())
            }
        }
    }
}

/// Defaults applied to every new session.
#[derive(Debug, Clone)]
pub struct SessionDefaults {
    pub language: String,
    pub greeting: String,
    pub config: SessionConfig,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            language: "English".to_string(),
            greeting: DEFAULT_GREETING.to_string(),
            config: SessionConfig::default(),
        }
    }
}

pub struct StartSessionHandler {
    catalog: Arc<dyn CatalogReader>,
    defaults: SessionDefaults,
}

impl StartSessionHandler {
    pub fn new(catalog: Arc<dyn CatalogReader>, defaults: SessionDefaults) -> Self {
        Self { catalog, defaults }
    }

    /// Creates the session. The opening question of an interactive concept is
    /// stored, not sent; callers fire it through `take_auto_start`.
    pub fn handle(&self, cmd: StartSessionCommand) -> Result<ConversationSession, StartSessionError> {
        let language = cmd
            .language
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.defaults.language.clone());

        let persona = cmd
            .persona_id
            .as_ref()
            .map(|id| self.catalog.lookup_persona(id).cloned())
            .transpose()?;

        let concept = match (cmd.concept_index, &cmd.school_id) {
            (None, _) => None,
            (Some(_), None) => return Err(StartSessionError::MissingSchool),
            (Some(index), Some(school)) => match self.catalog.lookup_concept(school, index)? {
                ConceptEntry::Interactive {
                    description,
                    question,
                    ..
                } => Some((description.clone(), question.clone())),
                ConceptEntry::Text { .. } => {
                    return Err(StartSessionError::ConceptNotInteractive {
                        school: school.clone(),
                        index,
                    })
                }
            },
        };

        let greeting = match (&persona, &concept) {
            (Some(persona), _) => persona.greeting.clone(),
            (None, Some((description, _))) => description.clone(),
            (None, None) => self.defaults.greeting.clone(),
        };

        let mut seed = SessionSeed::new(greeting, language).with_profile(cmd.profile);
        if let Some(persona) = persona {
            seed = seed.with_persona(persona);
        }
        if let Some((_, question)) = concept {
            seed = seed.with_opening_question(question);
        }

        let session = ConversationSession::new(seed, self.defaults.config.clone());
        tracing::info!(
            session_id = %session.id(),
            persona = ?cmd.persona_id.as_ref().map(PersonaId::as_str),
            concept = ?cmd.concept_index,
            "Session started"
        );
        Ok(session)
    }
}
