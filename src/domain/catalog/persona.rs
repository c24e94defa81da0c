//! Persona - a simulated expert users can consult.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CategoryId, PersonaId};
use crate::domain::relevance::{ProfileTag, Tagged};

/// A simulated expert in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: PersonaId,
    pub name: String,
    /// The school (category) this persona belongs to.
    pub school: CategoryId,
    /// Lifetime or period, free text.
    #[serde(default)]
    pub era: Option<String>,
    pub description: String,
    /// Opening line shown before the first user message.
    pub greeting: String,
    #[serde(default)]
    pub tags: Vec<ProfileTag>,
}

impl Tagged for Persona {
    fn relevance_tags(&self) -> &[ProfileTag] {
        &self.tags
    }
}
