//! School - a catalog category grouping personas and concepts.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::CategoryId;
use crate::domain::relevance::{ProfileTag, Tagged};

/// A school of thought (catalog category).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<ProfileTag>,
    #[serde(default)]
    pub concepts: Vec<ConceptEntry>,
}

impl School {
    /// Returns the concept at `index`, if any.
    pub fn concept(&self, index: usize) -> Option<&ConceptEntry> {
        self.concepts.get(index)
    }
}

impl Tagged for School {
    fn relevance_tags(&self) -> &[ProfileTag] {
        &self.tags
    }
}

/// A key concept taught by a school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConceptEntry {
    /// Read-only explanation.
    Text { title: String, body: String },
    /// Starts a single-topic chat seeded with `question`.
    Interactive {
        title: String,
        description: String,
        question: String,
    },
}

impl ConceptEntry {
    pub fn title(&self) -> &str {
        match self {
            ConceptEntry::Text { title, .. } | ConceptEntry::Interactive { title, .. } => title,
        }
    }

    /// The question an interactive concept opens its chat with.
    pub fn opening_question(&self) -> Option<&str> {
        match self {
            ConceptEntry::Text { .. } => None,
            ConceptEntry::Interactive { question, .. } => Some(question),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> School {
        serde_yaml::from_str(
            r#"
id: hades
name: Depth Psychology
description: The unconscious and what lies beneath.
tags: [hades, N]
concepts:
  - type: text
    title: The Unconscious
    body: Much of the mind is hidden.
  - type: interactive
    title: Dream Work
    description: Explore a recent dream.
    question: What does my recurring dream mean?
"#,
        )
        .unwrap()
    }

    #[test]
    fn concepts_deserialize_as_variants() {
        let school = sample();
        assert!(matches!(school.concepts[0], ConceptEntry::Text { .. }));
        assert!(matches!(school.concepts[1], ConceptEntry::Interactive { .. }));
    }

    #[test]
    fn only_interactive_concepts_have_opening_questions() {
        let school = sample();
        assert_eq!(school.concept(0).unwrap().opening_question(), None);
        assert_eq!(
            school.concept(1).unwrap().opening_question(),
            Some("What does my recurring dream mean?")
        );
        assert_eq!(school.concept(1).unwrap().title(), "Dream Work");
        assert!(school.concept(2).is_none());
    }

    #[test]
    fn unknown_concept_type_is_rejected() {
        let result: Result<ConceptEntry, _> =
            serde_yaml::from_str("type: video\ntitle: x\nbody: y\n");
        assert!(result.is_err());
    }
}
