//! System instruction construction for generation adapters.

use crate::domain::catalog::Persona;
use crate::domain::relevance::UserProfile;

use super::directive::{SUGGESTION_CLOSE, SUGGESTION_OPEN};

/// Maximum number of follow-up suggestions the model is asked for.
pub const MAX_SUGGESTIONS: usize = 3;

/// Builds the system instruction for a conversation.
#[derive(Debug, Clone)]
pub struct PromptBuilder<'a> {
    persona: Option<&'a Persona>,
    profile: Option<&'a UserProfile>,
    language: &'a str,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(language: &'a str) -> Self {
        Self {
            persona: None,
            profile: None,
            language,
        }
    }

    pub fn with_persona(mut self, persona: Option<&'a Persona>) -> Self {
        self.persona = persona;
        self
    }

    pub fn with_profile(mut self, profile: Option<&'a UserProfile>) -> Self {
        self.profile = profile;
        self
    }

    pub fn build(&self) -> String {
        let mut sections = Vec::with_capacity(4);

        sections.push(match self.persona {
            Some(persona) => {
                let era = persona
                    .era
                    .as_deref()
                    .map(|era| format!(" ({era})"))
                    .unwrap_or_default();
                format!(
                    "You are {}{}. {}\nStay in character and answer as this thinker would, \
                     drawing on their ideas and vocabulary.",
                    persona.name, era, persona.description
                )
            }
            None => "You are a thoughtful psychology guide. Explain ideas clearly and \
                     relate them to the user's situation."
                .to_string(),
        });

        if let Some(profile) = self.profile {
            sections.push(format!(
                "The user's personality type is {} and their dominant archetype is '{}'. \
                 Tailor examples to them without labelling them.",
                profile.code, profile.dominant_category
            ));
        }

        sections.push(format!("Always reply in {}.", self.language));

        sections.push(format!(
            "End every reply with up to {MAX_SUGGESTIONS} short follow-up questions the user \
             might ask next, each wrapped as {SUGGESTION_OPEN}question{SUGGESTION_CLOSE}."
        ));

        sections.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CategoryId, PersonaId};

    fn jung() -> Persona {
        Persona {
            id: PersonaId::new("jung").unwrap(),
            name: "Carl Jung".to_string(),
            school: CategoryId::new("hades").unwrap(),
            era: Some("1875-1961".to_string()),
            description: "Founder of analytical psychology.".to_string(),
            greeting: "Welcome.".to_string(),
            tags: vec![],
        }
    }

    #[test]
    fn generic_prompt_has_language_and_suggestion_format() {
        let prompt = PromptBuilder::new("English").build();
        assert!(prompt.contains("psychology guide"));
        assert!(prompt.contains("Always reply in English."));
        assert!(prompt.contains("[SUGGESTION]question[/SUGGESTION]"));
    }

    #[test]
    fn persona_prompt_names_the_persona_and_era() {
        let persona = jung();
        let prompt = PromptBuilder::new("Deutsch")
            .with_persona(Some(&persona))
            .build();
        assert!(prompt.starts_with("You are Carl Jung (1875-1961)."));
        assert!(prompt.contains("Always reply in Deutsch."));
    }

    #[test]
    fn profile_is_included_when_present() {
        let profile = UserProfile::parse("INFJ", "hades").unwrap();
        let prompt = PromptBuilder::new("English")
            .with_profile(Some(&profile))
            .build();
        assert!(prompt.contains("INFJ"));
        assert!(prompt.contains("'hades'"));
    }
}
