//! User profile and relevance tag value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{CategoryId, ValidationError};

/// Literal spelling of the generic category-focus tag.
pub const CATEGORY_FOCUS_TAG: &str = "category-focus";

/// Allowed letters per position of a personality code.
const FACET_ALPHABET: [[char; 2]; 4] = [['E', 'I'], ['S', 'N'], ['T', 'F'], ['J', 'P']];

/// One letter of a personality code (E/I, S/N, T/F, J/P).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Facet(char);

impl Facet {
    /// Creates a facet from a letter, case-insensitively.
    pub fn new(letter: char) -> Result<Self, ValidationError> {
        let upper = letter.to_ascii_uppercase();
        if FACET_ALPHABET.iter().any(|pair| pair.contains(&upper)) {
            Ok(Self(upper))
        } else {
            Err(ValidationError::invalid_format(
                "facet",
                format!("'{}' is not a personality facet", letter),
            ))
        }
    }

    /// Returns the facet letter.
    pub fn letter(&self) -> char {
        self.0
    }

    /// Returns the code position (0..=3) this facet belongs to.
    pub fn position(&self) -> usize {
        FACET_ALPHABET
            .iter()
            .position(|pair| pair.contains(&self.0))
            .unwrap_or_default()
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A four-letter personality type code such as `INFJ`.
///
/// Each letter is a [`Facet`] drawn from the dichotomy for its position, so a
/// code never repeats a letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonalityCode([Facet; 4]);

impl PersonalityCode {
    /// Returns the facet at `index` (0..=3).
    pub fn facet(&self, index: usize) -> Option<Facet> {
        self.0.get(index).copied()
    }

    /// Returns all four facets in code order.
    pub fn facets(&self) -> [Facet; 4] {
        self.0
    }
}

impl FromStr for PersonalityCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let letters: Vec<char> = s.trim().chars().collect();
        if letters.len() != 4 {
            return Err(ValidationError::invalid_format(
                "personality_code",
                format!("expected 4 letters, got {}", letters.len()),
            ));
        }

        let mut facets = [Facet('E'); 4];
        for (index, letter) in letters.into_iter().enumerate() {
            let facet = Facet::new(letter)?;
            if facet.position() != index {
                return Err(ValidationError::invalid_format(
                    "personality_code",
                    format!("'{}' cannot appear at position {}", facet, index + 1),
                ));
            }
            facets[index] = facet;
        }
        Ok(Self(facets))
    }
}

impl TryFrom<String> for PersonalityCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PersonalityCode> for String {
    fn from(code: PersonalityCode) -> Self {
        code.to_string()
    }
}

impl fmt::Display for PersonalityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for facet in &self.0 {
            write!(f, "{}", facet)?;
        }
        Ok(())
    }
}

/// A user's previously computed profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Personality type code.
    pub code: PersonalityCode,
    /// The category the user's assessment pointed to most strongly.
    pub dominant_category: CategoryId,
}

impl UserProfile {
    /// Creates a new profile.
    pub fn new(code: PersonalityCode, dominant_category: CategoryId) -> Self {
        Self {
            code,
            dominant_category,
        }
    }

    /// Parses a profile from its raw string parts.
    pub fn parse(code: &str, dominant_category: &str) -> Result<Self, ValidationError> {
        Ok(Self::new(code.parse()?, CategoryId::new(dominant_category)?))
    }
}

/// A relevance tag carried by a catalog entry.
///
/// Tags are authored as plain strings and classified on parse:
/// `category-focus` is the focus marker, a single facet letter is a facet, a
/// valid four-letter code is a full code, anything else is a category id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProfileTag {
    /// A category (school) identifier.
    Category(CategoryId),
    /// A complete personality code.
    Code(PersonalityCode),
    /// A single personality facet.
    Facet(Facet),
    /// Generic "fits whatever category the user leans to" marker.
    CategoryFocus,
}

impl FromStr for ProfileTag {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw == CATEGORY_FOCUS_TAG {
            return Ok(ProfileTag::CategoryFocus);
        }

        let mut chars = raw.chars();
        if let (Some(letter), None) = (chars.next(), chars.next()) {
            if letter.is_ascii_uppercase() {
                return Facet::new(letter).map(ProfileTag::Facet);
            }
        }

        if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_uppercase()) {
            if let Ok(code) = raw.parse() {
                return Ok(ProfileTag::Code(code));
            }
        }

        CategoryId::new(raw).map(ProfileTag::Category)
    }
}

impl TryFrom<String> for ProfileTag {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProfileTag> for String {
    fn from(tag: ProfileTag) -> Self {
        tag.to_string()
    }
}

impl fmt::Display for ProfileTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileTag::Category(id) => write!(f, "{}", id),
            ProfileTag::Code(code) => write!(f, "{}", code),
            ProfileTag::Facet(facet) => write!(f, "{}", facet),
            ProfileTag::CategoryFocus => write!(f, "{}", CATEGORY_FOCUS_TAG),
        }
    }
}
