//! Relevance module - profile-based recommendation of catalog entries.
//!
//! # Module Organization
//!
//! - `profile` - Personality code, facets, user profile and relevance tags
//! - `scorer` - Additive scoring with first-match reason codes
//! - `ranker` - Stable partition into recommended / other lists

mod profile;
mod ranker;
mod scorer;

pub use profile::{Facet, PersonalityCode, ProfileTag, UserProfile, CATEGORY_FOCUS_TAG};
pub use ranker::{score_and_rank, Ranker, Ranking};
pub use scorer::{ReasonCode, Relevance, RelevanceScorer, ScoredEntity, ScoringProfile, Tagged};
