//! Relevance scoring of tagged catalog entries against a user profile.
//!
//! Scores are additive: every rule whose tag is present contributes its
//! points. The recorded reason is the first matching rule in priority order
//! and does not depend on the total.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::profile::{ProfileTag, UserProfile};

/// Which weighting is applied when scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoringProfile {
    /// Choosing among experts within one category: facets 3 and 2 at +2.
    #[default]
    DetailView,
    /// Ranking whole categories: all four facets at +1, summed over members.
    ListAggregate,
}

/// Why an entity was recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum ReasonCode {
    /// The entity carries the user's dominant category.
    DominantCategory,
    /// The entity carries the user's full personality code.
    FullCode,
    /// The entity carries the facet at this code index.
    Facet(usize),
    /// The entity carries the generic category-focus marker.
    CategoryFocus,
}

impl ReasonCode {
    /// Stable machine-readable spelling.
    pub fn as_code(&self) -> String {
        match self {
            ReasonCode::DominantCategory => "dominant_category".to_string(),
            ReasonCode::FullCode => "full_code".to_string(),
            ReasonCode::Facet(index) => format!("facet_{}", index),
            ReasonCode::CategoryFocus => "category_focus".to_string(),
        }
    }
}

impl From<ReasonCode> for String {
    fn from(reason: ReasonCode) -> Self {
        reason.as_code()
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_code())
    }
}

/// Outcome of scoring one entity (or one group of entities).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Relevance {
    pub score: u32,
    pub reason: Option<ReasonCode>,
}

impl Relevance {
    /// The result for "nothing matched".
    pub fn none() -> Self {
        Self::default()
    }
}

/// An entity paired with its relevance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredEntity<T> {
    pub entity: T,
    pub score: u32,
    pub reason: Option<ReasonCode>,
}

impl<T> ScoredEntity<T> {
    /// Pairs an entity with a relevance result.
    pub fn new(entity: T, relevance: Relevance) -> Self {
        Self {
            entity,
            score: relevance.score,
            reason: relevance.reason,
        }
    }
}

/// Anything that carries relevance tags.
pub trait Tagged {
    fn relevance_tags(&self) -> &[ProfileTag];
}

impl<T: Tagged + ?Sized> Tagged for &T {
    fn relevance_tags(&self) -> &[ProfileTag] {
        (**self).relevance_tags()
    }
}

struct Rule {
    reason: ReasonCode,
    tag: ProfileTag,
    points: u32,
}

/// Stateless scorer for one [`ScoringProfile`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RelevanceScorer {
    mode: ScoringProfile,
}

impl RelevanceScorer {
    pub fn new(mode: ScoringProfile) -> Self {
        Self { mode }
    }

    pub fn detail_view() -> Self {
        Self::new(ScoringProfile::DetailView)
    }

    pub fn list_aggregate() -> Self {
        Self::new(ScoringProfile::ListAggregate)
    }

    pub fn mode(&self) -> ScoringProfile {
        self.mode
    }

    /// Scores one tag set against the profile.
    ///
    /// Without a profile every entity scores 0 with no reason.
    pub fn score(&self, profile: Option<&UserProfile>, tags: &[ProfileTag]) -> Relevance {
        self.score_group(profile, std::iter::once(tags))
    }

    /// Scores a group as the sum of its members' scores.
    ///
    /// The reason is the highest-priority rule matched by any member.
    pub fn score_group<'a, I>(&self, profile: Option<&UserProfile>, members: I) -> Relevance
    where
        I: IntoIterator<Item = &'a [ProfileTag]>,
    {
        let Some(profile) = profile else {
            return Relevance::none();
        };

        let rules = self.rules(profile);
        let mut score = 0;
        let mut best: Option<usize> = None;

        for tags in members {
            for (priority, rule) in rules.iter().enumerate() {
                if tags.contains(&rule.tag) {
                    score += rule.points;
                    best = Some(best.map_or(priority, |b| b.min(priority)));
                }
            }
        }

        Relevance {
            score,
            reason: best.map(|priority| rules[priority].reason),
        }
    }

    /// Rules in reason-priority order.
    fn rules(&self, profile: &UserProfile) -> Vec<Rule> {
        let mut rules = vec![
            Rule {
                reason: ReasonCode::DominantCategory,
                tag: ProfileTag::Category(profile.dominant_category.clone()),
                points: 5,
            },
            Rule {
                reason: ReasonCode::FullCode,
                tag: ProfileTag::Code(profile.code),
                points: 3,
            },
        ];

        let (facet_indices, facet_points): (&[usize], u32) = match self.mode {
            ScoringProfile::DetailView => (&[2, 1][..], 2),
            ScoringProfile::ListAggregate => (&[0, 1, 2, 3][..], 1),
        };
        for &index in facet_indices {
            if let Some(facet) = profile.code.facet(index) {
                rules.push(Rule {
                    reason: ReasonCode::Facet(index),
                    tag: ProfileTag::Facet(facet),
                    points: facet_points,
                });
            }
        }

        rules.push(Rule {
            reason: ReasonCode::CategoryFocus,
            tag: ProfileTag::CategoryFocus,
            points: 2,
        });
        rules
    }
}
