//! Ordering of scored entities into recommended and other lists.

use serde::Serialize;

use super::profile::UserProfile;
use super::scorer::{RelevanceScorer, ScoredEntity, Tagged};

/// A partitioned ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranking<T> {
    /// Positive scores, best first, catalog order among ties.
    pub recommended: Vec<ScoredEntity<T>>,
    /// Everything else, in catalog order.
    pub other: Vec<ScoredEntity<T>>,
}

impl<T> Ranking<T> {
    /// Total number of entities across both lists.
    pub fn len(&self) -> usize {
        self.recommended.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Stateless ranker bound to one scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ranker {
    scorer: RelevanceScorer,
}

impl Ranker {
    pub fn new(scorer: RelevanceScorer) -> Self {
        Self { scorer }
    }

    /// Scores every entity, then ranks.
    ///
    /// Filtering must already have been applied to `entities`.
    pub fn score_and_rank<T, I>(
        &self,
        entities: I,
        profile: Option<&UserProfile>,
        max_recommended: usize,
    ) -> Ranking<T>
    where
        T: Tagged,
        I: IntoIterator<Item = T>,
    {
        let scored = entities
            .into_iter()
            .map(|entity| {
                let relevance = self.scorer.score(profile, entity.relevance_tags());
                ScoredEntity::new(entity, relevance)
            })
            .collect();
        Self::rank(scored, max_recommended)
    }

    /// Partitions already-scored entities, given in catalog order.
    pub fn rank<T>(scored: Vec<ScoredEntity<T>>, max_recommended: usize) -> Ranking<T> {
        let mut candidates: Vec<usize> = scored
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.score > 0)
            .map(|(index, _)| index)
            .collect();
        // sort_by is stable, so equal scores keep catalog order.
        candidates.sort_by(|&a, &b| scored[b].score.cmp(&scored[a].score));
        candidates.truncate(max_recommended);

        let mut slots: Vec<Option<ScoredEntity<T>>> = scored.into_iter().map(Some).collect();
        let recommended = candidates
            .iter()
            .filter_map(|&index| slots[index].take())
            .collect();
        let other = slots.into_iter().flatten().collect();

        Ranking { recommended, other }
    }
}

/// Scores and ranks with the detail-view weighting.
pub fn score_and_rank<T, I>(
    entities: I,
    profile: Option<&UserProfile>,
    max_recommended: usize,
) -> Ranking<T>
where
    T: Tagged,
    I: IntoIterator<Item = T>,
{
    Ranker::new(RelevanceScorer::detail_view()).score_and_rank(entities, profile, max_recommended)
}
