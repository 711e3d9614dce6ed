use std::collections::{BTreeMap, BTreeSet};

/// Points added to a score each cycle a class is suspected.
const SCORE_INCREASE: u32 = 1;

/// The suspicion score of each tracked class, bounded to `capacity` classes.
#[derive(Debug, Clone)]
pub struct SuspicionTable<V> {
    capacity: usize,
    scores: BTreeMap<V, u32>,
}

impl<V> SuspicionTable<V>
where
    V: Clone + Ord,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            scores: BTreeMap::new(),
        }
    }

    /// Erases every class not in `suspects`, whatever its score was.
    pub fn reset(&mut self, suspects: &BTreeSet<V>) {
        self.scores.retain(|value, _| suspects.contains(value));
    }

    /// Increases the score of every class in `suspects`.
    ///
    /// New classes are only tracked while the table has room.
    pub fn reinforce(&mut self, suspects: &BTreeSet<V>) {
        for value in suspects {
            if let Some(score) = self.scores.get_mut(value) {
                *score = score.saturating_add(SCORE_INCREASE);
            } else if self.scores.len() < self.capacity {
                self.scores.insert(value.clone(), SCORE_INCREASE);
            }
        }
    }

    /// Returns the classes whose score reached `threshold`, in key order.
    pub fn confirmed(&self, threshold: u32) -> Vec<V> {
        let mut confirmed = Vec::new();
        for (value, score) in &self.scores {
            // checked before pushing, so up to `capacity + 1` values fit
            if confirmed.len() > self.capacity {
                break;
            }
            if *score >= threshold {
                confirmed.push(value.clone());
            }
        }

        confirmed
    }

    pub fn score(&self, value: &V) -> Option<u32> {
        self.scores.get(value).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&V, &u32)> {
        self.scores.iter()
    }
}
