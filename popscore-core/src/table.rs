//! Normalised scores keyed by node identifier.

use std::collections::BTreeMap;

/// Normalised population scores keyed by road node identifier.
///
/// Entries iterate in ascending id order, so serialised tables are stable
/// across runs.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreTable {
    scores: BTreeMap<u64, f64>,
}

impl ScoreTable {
    /// Wrap a pre-computed map of scores.
    #[expect(
        clippy::missing_const_for_fn,
        reason = "tables are assembled at runtime from computed scores"
    )]
    #[must_use]
    pub fn new(scores: BTreeMap<u64, f64>) -> Self {
        Self { scores }
    }

    /// Return the score for `node_id`, if the node was scored.
    #[must_use]
    pub fn get(&self, node_id: u64) -> Option<f64> {
        self.scores.get(&node_id).copied()
    }

    /// Return the number of scored nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Report whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Iterate `(node_id, score)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        self.scores.iter().map(|(&id, &score)| (id, score))
    }

    /// Return the largest score, or `None` for an empty table.
    #[must_use]
    pub fn max_score(&self) -> Option<f64> {
        self.scores.values().copied().reduce(f64::max)
    }

    /// Consume the table and return the underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<u64, f64> {
        self.scores
    }
}

impl FromIterator<(u64, f64)> for ScoreTable {
    fn from_iter<T: IntoIterator<Item = (u64, f64)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
