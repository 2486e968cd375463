//! Distance-weighted population scoring.
//!
//! A node's raw score sums `population / (distance * DISTANCE_SCALE +
//! DISTANCE_OFFSET)` over every population center, with `distance` measured
//! as the planar Euclidean distance between `(longitude, latitude)` pairs.
//! Raw scores are then divided by their maximum so the busiest node scores
//! exactly `1.0`.

use std::collections::{BTreeMap, HashSet};

use geo::Coord;
use log::debug;

use crate::error::{DegenerateReason, InputError, ScoreError};
use crate::{PopulationCenter, RoadNode, ScoreTable};

/// Multiplier applied to the degree-scale distance before it divides a
/// population.
///
/// This is a heuristic damping constant rather than a unit conversion;
/// coordinates stay in degrees and no geodesic correction is applied.
pub const DISTANCE_SCALE: f64 = 1000.0;

/// Offset added to the scaled distance so a node sitting exactly on a center
/// receives `population / 1` instead of dividing by zero.
pub const DISTANCE_OFFSET: f64 = 1.0;

/// How to normalise when the maximum raw score is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DegeneratePolicy {
    /// Fail with [`ScoreError::DegenerateInput`].
    #[default]
    Reject,
    /// Score every node `0.0`.
    Zero,
}

/// Options for [`compute_population_scores`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreOptions {
    /// Behaviour when normalisation would divide by zero.
    pub degenerate: DegeneratePolicy,
}

impl ScoreOptions {
    /// Set the degenerate-input policy.
    #[must_use]
    pub const fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate = policy;
        self
    }
}

/// Score every node by its inverse-distance-weighted population pressure.
///
/// Every input node receives exactly one entry. An empty node slice yields
/// an empty table regardless of the centers.
///
/// # Errors
/// Returns [`ScoreError::InvalidInput`] for duplicate node ids, non-finite
/// coordinates and negative or non-finite populations, and
/// [`ScoreError::DegenerateInput`] when the maximum raw score is zero under
/// [`DegeneratePolicy::Reject`].
///
/// # Examples
/// ```
/// use geo::Coord;
/// use popscore_core::{PopulationCenter, RoadNode, ScoreOptions, compute_population_scores};
///
/// let nodes = [
///     RoadNode::new(1, Coord { x: 0.0, y: 0.0 }),
///     RoadNode::new(2, Coord { x: 1.0, y: 0.0 }),
/// ];
/// let centers = [PopulationCenter::new(Coord { x: 0.0, y: 0.0 }, 100.0)];
/// let table = compute_population_scores(&nodes, &centers, ScoreOptions::default())?;
/// assert_eq!(table.get(1), Some(1.0));
/// # Ok::<(), popscore_core::ScoreError>(())
/// ```
pub fn compute_population_scores(
    nodes: &[RoadNode],
    centers: &[PopulationCenter],
    options: ScoreOptions,
) -> Result<ScoreTable, ScoreError> {
    validate_nodes(nodes)?;
    validate_centers(centers)?;
    if nodes.is_empty() {
        return Ok(ScoreTable::default());
    }
    if centers.is_empty() {
        return degenerate(nodes, DegenerateReason::NoCenters, options.degenerate);
    }

    let raw: BTreeMap<u64, f64> = nodes
        .iter()
        .map(|node| (node.id, raw_population_score(node.location, centers)))
        .collect();
    debug!(
        "Computed raw population scores for {} nodes from {} centers",
        nodes.len(),
        centers.len()
    );
    normalise_scores(&raw, options.degenerate)
}

/// Sum the distance-weighted population of `centers` as seen from
/// `location`.
///
/// Centers are visited in slice order.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the score is a floating-point weighted sum"
)]
pub fn raw_population_score(location: Coord<f64>, centers: &[PopulationCenter]) -> f64 {
    centers.iter().fold(0.0_f64, |total, center| {
        let distance = planar_distance(location, center.location);
        total + center.population / (distance * DISTANCE_SCALE + DISTANCE_OFFSET)
    })
}

/// Divide every raw score by the maximum raw score.
///
/// # Errors
/// Returns [`ScoreError::DegenerateInput`] when the maximum is zero and
/// `policy` is [`DegeneratePolicy::Reject`], or when the maximum overflowed
/// to infinity under either policy.
#[expect(
    clippy::float_arithmetic,
    reason = "normalising scores divides by the maximum raw value"
)]
pub fn normalise_scores(
    raw: &BTreeMap<u64, f64>,
    policy: DegeneratePolicy,
) -> Result<ScoreTable, ScoreError> {
    if raw.is_empty() {
        return Ok(ScoreTable::default());
    }
    let max = raw.values().copied().fold(0.0_f64, f64::max);
    debug!("Maximum raw population score is {max}");
    if !max.is_finite() {
        return Err(ScoreError::DegenerateInput {
            reason: DegenerateReason::Overflow,
        });
    }
    if max <= 0.0_f64 {
        return match policy {
            DegeneratePolicy::Reject => Err(ScoreError::DegenerateInput {
                reason: DegenerateReason::ZeroScores,
            }),
            DegeneratePolicy::Zero => Ok(raw.keys().map(|&id| (id, 0.0_f64)).collect()),
        };
    }
    Ok(raw
        .iter()
        .map(|(&id, &value)| (id, (value / max).clamp(0.0_f64, 1.0_f64)))
        .collect())
}

#[expect(
    clippy::float_arithmetic,
    reason = "distance is computed from coordinate differences"
)]
fn planar_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

fn degenerate(
    nodes: &[RoadNode],
    reason: DegenerateReason,
    policy: DegeneratePolicy,
) -> Result<ScoreTable, ScoreError> {
    match policy {
        DegeneratePolicy::Reject => Err(ScoreError::DegenerateInput { reason }),
        DegeneratePolicy::Zero => Ok(nodes.iter().map(|node| (node.id, 0.0_f64)).collect()),
    }
}

fn validate_nodes(nodes: &[RoadNode]) -> Result<(), InputError> {
    let mut seen = HashSet::with_capacity(nodes.len());
    for node in nodes {
        let Coord { x, y } = node.location;
        if !x.is_finite() || !y.is_finite() {
            return Err(InputError::NonFiniteNode { id: node.id, x, y });
        }
        if !seen.insert(node.id) {
            return Err(InputError::DuplicateNode { id: node.id });
        }
    }
    Ok(())
}

fn validate_centers(centers: &[PopulationCenter]) -> Result<(), InputError> {
    for (index, center) in centers.iter().enumerate() {
        let Coord { x, y } = center.location;
        if !x.is_finite() || !y.is_finite() {
            return Err(InputError::NonFiniteCenter { index, x, y });
        }
        let population = center.population;
        if !population.is_finite() {
            return Err(InputError::NonFinitePopulation { index, population });
        }
        if population < 0.0_f64 {
            return Err(InputError::NegativePopulation { index, population });
        }
    }
    Ok(())
}
