//! Errors raised while computing population scores.

use thiserror::Error;

/// Errors returned by [`compute_population_scores`](crate::compute_population_scores).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    /// A node or center violated an input precondition.
    #[error("invalid scoring input: {0}")]
    InvalidInput(#[from] InputError),
    /// Normalisation is undefined and the policy forbids a zero fallback.
    #[error("cannot normalise population scores: {reason}")]
    DegenerateInput {
        /// Why the maximum raw score was zero.
        reason: DegenerateReason,
    },
}

/// Precondition violations found in scoring inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// Two nodes share an identifier.
    #[error("node id {id} appears more than once")]
    DuplicateNode {
        /// The repeated identifier.
        id: u64,
    },
    /// A node position is NaN or infinite.
    #[error("node {id} has a non-finite position ({x}, {y})")]
    NonFiniteNode {
        /// Offending node identifier.
        id: u64,
        /// Longitude as supplied.
        x: f64,
        /// Latitude as supplied.
        y: f64,
    },
    /// A center position is NaN or infinite.
    #[error("population center {index} has a non-finite position ({x}, {y})")]
    NonFiniteCenter {
        /// Zero-based position of the center in the input.
        index: usize,
        /// Longitude as supplied.
        x: f64,
        /// Latitude as supplied.
        y: f64,
    },
    /// A center carries a negative population count.
    #[error("population center {index} has negative population {population}")]
    NegativePopulation {
        /// Zero-based position of the center in the input.
        index: usize,
        /// Population as supplied.
        population: f64,
    },
    /// A center carries a NaN or infinite population count.
    #[error("population center {index} has non-finite population {population}")]
    NonFinitePopulation {
        /// Zero-based position of the center in the input.
        index: usize,
        /// Population as supplied.
        population: f64,
    },
}

/// Reasons normalisation by the maximum raw score is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DegenerateReason {
    /// No population centers were supplied.
    #[error("no population centers were supplied")]
    NoCenters,
    /// Every raw score summed to zero, e.g. all populations are zero.
    #[error("every raw score is zero")]
    ZeroScores,
    /// The maximum raw score overflowed to infinity.
    #[error("the maximum raw score is not finite")]
    Overflow,
}
