//! Core domain types and scoring for road-network population scores.
//!
//! The crate turns a set of road network nodes and a set of population
//! centers into a [`ScoreTable`]: every node is scored by the population of
//! every center divided by a scaled planar distance, and the raw scores are
//! normalised by their maximum into the `0.0..=1.0` range.
//!
//! Loading the inputs and persisting the output live in `popscore-data`; this
//! crate performs no I/O.
//!
//! # Examples
//!
//! ```
//! use geo::Coord;
//! use popscore_core::{
//!     DegeneratePolicy, PopulationCenter, RoadNode, ScoreOptions, compute_population_scores,
//! };
//!
//! let nodes = [RoadNode::new(7, Coord { x: -88.24, y: 40.11 })];
//! let options = ScoreOptions::default().with_degenerate_policy(DegeneratePolicy::Zero);
//! let table = compute_population_scores(&nodes, &[], options)?;
//! assert_eq!(table.get(7), Some(0.0));
//! # Ok::<(), popscore_core::ScoreError>(())
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod node;
pub mod score;
mod table;

pub use error::{DegenerateReason, InputError, ScoreError};
pub use node::{PopulationCenter, RoadNode};
pub use score::{
    DISTANCE_OFFSET, DISTANCE_SCALE, DegeneratePolicy, ScoreOptions, compute_population_scores,
    normalise_scores, raw_population_score,
};
pub use table::ScoreTable;
