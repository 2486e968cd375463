//! Data access for population scoring.
//!
//! Responsibilities:
//! - Load population centers from CSV tables.
//! - Load road network nodes from OSM PBF extracts or Overpass.
//! - Write score tables as CSV, JSON or bincode.
//!
//! Boundaries:
//! - Do not encode scoring rules (live in `popscore-core`).
//! - Keep HTTP behind the synchronous [`network::RoadNetworkSource`] trait.
//!
//! Invariants:
//! - Returned nodes are sorted by id and unique.
//! - No global mutable state.

pub mod network;
mod output;
mod population;

pub use output::{OutputFormat, ParseOutputFormatError, ScoreWriteError, write_scores};
pub use population::{PopulationTableError, load_population_table, read_population_table};
