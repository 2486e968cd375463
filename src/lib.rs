//! Facade crate for road-network population scoring.
//!
//! This crate re-exports the core domain types and the score computer. Data
//! loading, output writers and the command-line tool live in the
//! `popscore-data` and `popscore-cli` workspace members.

#![forbid(unsafe_code)]

pub use popscore_core::{
    DegeneratePolicy, DegenerateReason, InputError, PopulationCenter, RoadNode, ScoreError,
    ScoreOptions, ScoreTable, compute_population_scores,
};
