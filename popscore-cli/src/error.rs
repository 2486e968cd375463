//! Error types emitted by the popscore CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use popscore_core::ScoreError;
use popscore_data::network::{NetworkSourceError, SourceBuildError};
use popscore_data::{PopulationTableError, ScoreWriteError};
use thiserror::Error;

/// Errors emitted by the popscore CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The bounding box option could not be parsed.
    #[error("invalid bounding box {value:?}: {reason}")]
    InvalidBoundingBox { value: String, reason: &'static str },
    /// A bounding box was given without a PBF extract to clip.
    #[error("--bbox only applies together with --osm-pbf")]
    BoundsWithoutExtract,
    /// Loading the population table failed.
    #[error(transparent)]
    PopulationTable(#[from] PopulationTableError),
    /// Constructing the HTTP network source failed.
    #[error("failed to build network source for {overpass_url:?}: {source}")]
    BuildNetworkSource {
        overpass_url: String,
        #[source]
        source: SourceBuildError,
    },
    /// Loading the road network failed.
    #[error("failed to load road network: {0}")]
    LoadNetwork(#[from] NetworkSourceError),
    /// Scoring rejected the inputs.
    #[error("failed to compute population scores: {0}")]
    Score(#[from] ScoreError),
    /// Writing the score table failed.
    #[error(transparent)]
    WriteScores(#[from] ScoreWriteError),
}
