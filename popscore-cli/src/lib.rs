//! Command-line interface for road-network population scoring.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod score;

pub use error::CliError;
pub use score::ScoreSummary;

use score::ScoreArgs;

pub(crate) const ARG_PLACE: &str = "place";
pub(crate) const ARG_POPULATION: &str = "population";
pub(crate) const ARG_OSM_PBF: &str = "osm-pbf";
pub(crate) const ARG_BBOX: &str = "bbox";
pub(crate) const ARG_NETWORK_TYPE: &str = "network-type";
pub(crate) const ARG_NO_SIMPLIFY: &str = "no-simplify";
pub(crate) const ARG_OVERPASS_URL: &str = "overpass-url";
pub(crate) const ARG_NOMINATIM_URL: &str = "nominatim-url";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ARG_FORMAT: &str = "format";
pub(crate) const ARG_ALLOW_DEGENERATE: &str = "allow-degenerate";
pub(crate) const ENV_PLACE: &str = "POPSCORE_CMDS_SCORE_PLACE";
pub(crate) const ENV_POPULATION: &str = "POPSCORE_CMDS_SCORE_POPULATION";

/// Default output path when `--output` is not given.
pub const DEFAULT_OUTPUT: &str = "population_scores.csv";

/// Run the popscore CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError::ArgumentParsing`] for invalid flags (including the
/// `--help` and `--version` short-circuits) and any error raised while
/// loading, scoring or writing.
pub fn run() -> Result<ScoreSummary, CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Score(args) => {
            let config = args.into_config()?;
            config.validate_sources()?;
            score::run_score(&config)
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "popscore",
    about = "Score road network nodes by nearby population",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score every node of a place's road network and write the results.
    Score(ScoreArgs),
}

#[cfg(test)]
mod tests;
