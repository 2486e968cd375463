//! Score command implementation for the popscore CLI.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use geo::{Coord, Rect};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use popscore_core::{DegeneratePolicy, ScoreOptions, compute_population_scores};
use popscore_data::network::{
    NetworkRequest, NetworkType, OverpassNetworkSource, OverpassSourceConfig, PbfNetworkSource,
    RoadNetworkSource,
};
use popscore_data::{OutputFormat, load_population_table, write_scores};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_ALLOW_DEGENERATE, ARG_BBOX, ARG_FORMAT, ARG_NETWORK_TYPE, ARG_NO_SIMPLIFY,
    ARG_NOMINATIM_URL, ARG_OSM_PBF, ARG_OUTPUT, ARG_OVERPASS_URL, ARG_PLACE, ARG_POPULATION,
    CliError, DEFAULT_OUTPUT, ENV_PLACE, ENV_POPULATION,
};

/// CLI arguments for the `score` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "score",
    long_about = "Score every node of a place's road network by the population \
                 living nearby. The network comes from an OSM PBF extract when \
                 --osm-pbf is given and from Overpass otherwise. Options can \
                 come from CLI flags, configuration files, or environment \
                 variables.",
    about = "Compute population scores for road network nodes"
)]
#[ortho_config(prefix = "POPSCORE")]
pub(crate) struct ScoreArgs {
    /// Place query, e.g. "Champaign, Illinois, USA".
    #[arg(long = ARG_PLACE, value_name = "query")]
    #[serde(default)]
    pub(crate) place: Option<String>,
    /// CSV table of population centers.
    #[arg(long = ARG_POPULATION, value_name = "path")]
    #[serde(default)]
    pub(crate) population: Option<Utf8PathBuf>,
    /// Read the network from this OSM PBF extract instead of Overpass.
    #[arg(long = ARG_OSM_PBF, value_name = "path")]
    #[serde(default)]
    pub(crate) osm_pbf: Option<Utf8PathBuf>,
    /// Clip the extract to `min_lon,min_lat,max_lon,max_lat`.
    #[arg(long = ARG_BBOX, value_name = "bounds", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) bbox: Option<String>,
    /// Which ways belong to the network (drive, drive_service, walk, bike, all).
    #[arg(long = ARG_NETWORK_TYPE, value_name = "type")]
    #[serde(default)]
    pub(crate) network_type: Option<NetworkType>,
    /// Keep interior way nodes instead of only endpoints and junctions.
    #[arg(long = ARG_NO_SIMPLIFY)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) no_simplify: bool,
    /// Overpass API base URL.
    #[arg(long = ARG_OVERPASS_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) overpass_url: Option<String>,
    /// Nominatim base URL.
    #[arg(long = ARG_NOMINATIM_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) nominatim_url: Option<String>,
    /// Output path (defaults to `population_scores.csv`).
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Output format (csv, json, bincode); inferred from the output extension.
    #[arg(long = ARG_FORMAT, value_name = "format")]
    #[serde(default)]
    pub(crate) format: Option<OutputFormat>,
    /// Score every node 0.0 instead of failing when no population is in reach.
    #[arg(long = ARG_ALLOW_DEGENERATE)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) allow_degenerate: bool,
}

impl ScoreArgs {
    pub(crate) fn into_config(self) -> Result<ScoreConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ScoreConfig::try_from(merged)
    }
}

/// Where the road network comes from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NetworkInput {
    /// An OSM PBF extract, optionally clipped.
    Pbf {
        path: Utf8PathBuf,
        bounds: Option<Rect<f64>>,
    },
    /// Live Nominatim and Overpass queries.
    Overpass(OverpassSourceConfig),
}

/// Resolved `score` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoreConfig {
    /// Place query.
    pub(crate) place: String,
    /// Path to the population table.
    pub(crate) population: Utf8PathBuf,
    /// Network origin.
    pub(crate) network: NetworkInput,
    /// Way filter to apply.
    pub(crate) network_type: NetworkType,
    /// Keep only endpoints and junctions.
    pub(crate) simplify: bool,
    /// Output path.
    pub(crate) output: Utf8PathBuf,
    /// Output encoding.
    pub(crate) format: OutputFormat,
    /// Scoring options.
    pub(crate) options: ScoreOptions,
}

impl ScoreConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.population, ARG_POPULATION)?;
        if let NetworkInput::Pbf { path, .. } = &self.network {
            Self::require_existing(path, ARG_OSM_PBF)?;
        }
        Ok(())
    }

    pub(crate) fn network_request(&self) -> NetworkRequest {
        NetworkRequest::new(self.place.as_str())
            .with_network_type(self.network_type)
            .with_simplify(self.simplify)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match popscore_fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) if popscore_fs::dir_exists(path).unwrap_or(false) => {
                Err(CliError::SourcePathNotFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Ok(false) => Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<ScoreArgs> for ScoreConfig {
    type Error = CliError;

    fn try_from(args: ScoreArgs) -> Result<Self, Self::Error> {
        let place = args.place.ok_or(CliError::MissingArgument {
            field: ARG_PLACE,
            env: ENV_PLACE,
        })?;
        let population = args.population.ok_or(CliError::MissingArgument {
            field: ARG_POPULATION,
            env: ENV_POPULATION,
        })?;

        let bounds = args.bbox.as_deref().map(parse_bbox).transpose()?;
        let network = match (args.osm_pbf, bounds) {
            (Some(path), clip) => NetworkInput::Pbf { path, bounds: clip },
            (None, Some(_)) => return Err(CliError::BoundsWithoutExtract),
            (None, None) => {
                let mut overpass = OverpassSourceConfig::default();
                if let Some(url) = args.overpass_url {
                    overpass = overpass.with_overpass_url(url);
                }
                if let Some(url) = args.nominatim_url {
                    overpass = overpass.with_nominatim_url(url);
                }
                NetworkInput::Overpass(overpass)
            }
        };

        let output = args
            .output
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT));
        let format = args
            .format
            .or_else(|| OutputFormat::from_path(&output))
            .unwrap_or_default();
        let policy = if args.allow_degenerate {
            DegeneratePolicy::Zero
        } else {
            DegeneratePolicy::Reject
        };

        Ok(Self {
            place,
            population,
            network,
            network_type: args.network_type.unwrap_or_default(),
            simplify: !args.no_simplify,
            output,
            format,
            options: ScoreOptions::default().with_degenerate_policy(policy),
        })
    }
}

/// Parse `min_lon,min_lat,max_lon,max_lat` into a rectangle.
pub(crate) fn parse_bbox(value: &str) -> Result<Rect<f64>, CliError> {
    let invalid = |reason: &'static str| CliError::InvalidBoundingBox {
        value: value.to_owned(),
        reason,
    };
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid("expected four comma-separated numbers"))?;
    let &[min_x, min_y, max_x, max_y] = parts.as_slice() else {
        return Err(invalid("expected four comma-separated numbers"));
    };
    if !parts.iter().all(|part| part.is_finite()) {
        return Err(invalid("coordinates must be finite"));
    }
    if min_x >= max_x || min_y >= max_y {
        return Err(invalid("minimum must be below maximum"));
    }
    Ok(Rect::new(
        Coord { x: min_x, y: min_y },
        Coord { x: max_x, y: max_y },
    ))
}

/// Outcome of a successful `score` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSummary {
    /// Number of scored road nodes.
    pub nodes: usize,
    /// Number of population centers read.
    pub centers: usize,
    /// Path the scores were written to.
    pub output: Utf8PathBuf,
    /// Encoding used for the output.
    pub format: OutputFormat,
}

impl fmt::Display for ScoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wrote {} node scores from {} population centers to {} ({})",
            self.nodes, self.centers, self.output, self.format
        )
    }
}

pub(crate) fn run_score(config: &ScoreConfig) -> Result<ScoreSummary, CliError> {
    let source = build_source(&config.network)?;
    score_with_source(config, source.as_ref())
}

fn build_source(network: &NetworkInput) -> Result<Box<dyn RoadNetworkSource>, CliError> {
    match network {
        NetworkInput::Pbf { path, bounds } => {
            let mut source = PbfNetworkSource::new(path.as_std_path());
            if let Some(rect) = bounds {
                source = source.with_bounds(*rect);
            }
            Ok(Box::new(source))
        }
        NetworkInput::Overpass(overpass) => {
            let source = OverpassNetworkSource::with_config(overpass.clone()).map_err(|source| {
                CliError::BuildNetworkSource {
                    overpass_url: overpass.overpass_url.clone(),
                    source,
                }
            })?;
            Ok(Box::new(source))
        }
    }
}

/// Load, score and write using an already constructed network source.
pub(crate) fn score_with_source(
    config: &ScoreConfig,
    source: &dyn RoadNetworkSource,
) -> Result<ScoreSummary, CliError> {
    let centers = load_population_table(&config.population)?;
    let nodes = source.load_nodes(&config.network_request())?;
    let table = compute_population_scores(&nodes, &centers, config.options)?;
    write_scores(&config.output, config.format, &nodes, &table)?;

    let summary = ScoreSummary {
        nodes: table.len(),
        centers: centers.len(),
        output: config.output.clone(),
        format: config.format,
    };
    info!("Scored {:?}: {summary}", config.place);
    Ok(summary)
}
