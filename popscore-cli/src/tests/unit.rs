//! Focused unit tests covering score CLI configuration.

use super::*;
use crate::score::{NetworkInput, ScoreConfig, parse_bbox};
use camino::Utf8PathBuf;
use clap::CommandFactory;
use geo::Coord;
use ortho_config::figment::Jail;
use popscore_core::DegeneratePolicy;
use popscore_data::OutputFormat;
use popscore_data::network::NetworkType;
use rstest::rstest;
use std::fs;
use tempfile::TempDir;

fn args(flags: &[&str]) -> ScoreArgs {
    let mut invocation = vec!["popscore", "score"];
    invocation.extend_from_slice(flags);
    match Cli::try_parse_from(invocation).expect("flags should parse").command {
        Command::Score(args) => args,
    }
}

fn config(flags: &[&str]) -> Result<ScoreConfig, CliError> {
    ScoreConfig::try_from(args(flags))
}

fn utf8(path: std::path::PathBuf) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path).expect("utf8 path")
}

#[rstest]
#[case(&["--population", "pop.csv"], ARG_PLACE, ENV_PLACE)]
#[case(&["--place", "Champaign"], ARG_POPULATION, ENV_POPULATION)]
fn converting_without_required_fields_errors(
    #[case] flags: &[&str],
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let err = config(flags).expect_err("missing field should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn defaults_fetch_simplified_drive_service_network() {
    let resolved = config(&["--place", "Champaign", "--population", "pop.csv"]).expect("config");

    assert_eq!(resolved.network_type, NetworkType::DriveService);
    assert!(resolved.simplify);
    assert_eq!(resolved.output, Utf8PathBuf::from(DEFAULT_OUTPUT));
    assert_eq!(resolved.format, OutputFormat::Csv);
    assert_eq!(resolved.options.degenerate, DegeneratePolicy::Reject);
    assert!(matches!(resolved.network, NetworkInput::Overpass(_)));
}

#[rstest]
#[case("scores.json", None, OutputFormat::Json)]
#[case("scores.bin", None, OutputFormat::Bincode)]
#[case("scores.txt", None, OutputFormat::Csv)]
#[case("scores.json", Some("csv"), OutputFormat::Csv)]
fn output_format_follows_flag_then_extension(
    #[case] output: &str,
    #[case] format: Option<&str>,
    #[case] expected: OutputFormat,
) {
    let mut flags = vec!["--place", "Champaign", "--population", "pop.csv", "--output", output];
    if let Some(name) = format {
        flags.extend(["--format", name]);
    }

    let resolved = config(&flags).expect("config");

    assert_eq!(resolved.format, expected);
}

#[rstest]
fn flags_override_network_and_scoring_defaults() {
    let resolved = config(&[
        "--place",
        "Champaign",
        "--population",
        "pop.csv",
        "--network-type",
        "walk",
        "--no-simplify",
        "--allow-degenerate",
        "--overpass-url",
        "http://localhost:12345/api",
    ])
    .expect("config");

    assert_eq!(resolved.network_type, NetworkType::Walk);
    assert!(!resolved.simplify);
    assert_eq!(resolved.options.degenerate, DegeneratePolicy::Zero);
    match resolved.network {
        NetworkInput::Overpass(overpass) => {
            assert_eq!(overpass.overpass_url, "http://localhost:12345/api");
        }
        other => panic!("expected Overpass input, found {other:?}"),
    }
}

#[rstest]
fn unknown_network_type_is_rejected_by_clap() {
    let err = Cli::try_parse_from(["popscore", "score", "--network-type", "boat"])
        .expect_err("unknown network type");
    assert!(err.to_string().contains("boat"));
}

#[rstest]
fn bbox_clips_pbf_input() {
    let resolved = config(&[
        "--place",
        "Champaign",
        "--population",
        "pop.csv",
        "--osm-pbf",
        "champaign.osm.pbf",
        "--bbox",
        "-88.4,40.0,-88.1,40.2",
    ])
    .expect("config");

    match resolved.network {
        NetworkInput::Pbf { path, bounds } => {
            assert_eq!(path, Utf8PathBuf::from("champaign.osm.pbf"));
            let rect = bounds.expect("bounds");
            assert_eq!(rect.min(), Coord { x: -88.4, y: 40.0 });
            assert_eq!(rect.max(), Coord { x: -88.1, y: 40.2 });
        }
        other => panic!("expected PBF input, found {other:?}"),
    }
}

#[rstest]
fn bbox_without_extract_is_rejected() {
    let err = config(&[
        "--place",
        "Champaign",
        "--population",
        "pop.csv",
        "--bbox",
        "0,0,1,1",
    ])
    .expect_err("bbox requires an extract");
    assert!(matches!(err, CliError::BoundsWithoutExtract));
}

#[rstest]
#[case("1,2,3", "expected four comma-separated numbers")]
#[case("a,b,c,d", "expected four comma-separated numbers")]
#[case("0,0,inf,1", "coordinates must be finite")]
#[case("1,0,0,1", "minimum must be below maximum")]
#[case("0,1,1,1", "minimum must be below maximum")]
fn parse_bbox_rejects_malformed_values(#[case] value: &str, #[case] expected: &str) {
    match parse_bbox(value).expect_err("malformed bbox") {
        CliError::InvalidBoundingBox { reason, .. } => assert_eq!(reason, expected),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_missing_population() {
    let tmp = TempDir::new().expect("tempdir");
    let missing = utf8(tmp.path().join("missing.csv"));
    let resolved = config(&["--place", "Champaign", "--population", missing.as_str()])
        .expect("config");

    let err = resolved.validate_sources().expect_err("expected failure");
    match err {
        CliError::MissingSourceFile { field, path } => {
            assert_eq!(field, ARG_POPULATION);
            assert_eq!(path, missing);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn validate_sources_rejects_directories() {
    let tmp = TempDir::new().expect("tempdir");
    let population = utf8(tmp.path().join("pop.csv"));
    fs::write(&population, "lat,long,population\n").expect("write table");
    let directory = utf8(tmp.path().to_path_buf());
    let resolved = config(&[
        "--place",
        "Champaign",
        "--population",
        population.as_str(),
        "--osm-pbf",
        directory.as_str(),
    ])
    .expect("config");

    let err = resolved
        .validate_sources()
        .expect_err("expected directory rejection");
    match err {
        CliError::SourcePathNotFile { field, .. } => assert_eq!(field, ARG_OSM_PBF),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn summary_reads_naturally() {
    let summary = ScoreSummary {
        nodes: 12,
        centers: 3,
        output: Utf8PathBuf::from("out.csv"),
        format: OutputFormat::Csv,
    };
    assert_eq!(
        summary.to_string(),
        "wrote 12 node scores from 3 population centers to out.csv (csv)"
    );
}

#[rstest]
fn score_command_reads_score_env_prefix() {
    assert_eq!(ScoreArgs::command().get_name(), "score");
}

#[rstest]
fn environment_fills_options_missing_from_flags() {
    Jail::expect_with(|jail| {
        jail.set_env(ENV_POPULATION, "census.csv");
        jail.set_env("POPSCORE_CMDS_SCORE_ALLOW_DEGENERATE", "true");
        jail.set_env("POPSCORE_CMDS_SCORE_NO_SIMPLIFY", "true");

        let resolved = args(&["--place", "Champaign"])
            .into_config()
            .expect("merged config");

        assert_eq!(resolved.population, Utf8PathBuf::from("census.csv"));
        assert_eq!(resolved.options.degenerate, DegeneratePolicy::Zero);
        assert!(!resolved.simplify);
        Ok(())
    });
}

#[rstest]
fn flags_take_precedence_over_environment() {
    Jail::expect_with(|jail| {
        jail.set_env(ENV_PLACE, "Urbana");
        jail.set_env(ENV_POPULATION, "census.csv");

        let resolved = args(&["--place", "Champaign", "--population", "flags.csv"])
            .into_config()
            .expect("merged config");

        assert_eq!(resolved.place, "Champaign");
        assert_eq!(resolved.population, Utf8PathBuf::from("flags.csv"));
        Ok(())
    });
}

#[rstest]
fn config_file_score_section_is_merged() {
    Jail::expect_with(|jail| {
        jail.create_file(
            ".popscore.toml",
            "[cmds.score]\n\
             population = \"census.csv\"\n\
             network_type = \"walk\"\n\
             allow_degenerate = true\n",
        )?;

        let resolved = args(&["--place", "Champaign"])
            .into_config()
            .expect("merged config");

        assert_eq!(resolved.population, Utf8PathBuf::from("census.csv"));
        assert_eq!(resolved.network_type, NetworkType::Walk);
        assert_eq!(resolved.options.degenerate, DegeneratePolicy::Zero);
        Ok(())
    });
}
