//! Writers for computed score tables.

use std::fmt;
use std::io::{self, BufWriter, Write};
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use popscore_core::{RoadNode, ScoreTable};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use popscore_fs::create_utf8_file;

/// File formats accepted by [`write_scores`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `node_id,longitude,latitude,score` rows.
    #[default]
    Csv,
    /// An object mapping node ids to scores.
    Json,
    /// The bincode encoding of [`ScoreTable`].
    Bincode,
}

impl OutputFormat {
    /// Infer the format from the extension of `path`.
    ///
    /// # Examples
    /// ```
    /// use camino::Utf8Path;
    /// use popscore_data::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::from_path(Utf8Path::new("out/scores.JSON")), Some(OutputFormat::Json));
    /// assert_eq!(OutputFormat::from_path(Utf8Path::new("scores.txt")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        let extension = path.extension()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "bin" | "bincode" => Some(Self::Bincode),
            _ => None,
        }
    }

    /// Lower-case name used on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Bincode => "bincode",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown output format name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output format {name:?}; expected csv, json or bincode")]
pub struct ParseOutputFormatError {
    /// The rejected name.
    pub name: String,
}

impl FromStr for OutputFormat {
    type Err = ParseOutputFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "bincode" | "bin" => Ok(Self::Bincode),
            _ => Err(ParseOutputFormatError { name: s.to_owned() }),
        }
    }
}

/// Errors raised while writing scores.
#[derive(Debug, Error)]
pub enum ScoreWriteError {
    /// The output file could not be created.
    #[error("failed to create output file at {path}")]
    CreateFile {
        #[source]
        source: io::Error,
        path: Utf8PathBuf,
    },
    /// Writing to the output file failed.
    #[error("failed to write scores to {path}")]
    Write {
        #[source]
        source: io::Error,
        path: Utf8PathBuf,
    },
    /// A node has no entry in the score table.
    #[error("node {id} has no score")]
    MissingScore { id: u64 },
    /// CSV encoding failed.
    #[error("failed to encode CSV scores for {path}")]
    Csv {
        #[source]
        source: csv::Error,
        path: Utf8PathBuf,
    },
    /// JSON encoding failed.
    #[error("failed to encode JSON scores for {path}")]
    Json {
        #[source]
        source: serde_json::Error,
        path: Utf8PathBuf,
    },
    /// Bincode encoding failed.
    #[error("failed to encode bincode scores for {path}")]
    Serialise {
        #[source]
        source: bincode::Error,
        path: Utf8PathBuf,
    },
}

#[derive(Serialize)]
struct ScoreRow {
    node_id: u64,
    longitude: f64,
    latitude: f64,
    score: f64,
}

/// Serialises a table as a bare `{"<node_id>": score}` object.
struct ScoreMap<'a>(&'a ScoreTable);

impl Serialize for ScoreMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter())
    }
}

/// Write `table` to `path` in `format`, creating parent directories.
///
/// CSV output lists every node in ascending id order with its coordinates.
/// JSON and bincode output carry only the scores. Every node must have a
/// score before `path` is created, so a rejected table leaves any existing
/// file untouched.
///
/// # Errors
///
/// Returns [`ScoreWriteError::MissingScore`] when a node in `nodes` has no
/// score, and I/O or encoding errors otherwise.
pub fn write_scores(
    path: &Utf8Path,
    format: OutputFormat,
    nodes: &[RoadNode],
    table: &ScoreTable,
) -> Result<(), ScoreWriteError> {
    let rows = score_rows(nodes, table)?;
    let file = create_utf8_file(path).map_err(|source| ScoreWriteError::CreateFile {
        source,
        path: path.to_path_buf(),
    })?;
    let mut writer = BufWriter::new(file);
    match format {
        OutputFormat::Csv => write_csv(&mut writer, path, &rows)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &ScoreMap(table)).map_err(|source| {
                ScoreWriteError::Json {
                    source,
                    path: path.to_path_buf(),
                }
            })?;
        }
        OutputFormat::Bincode => {
            bincode::serialize_into(&mut writer, table).map_err(|source| {
                ScoreWriteError::Serialise {
                    source,
                    path: path.to_path_buf(),
                }
            })?;
        }
    }
    writer.flush().map_err(|source| ScoreWriteError::Write {
        source,
        path: path.to_path_buf(),
    })?;
    info!("Wrote {} scores to {path} as {format}", table.len());
    Ok(())
}

/// Pair every node with its score, in ascending id order.
fn score_rows(nodes: &[RoadNode], table: &ScoreTable) -> Result<Vec<ScoreRow>, ScoreWriteError> {
    let mut rows = nodes
        .iter()
        .map(|node| {
            let score = table
                .get(node.id)
                .ok_or(ScoreWriteError::MissingScore { id: node.id })?;
            Ok(ScoreRow {
                node_id: node.id,
                longitude: node.location.x,
                latitude: node.location.y,
                score,
            })
        })
        .collect::<Result<Vec<_>, ScoreWriteError>>()?;
    rows.sort_by_key(|row| row.node_id);
    Ok(rows)
}

fn write_csv<W: Write>(
    writer: W,
    path: &Utf8Path,
    rows: &[ScoreRow],
) -> Result<(), ScoreWriteError> {
    let csv_error = |source: csv::Error| ScoreWriteError::Csv {
        source,
        path: path.to_path_buf(),
    };
    let mut csv_writer = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        csv_writer
            .write_record(["node_id", "longitude", "latitude", "score"])
            .map_err(csv_error)?;
    }
    for row in rows {
        csv_writer.serialize(row).map_err(csv_error)?;
    }
    csv_writer.flush().map_err(|source| ScoreWriteError::Write {
        source,
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Scored {
        nodes: Vec<RoadNode>,
        table: ScoreTable,
    }

    #[fixture]
    fn scored() -> Scored {
        Scored {
            nodes: vec![
                RoadNode::new(7, Coord { x: -88.25, y: 40.5 }),
                RoadNode::new(2, Coord { x: -88.0, y: 40.0 }),
            ],
            table: [(2, 1.0), (7, 0.5)].into_iter().collect(),
        }
    }

    fn temp_path(dir: &TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(name)).expect("utf8 temp path")
    }

    #[rstest]
    #[case("scores.csv", Some(OutputFormat::Csv))]
    #[case("scores.Json", Some(OutputFormat::Json))]
    #[case("scores.bin", Some(OutputFormat::Bincode))]
    #[case("scores", None)]
    fn infers_format_from_extension(#[case] path: &str, #[case] expected: Option<OutputFormat>) {
        assert_eq!(OutputFormat::from_path(Utf8Path::new(path)), expected);
    }

    #[rstest]
    #[case("CSV", OutputFormat::Csv)]
    #[case(" json ", OutputFormat::Json)]
    #[case("bin", OutputFormat::Bincode)]
    fn parses_format_names(#[case] name: &str, #[case] expected: OutputFormat) {
        assert_eq!(name.parse::<OutputFormat>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_format_name() {
        let err = "parquet".parse::<OutputFormat>().expect_err("should fail");
        assert_eq!(err.name, "parquet");
    }

    #[rstest]
    fn csv_rows_follow_node_ids(scored: Scored) {
        let dir = TempDir::new().expect("tempdir");
        let path = temp_path(&dir, "nested/out/scores.csv");

        write_scores(&path, OutputFormat::Csv, &scored.nodes, &scored.table).expect("write");

        let written = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(
            written,
            "node_id,longitude,latitude,score\n2,-88.0,40.0,1.0\n7,-88.25,40.5,0.5\n"
        );
    }

    #[rstest]
    fn empty_csv_still_has_header() {
        let dir = TempDir::new().expect("tempdir");
        let path = temp_path(&dir, "scores.csv");

        write_scores(&path, OutputFormat::Csv, &[], &ScoreTable::default()).expect("write");

        let written = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(written, "node_id,longitude,latitude,score\n");
    }

    #[rstest]
    fn json_maps_ids_to_scores(scored: Scored) {
        let dir = TempDir::new().expect("tempdir");
        let path = temp_path(&dir, "scores.json");

        write_scores(&path, OutputFormat::Json, &scored.nodes, &scored.table).expect("write");

        let written = std::fs::read_to_string(&path).expect("read back");
        let value: serde_json::Value = serde_json::from_str(&written).expect("valid json");
        assert_eq!(value, serde_json::json!({"2": 1.0, "7": 0.5}));
    }

    #[rstest]
    fn bincode_decodes_to_same_table(scored: Scored) {
        let dir = TempDir::new().expect("tempdir");
        let path = temp_path(&dir, "scores.bin");

        write_scores(&path, OutputFormat::Bincode, &scored.nodes, &scored.table).expect("write");

        let bytes = std::fs::read(&path).expect("read back");
        let decoded: ScoreTable = bincode::deserialize(&bytes).expect("decode");
        assert_eq!(decoded, scored.table);
    }

    #[rstest]
    fn missing_score_is_reported(scored: Scored) {
        let dir = TempDir::new().expect("tempdir");
        let path = temp_path(&dir, "scores.csv");
        let partial: ScoreTable = [(2, 1.0)].into_iter().collect();

        let err = write_scores(&path, OutputFormat::Csv, &scored.nodes, &partial)
            .expect_err("should fail");

        assert!(matches!(err, ScoreWriteError::MissingScore { id: 7 }));
    }

    #[rstest]
    #[case(OutputFormat::Csv)]
    #[case(OutputFormat::Json)]
    #[case(OutputFormat::Bincode)]
    fn missing_score_leaves_previous_output(scored: Scored, #[case] format: OutputFormat) {
        let dir = TempDir::new().expect("tempdir");
        let path = temp_path(&dir, "scores.out");
        std::fs::write(&path, "previous run\n").expect("seed output");
        let partial: ScoreTable = [(7, 1.0)].into_iter().collect();

        let err = write_scores(&path, format, &scored.nodes, &partial).expect_err("should fail");

        assert!(matches!(err, ScoreWriteError::MissingScore { id: 2 }));
        let kept = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(kept, "previous run\n");
    }

    #[rstest]
    fn missing_score_creates_no_directories(scored: Scored) {
        let dir = TempDir::new().expect("tempdir");
        let path = temp_path(&dir, "nested/scores.csv");

        write_scores(&path, OutputFormat::Csv, &scored.nodes, &ScoreTable::default())
            .expect_err("should fail");

        assert!(!dir.path().join("nested").exists());
    }
}
