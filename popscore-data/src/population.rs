//! Population center tables.
//!
//! A table is a CSV file with one row per center. Only three columns are
//! read; any others are ignored:
//!
//! | column     | accepted headers (case-insensitive)      |
//! |------------|------------------------------------------|
//! | longitude  | `long`, `lon`, `lng`, `longitude`, `x`   |
//! | latitude   | `lat`, `latitude`, `y`                   |
//! | population | `population`, `pop`                      |

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use log::info;
use popscore_core::PopulationCenter;
use thiserror::Error;

use popscore_fs::open_utf8_file;

const LONGITUDE_HEADERS: &[&str] = &["long", "lon", "lng", "longitude", "x"];
const LATITUDE_HEADERS: &[&str] = &["lat", "latitude", "y"];
const POPULATION_HEADERS: &[&str] = &["population", "pop"];

/// Errors raised while loading a population table.
#[derive(Debug, Error)]
pub enum PopulationTableError {
    /// The table could not be opened.
    #[error("failed to open population table at {path}")]
    Open {
        #[source]
        source: io::Error,
        path: Utf8PathBuf,
    },
    /// The CSV stream could not be read.
    #[error("failed to read population table")]
    Read {
        #[source]
        source: csv::Error,
    },
    /// None of the accepted headers for a column was present.
    #[error("population table has no {column} column")]
    MissingColumn { column: &'static str },
    /// A cell could not be parsed as a finite number.
    #[error("row {row}: invalid {column} value {value:?}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    /// A population cell was negative.
    #[error("row {row}: population must not be negative, got {value}")]
    NegativePopulation { row: usize, value: f64 },
}

/// Load population centers from the CSV file at `path`.
///
/// # Errors
///
/// Returns [`PopulationTableError::Open`] when the file cannot be opened and
/// any error [`read_population_table`] reports for its contents.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use popscore_data::load_population_table;
///
/// let centers = load_population_table(Utf8Path::new("census.csv"))?;
/// println!("{} population centers", centers.len());
/// # Ok::<(), popscore_data::PopulationTableError>(())
/// ```
pub fn load_population_table(
    path: &Utf8Path,
) -> Result<Vec<PopulationCenter>, PopulationTableError> {
    let file = open_utf8_file(path).map_err(|source| PopulationTableError::Open {
        source,
        path: path.to_path_buf(),
    })?;
    let centers = read_population_table(file)?;
    info!("Loaded {} population centers from {path}", centers.len());
    Ok(centers)
}

/// Read population centers from CSV data.
///
/// Rows keep their input order. A header with no data rows yields an empty
/// vector.
///
/// # Errors
///
/// Returns an error when a required column is missing, a cell is not a finite
/// number, a population is negative or the stream is not valid CSV.
///
/// # Examples
/// ```
/// use popscore_data::read_population_table;
///
/// let csv = "Lat,Long,Population\n40.1,-88.2,1200\n";
/// let centers = read_population_table(csv.as_bytes())?;
/// assert_eq!(centers[0].location.x, -88.2);
/// assert_eq!(centers[0].population, 1200.0);
/// # Ok::<(), popscore_data::PopulationTableError>(())
/// ```
pub fn read_population_table<R: io::Read>(
    reader: R,
) -> Result<Vec<PopulationCenter>, PopulationTableError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|source| PopulationTableError::Read { source })?;
    let columns = Columns::locate(headers)?;

    let mut centers = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|source| PopulationTableError::Read { source })?;
        centers.push(columns.parse_row(&record, index + 1)?);
    }
    Ok(centers)
}

struct Columns {
    longitude: usize,
    latitude: usize,
    population: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, PopulationTableError> {
        Ok(Self {
            longitude: find_column(headers, "longitude", LONGITUDE_HEADERS)?,
            latitude: find_column(headers, "latitude", LATITUDE_HEADERS)?,
            population: find_column(headers, "population", POPULATION_HEADERS)?,
        })
    }

    fn parse_row(
        &self,
        record: &csv::StringRecord,
        row: usize,
    ) -> Result<PopulationCenter, PopulationTableError> {
        let x = parse_cell(record, self.longitude, row, "longitude")?;
        let y = parse_cell(record, self.latitude, row, "latitude")?;
        let population = parse_cell(record, self.population, row, "population")?;
        if population < 0.0 {
            return Err(PopulationTableError::NegativePopulation {
                row,
                value: population,
            });
        }
        Ok(PopulationCenter::new(Coord { x, y }, population))
    }
}

fn find_column(
    headers: &csv::StringRecord,
    column: &'static str,
    aliases: &[&str],
) -> Result<usize, PopulationTableError> {
    headers
        .iter()
        .position(|header| {
            aliases
                .iter()
                .any(|alias| header.trim().eq_ignore_ascii_case(alias))
        })
        .ok_or(PopulationTableError::MissingColumn { column })
}

fn parse_cell(
    record: &csv::StringRecord,
    index: usize,
    row: usize,
    column: &'static str,
) -> Result<f64, PopulationTableError> {
    let raw = record.get(index).unwrap_or_default();
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| PopulationTableError::InvalidValue {
            row,
            column,
            value: raw.to_owned(),
        })
}
