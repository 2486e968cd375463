//! Behavioural coverage for loading population tables from disk.

use std::cell::RefCell;
use std::fs;

use camino::Utf8PathBuf;
use geo::Coord;
use popscore_core::PopulationCenter;
use popscore_data::{PopulationTableError, load_population_table};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

type LoadResult = RefCell<Option<Result<Vec<PopulationCenter>, PopulationTableError>>>;

/// CSV lines written before loading.
#[fixture]
pub fn lines() -> RefCell<Vec<String>> {
    RefCell::new(Vec::new())
}

/// Captures the outcome of the load.
#[fixture]
pub fn load_result() -> LoadResult {
    RefCell::new(None)
}

fn centers(load_result: &LoadResult) -> Vec<PopulationCenter> {
    let binding = load_result.borrow();
    match binding.as_ref() {
        Some(Ok(centers)) => centers.clone(),
        Some(Err(err)) => panic!("loading should succeed, got {err}"),
        None => panic!("load result must be recorded"),
    }
}

fn error(load_result: &LoadResult, check: impl FnOnce(&PopulationTableError)) {
    let binding = load_result.borrow();
    match binding.as_ref() {
        Some(Err(err)) => check(err),
        Some(Ok(_)) => panic!("loading should fail"),
        None => panic!("load result must be recorded"),
    }
}

#[given("a population table with header \"Lat,Long,Population,County\"")]
fn census_header(lines: &RefCell<Vec<String>>) {
    lines.borrow_mut().push("Lat,Long,Population,County".to_owned());
}

#[given("a population table with header \"lat,lon,households\"")]
fn household_header(lines: &RefCell<Vec<String>>) {
    lines.borrow_mut().push("lat,lon,households".to_owned());
}

#[given("a population table with header \"x,y,pop\"")]
fn short_header(lines: &RefCell<Vec<String>>) {
    lines.borrow_mut().push("x,y,pop".to_owned());
}

#[given("a row \"40.1,-88.2,1200,Champaign\"")]
fn census_row(lines: &RefCell<Vec<String>>) {
    lines.borrow_mut().push("40.1,-88.2,1200,Champaign".to_owned());
}

#[given("a row \"40.1,-88.2,400\"")]
fn household_row(lines: &RefCell<Vec<String>>) {
    lines.borrow_mut().push("40.1,-88.2,400".to_owned());
}

#[given("a row \"-88.2,40.1,10\"")]
fn positive_row(lines: &RefCell<Vec<String>>) {
    lines.borrow_mut().push("-88.2,40.1,10".to_owned());
}

#[given("a row \"-88.3,40.2,-3\"")]
fn negative_row(lines: &RefCell<Vec<String>>) {
    lines.borrow_mut().push("-88.3,40.2,-3".to_owned());
}

#[when("I load the population table")]
fn load(lines: &RefCell<Vec<String>>, load_result: &LoadResult) {
    let dir = TempDir::new().expect("tempdir");
    let path = Utf8PathBuf::from_path_buf(dir.path().join("centers.csv")).expect("utf8 path");
    let mut contents = lines.borrow().join("\n");
    contents.push('\n');
    fs::write(&path, contents).expect("write table");
    *load_result.borrow_mut() = Some(load_population_table(&path));
}

#[then("1 population center is loaded")]
fn one_center(load_result: &LoadResult) {
    assert_eq!(centers(load_result).len(), 1);
}

#[then("the first center is at longitude -88.2 and latitude 40.1 with 1200 people")]
fn first_center(load_result: &LoadResult) {
    let loaded = centers(load_result);
    let Some(first) = loaded.first() else {
        panic!("a center should be loaded")
    };
    assert_eq!(first.location, Coord { x: -88.2, y: 40.1 });
    assert_eq!(first.population, 1200.0);
}

#[then("loading fails because the population column is missing")]
fn missing_population(load_result: &LoadResult) {
    error(load_result, |err| {
        assert!(
            matches!(err, PopulationTableError::MissingColumn { column: "population" }),
            "unexpected error {err:?}"
        );
    });
}

#[then("loading fails on row 2 because the population is negative")]
fn negative_population(load_result: &LoadResult) {
    error(load_result, |err| {
        assert!(
            matches!(err, PopulationTableError::NegativePopulation { row: 2, .. }),
            "unexpected error {err:?}"
        );
    });
}

#[scenario(path = "tests/features/population_table.feature", index = 0)]
fn census_headers_recognised(lines: RefCell<Vec<String>>, load_result: LoadResult) {
    let _ = (lines, load_result);
}

#[scenario(path = "tests/features/population_table.feature", index = 1)]
fn missing_population_column(lines: RefCell<Vec<String>>, load_result: LoadResult) {
    let _ = (lines, load_result);
}

#[scenario(path = "tests/features/population_table.feature", index = 2)]
fn negative_population_rejected(lines: RefCell<Vec<String>>, load_result: LoadResult) {
    let _ = (lines, load_result);
}
