//! Highway tag filters selecting the ways that make up a road network.
//!
//! Each [`NetworkType`] maps to a [`WayFilter`]. The same filter is evaluated
//! against PBF way tags and rendered into Overpass QL, so offline extracts and
//! live queries select identical ways.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const HIGHWAY: &str = "highway";

/// Kind of road network to extract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    /// Public drivable streets, excluding service roads.
    Drive,
    /// Drivable streets including service roads.
    #[default]
    DriveService,
    /// Streets and paths usable by pedestrians.
    Walk,
    /// Streets and paths usable by cyclists.
    Bike,
    /// Every non-private highway.
    All,
}

const DRIVE_EXCLUSIONS: &[(&str, &[&str])] = &[
    ("area", &["yes"]),
    (
        HIGHWAY,
        &[
            "abandoned",
            "bridleway",
            "bus_guideway",
            "construction",
            "corridor",
            "cycleway",
            "elevator",
            "escalator",
            "footway",
            "no",
            "path",
            "pedestrian",
            "planned",
            "platform",
            "proposed",
            "raceway",
            "razed",
            "service",
            "steps",
            "track",
        ],
    ),
    ("motor_vehicle", &["no"]),
    ("motorcar", &["no"]),
    ("access", &["private"]),
    (
        "service",
        &[
            "alley",
            "driveway",
            "emergency_access",
            "parking",
            "parking_aisle",
            "private",
        ],
    ),
];

const DRIVE_SERVICE_EXCLUSIONS: &[(&str, &[&str])] = &[
    ("area", &["yes"]),
    (
        HIGHWAY,
        &[
            "abandoned",
            "bridleway",
            "bus_guideway",
            "construction",
            "corridor",
            "cycleway",
            "elevator",
            "escalator",
            "footway",
            "no",
            "path",
            "pedestrian",
            "planned",
            "platform",
            "proposed",
            "raceway",
            "razed",
            "steps",
            "track",
        ],
    ),
    ("motor_vehicle", &["no"]),
    ("motorcar", &["no"]),
    ("access", &["private"]),
    (
        "service",
        &["emergency_access", "parking", "parking_aisle", "private"],
    ),
];

const WALK_EXCLUSIONS: &[(&str, &[&str])] = &[
    ("area", &["yes"]),
    (
        HIGHWAY,
        &[
            "abandoned",
            "bus_guideway",
            "construction",
            "cycleway",
            "motor",
            "no",
            "planned",
            "platform",
            "proposed",
            "raceway",
            "razed",
        ],
    ),
    ("foot", &["no"]),
    ("access", &["private"]),
    ("service", &["private"]),
];

const BIKE_EXCLUSIONS: &[(&str, &[&str])] = &[
    ("area", &["yes"]),
    (
        HIGHWAY,
        &[
            "abandoned",
            "bus_guideway",
            "construction",
            "corridor",
            "elevator",
            "escalator",
            "footway",
            "motor",
            "no",
            "planned",
            "platform",
            "proposed",
            "raceway",
            "razed",
            "steps",
        ],
    ),
    ("bicycle", &["no"]),
    ("access", &["private"]),
    ("service", &["private"]),
];

const ALL_EXCLUSIONS: &[(&str, &[&str])] = &[
    ("area", &["yes"]),
    (
        HIGHWAY,
        &[
            "abandoned",
            "construction",
            "no",
            "planned",
            "platform",
            "proposed",
            "raceway",
            "razed",
        ],
    ),
    ("access", &["private"]),
    ("service", &["private"]),
];

impl NetworkType {
    /// Every supported network type.
    pub const ALL: [Self; 5] = [
        Self::Drive,
        Self::DriveService,
        Self::Walk,
        Self::Bike,
        Self::All,
    ];

    /// Return the way filter for this network type.
    #[must_use]
    pub const fn filter(self) -> WayFilter {
        let exclusions = match self {
            Self::Drive => DRIVE_EXCLUSIONS,
            Self::DriveService => DRIVE_SERVICE_EXCLUSIONS,
            Self::Walk => WALK_EXCLUSIONS,
            Self::Bike => BIKE_EXCLUSIONS,
            Self::All => ALL_EXCLUSIONS,
        };
        WayFilter { exclusions }
    }

    /// Return the identifier accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drive => "drive",
            Self::DriveService => "drive_service",
            Self::Walk => "walk",
            Self::Bike => "bike",
            Self::All => "all",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown network type name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown network type {name:?} (expected drive, drive_service, walk, bike or all)")]
pub struct ParseNetworkTypeError {
    /// The rejected input.
    pub name: String,
}

impl FromStr for NetworkType {
    type Err = ParseNetworkTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalised)
            .ok_or_else(|| ParseNetworkTypeError {
                name: value.to_owned(),
            })
    }
}

/// Tag predicate selecting highway ways.
///
/// A way passes when it carries a `highway` tag and none of its tags holds an
/// excluded value. Absent keys never exclude a way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WayFilter {
    exclusions: &'static [(&'static str, &'static [&'static str])],
}

impl WayFilter {
    /// Report whether a way with `tags` belongs to the network.
    pub fn accepts<'a, T>(&self, tags: T) -> bool
    where
        T: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut has_highway = false;
        for (key, value) in tags {
            if key == HIGHWAY {
                has_highway = true;
            }
            if self.excludes(key, value) {
                return false;
            }
        }
        has_highway
    }

    fn excludes(&self, key: &str, value: &str) -> bool {
        self.exclusions
            .iter()
            .any(|(excluded_key, values)| *excluded_key == key && values.contains(&value))
    }

    /// Render the filter as Overpass QL tag clauses.
    ///
    /// Values are anchored so the query matches exactly what
    /// [`WayFilter::accepts`] matches.
    #[must_use]
    pub fn overpass_clauses(&self) -> String {
        let mut clauses = format!("[\"{HIGHWAY}\"]");
        for (key, values) in self.exclusions {
            clauses.push_str(&format!("[\"{key}\"!~\"^({})$\"]", values.join("|")));
        }
        clauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(NetworkType::Drive, "residential", true)]
    #[case(NetworkType::Drive, "service", false)]
    #[case(NetworkType::DriveService, "service", true)]
    #[case(NetworkType::DriveService, "footway", false)]
    #[case(NetworkType::Walk, "footway", true)]
    #[case(NetworkType::Walk, "cycleway", false)]
    #[case(NetworkType::Bike, "cycleway", true)]
    #[case(NetworkType::All, "track", true)]
    #[case(NetworkType::All, "proposed", false)]
    fn highway_values_follow_network_type(
        #[case] network: NetworkType,
        #[case] highway: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(network.filter().accepts([("highway", highway)]), expected);
    }

    #[rstest]
    fn ways_without_highway_are_rejected() {
        let filter = NetworkType::All.filter();
        assert!(!filter.accepts([("railway", "rail")]));
    }

    #[rstest]
    #[case(&[("highway", "service"), ("service", "parking_aisle")], false)]
    #[case(&[("highway", "service"), ("service", "alley")], true)]
    #[case(&[("highway", "primary"), ("access", "private")], false)]
    #[case(&[("highway", "primary"), ("motorcar", "no")], false)]
    #[case(&[("highway", "primary"), ("area", "yes")], false)]
    #[case(&[("highway", "primary"), ("access", "permissive")], true)]
    fn drive_service_honours_secondary_tags(
        #[case] tags: &[(&str, &str)],
        #[case] expected: bool,
    ) {
        let filter = NetworkType::DriveService.filter();
        assert_eq!(filter.accepts(tags.iter().copied()), expected);
    }

    #[rstest]
    fn overpass_clauses_are_anchored() {
        let clauses = NetworkType::Walk.filter().overpass_clauses();
        assert!(clauses.starts_with("[\"highway\"]"));
        assert!(clauses.contains("[\"foot\"!~\"^(no)$\"]"));
        assert!(clauses.contains("[\"service\"!~\"^(private)$\"]"));
    }

    #[rstest]
    #[case("drive", NetworkType::Drive)]
    #[case("drive_service", NetworkType::DriveService)]
    #[case("Drive-Service", NetworkType::DriveService)]
    #[case(" walk ", NetworkType::Walk)]
    fn parses_network_names(#[case] input: &str, #[case] expected: NetworkType) {
        assert_eq!(input.parse::<NetworkType>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_network_names() {
        let err = "boat".parse::<NetworkType>().expect_err("unknown network");
        assert_eq!(err.name, "boat");
    }

    #[rstest]
    fn display_round_trips_through_from_str() {
        for kind in NetworkType::ALL {
            assert_eq!(kind.to_string().parse::<NetworkType>(), Ok(kind));
        }
    }
}
