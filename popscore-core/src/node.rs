//! Inputs to the population score: road network nodes and population
//! centers.

use geo::Coord;

/// A node of the road network graph.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. The
/// identifier is the OpenStreetMap node id and must be unique within one
/// scoring run.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use popscore_core::RoadNode;
///
/// let node = RoadNode::new(42, Coord { x: -88.24, y: 40.11 });
/// assert_eq!(node.id, 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadNode {
    /// Unique node identifier.
    pub id: u64,
    /// Node position.
    pub location: Coord<f64>,
}

impl RoadNode {
    /// Construct a node at `location`.
    #[must_use]
    pub const fn new(id: u64, location: Coord<f64>) -> Self {
        Self { id, location }
    }
}

/// A reference point carrying a population count, such as a census tract
/// centroid.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use popscore_core::PopulationCenter;
///
/// let tract = PopulationCenter::new(Coord { x: -88.2, y: 40.1 }, 4_250.0);
/// assert!(tract.population > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PopulationCenter {
    /// Center position (`x = longitude`, `y = latitude`).
    pub location: Coord<f64>,
    /// Number of people attributed to the center. Must be non-negative.
    pub population: f64,
}

impl PopulationCenter {
    /// Construct a population center.
    #[must_use]
    pub const fn new(location: Coord<f64>, population: f64) -> Self {
        Self {
            location,
            population,
        }
    }
}
