//! Road network sources.
//!
//! A [`RoadNetworkSource`] turns a place query and a [`NetworkType`] into the
//! nodes of the matching street network. Two sources are provided:
//!
//! - [`PbfNetworkSource`] reads an OpenStreetMap PBF extract from disk,
//!   optionally clipped to a bounding box.
//! - [`OverpassNetworkSource`] geocodes the place with Nominatim and fetches
//!   the ways inside its boundary from an Overpass API endpoint.
//!
//! Only node identifiers and coordinates are produced. Edges, projections and
//! areas are not needed to score nodes and are never materialised.

mod accumulator;
mod error;
mod filter;
mod overpass;
mod overpass_types;
mod pbf;

#[doc(hidden)]
pub mod test_support;

use popscore_core::RoadNode;

pub use error::{NetworkSourceError, SourceBuildError};
pub use filter::{NetworkType, ParseNetworkTypeError, WayFilter};
pub use overpass::{
    DEFAULT_NOMINATIM_URL, DEFAULT_OVERPASS_URL, DEFAULT_USER_AGENT, OverpassNetworkSource,
    OverpassSourceConfig,
};
pub use pbf::PbfNetworkSource;

/// Describes the network to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRequest {
    /// Place query, e.g. `"Champaign, Illinois, USA"`.
    pub place: String,
    /// Which ways count as part of the network.
    pub network_type: NetworkType,
    /// Keep only way endpoints and junctions.
    pub simplify: bool,
}

impl NetworkRequest {
    /// Request the simplified `drive_service` network for `place`.
    #[must_use]
    pub fn new(place: impl Into<String>) -> Self {
        Self {
            place: place.into(),
            network_type: NetworkType::default(),
            simplify: true,
        }
    }

    /// Set the network type.
    #[must_use]
    pub fn with_network_type(mut self, network_type: NetworkType) -> Self {
        self.network_type = network_type;
        self
    }

    /// Enable or disable topology simplification.
    #[must_use]
    pub fn with_simplify(mut self, simplify: bool) -> Self {
        self.simplify = simplify;
        self
    }
}

/// Load the nodes of a road network.
///
/// Implementations return nodes sorted by id, each id at most once, and fail
/// with [`NetworkSourceError::EmptyNetwork`] rather than returning an empty
/// vector.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use popscore_core::RoadNode;
/// use popscore_data::network::{NetworkRequest, NetworkSourceError, RoadNetworkSource};
///
/// struct FixedSource;
///
/// impl RoadNetworkSource for FixedSource {
///     fn load_nodes(&self, _request: &NetworkRequest) -> Result<Vec<RoadNode>, NetworkSourceError> {
///         Ok(vec![RoadNode::new(1, Coord { x: 0.0, y: 0.0 })])
///     }
/// }
///
/// let nodes = FixedSource.load_nodes(&NetworkRequest::new("Anywhere"))?;
/// assert_eq!(nodes.len(), 1);
/// # Ok::<(), NetworkSourceError>(())
/// ```
pub trait RoadNetworkSource {
    /// Return the nodes of the network described by `request`.
    fn load_nodes(&self, request: &NetworkRequest) -> Result<Vec<RoadNode>, NetworkSourceError>;
}
