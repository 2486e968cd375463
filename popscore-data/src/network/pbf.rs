//! Road networks read from OpenStreetMap PBF extracts.
use std::path::{Path, PathBuf};

use geo::Rect;
use log::info;
use osmpbf::{Element, ElementReader};
use popscore_core::RoadNode;

use super::accumulator::NetworkAccumulator;
use super::{NetworkRequest, NetworkSourceError, RoadNetworkSource};

/// Offline network source backed by an `.osm.pbf` extract.
///
/// The extract is expected to cover the requested place; the place string is
/// only used in diagnostics. Pass [`PbfNetworkSource::with_bounds`] to clip a
/// larger extract.
///
/// # Examples
/// ```no_run
/// use popscore_data::network::{NetworkRequest, PbfNetworkSource, RoadNetworkSource};
///
/// let source = PbfNetworkSource::new("champaign.osm.pbf");
/// let nodes = source.load_nodes(&NetworkRequest::new("Champaign, Illinois, USA"))?;
/// println!("Loaded {} road nodes", nodes.len());
/// # Ok::<(), popscore_data::network::NetworkSourceError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PbfNetworkSource {
    path: PathBuf,
    bounds: Option<Rect<f64>>,
}

impl PbfNetworkSource {
    /// Read the network from the extract at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            bounds: None,
        }
    }

    /// Drop nodes outside `bounds` (`x = longitude`, `y = latitude`).
    #[must_use]
    pub fn with_bounds(mut self, bounds: Rect<f64>) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Path of the extract.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<ElementReader<std::io::BufReader<std::fs::File>>, NetworkSourceError> {
        ElementReader::from_path(&self.path).map_err(|source| NetworkSourceError::Open {
            source,
            path: self.path.clone(),
        })
    }

    fn decode_error(&self, source: osmpbf::Error) -> NetworkSourceError {
        NetworkSourceError::Decode {
            source,
            path: self.path.clone(),
        }
    }
}

impl RoadNetworkSource for PbfNetworkSource {
    fn load_nodes(&self, request: &NetworkRequest) -> Result<Vec<RoadNode>, NetworkSourceError> {
        let filter = request.network_type.filter();
        let mut accumulator = self
            .open()?
            .par_map_reduce(
                |element| {
                    let mut partial = NetworkAccumulator::default();
                    if let Element::Way(way) = element {
                        partial.process_way(way.id(), way.refs(), way.tags(), &filter);
                    }
                    partial
                },
                NetworkAccumulator::default,
                NetworkAccumulator::combine,
            )
            .map_err(|source| self.decode_error(source))?;

        if !accumulator.has_ways() {
            return Err(NetworkSourceError::EmptyNetwork {
                place: request.place.clone(),
            });
        }

        let wanted = accumulator.referenced_nodes();
        {
            let accumulator_ref = &mut accumulator;
            self.open()?
                .for_each(|element| match element {
                    Element::Node(node) => {
                        accumulator_ref.resolve_node(node.id(), node.lon(), node.lat(), &wanted);
                    }
                    Element::DenseNode(node) => {
                        accumulator_ref.resolve_node(node.id(), node.lon(), node.lat(), &wanted);
                    }
                    Element::Way(_) | Element::Relation(_) => {}
                })
                .map_err(|source| self.decode_error(source))?;
        }

        let outcome = accumulator.into_nodes(request.simplify, self.bounds);
        info!(
            "Read {} of {} ways from {:?} as {} road nodes ({} unresolved, {} outside bounds)",
            outcome.ways_kept,
            outcome.ways_seen,
            self.path,
            outcome.nodes.len(),
            outcome.unresolved,
            outcome.outside_bounds
        );
        if outcome.nodes.is_empty() {
            return Err(NetworkSourceError::EmptyNetwork {
                place: request.place.clone(),
            });
        }
        Ok(outcome.nodes)
    }
}
