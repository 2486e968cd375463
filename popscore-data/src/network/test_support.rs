//! Test utilities for network sources.
//!
//! [`StubNetworkSource`] returns pre-configured nodes or errors without
//! touching the filesystem or the network.

use popscore_core::RoadNode;

use super::{NetworkRequest, NetworkSourceError, RoadNetworkSource};

/// Stub `RoadNetworkSource` for testing.
///
/// # Example
///
/// ```
/// use geo::Coord;
/// use popscore_core::RoadNode;
/// use popscore_data::network::test_support::StubNetworkSource;
/// use popscore_data::network::{NetworkRequest, RoadNetworkSource};
///
/// let source = StubNetworkSource::with_nodes(vec![
///     RoadNode::new(2, Coord { x: 1.0, y: 0.0 }),
///     RoadNode::new(1, Coord { x: 0.0, y: 0.0 }),
/// ]);
/// let nodes = source.load_nodes(&NetworkRequest::new("Anywhere")).expect("nodes");
/// assert_eq!(nodes[0].id, 1);
/// ```
#[derive(Debug, Clone)]
pub struct StubNetworkSource {
    response: StubResponse,
}

#[derive(Debug, Clone)]
enum StubResponse {
    Nodes(Vec<RoadNode>),
    Error(fn(&NetworkRequest) -> NetworkSourceError),
}

impl StubNetworkSource {
    /// Create a source that returns `nodes`, sorted by id.
    ///
    /// An empty list yields [`NetworkSourceError::EmptyNetwork`], matching the
    /// real sources.
    #[must_use]
    pub fn with_nodes(mut nodes: Vec<RoadNode>) -> Self {
        nodes.sort_by_key(|node| node.id);
        Self {
            response: StubResponse::Nodes(nodes),
        }
    }

    /// Create a source that fails with the error built by `make_error`.
    #[must_use]
    pub fn with_error(make_error: fn(&NetworkRequest) -> NetworkSourceError) -> Self {
        Self {
            response: StubResponse::Error(make_error),
        }
    }
}

impl RoadNetworkSource for StubNetworkSource {
    fn load_nodes(&self, request: &NetworkRequest) -> Result<Vec<RoadNode>, NetworkSourceError> {
        match &self.response {
            StubResponse::Nodes(nodes) if nodes.is_empty() => {
                Err(NetworkSourceError::EmptyNetwork {
                    place: request.place.clone(),
                })
            }
            StubResponse::Nodes(nodes) => Ok(nodes.clone()),
            StubResponse::Error(make_error) => Err(make_error(request)),
        }
    }
}
