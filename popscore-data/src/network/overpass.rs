//! Road networks fetched live from Nominatim and Overpass.
//!
//! The [`RoadNetworkSource`] trait is synchronous so the scoring pipeline
//! stays free of async plumbing. This source bridges to `reqwest` by blocking
//! on a Tokio runtime it owns, or on the caller's multi-threaded runtime when
//! one is already running.

use std::time::Duration;

use log::info;
use popscore_core::RoadNode;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::accumulator::NetworkAccumulator;
use super::overpass_types::{NominatimPlace, OverpassElement, OverpassResponse};
use super::{
    NetworkRequest, NetworkSourceError, NetworkType, RoadNetworkSource, SourceBuildError,
};

/// Default user agent; Nominatim rejects anonymous clients.
pub const DEFAULT_USER_AGENT: &str = "popscore/0.1";
/// Public Overpass API endpoint.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api";
/// Public Nominatim endpoint.
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Configuration for [`OverpassNetworkSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverpassSourceConfig {
    /// Base URL of the Overpass API (the `interpreter` endpoint is appended).
    pub overpass_url: String,
    /// Base URL of the Nominatim service.
    pub nominatim_url: String,
    /// Timeout applied to each request and passed to Overpass as `[timeout:]`.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for OverpassSourceConfig {
    fn default() -> Self {
        Self {
            overpass_url: DEFAULT_OVERPASS_URL.to_owned(),
            nominatim_url: DEFAULT_NOMINATIM_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OverpassSourceConfig {
    /// Set the Overpass API base URL.
    #[must_use]
    pub fn with_overpass_url(mut self, url: impl Into<String>) -> Self {
        self.overpass_url = url.into();
        self
    }

    /// Set the Nominatim base URL.
    #[must_use]
    pub fn with_nominatim_url(mut self, url: impl Into<String>) -> Self {
        self.nominatim_url = url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Network source that resolves a place name and queries Overpass.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime, or inside a `current_thread` runtime, requests
/// run on the source's own runtime. Inside a multi-threaded runtime the
/// source uses [`tokio::task::block_in_place`] on the caller's handle.
pub struct OverpassNetworkSource {
    client: Client,
    config: OverpassSourceConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for OverpassNetworkSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverpassNetworkSource")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl OverpassNetworkSource {
    /// Create a source talking to the public endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new() -> Result<Self, SourceBuildError> {
        Self::with_config(OverpassSourceConfig::default())
    }

    /// Create a source with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: OverpassSourceConfig) -> Result<Self, SourceBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(SourceBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(SourceBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &OverpassSourceConfig {
        &self.config
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.config.nominatim_url.trim_end_matches('/'))
    }

    fn interpreter_url(&self) -> String {
        format!(
            "{}/interpreter",
            self.config.overpass_url.trim_end_matches('/')
        )
    }

    /// Build the Overpass QL query selecting the network inside `area_id`.
    fn build_query(&self, area_id: u64, network_type: NetworkType) -> String {
        format!(
            "[out:json][timeout:{timeout}];\
             area({area_id})->.searchArea;\
             way{clauses}(area.searchArea);\
             (._;>;);\
             out;",
            timeout = self.config.timeout.as_secs(),
            clauses = network_type.filter().overpass_clauses(),
        )
    }

    async fn search_places(&self, place: &str) -> Result<Vec<NominatimPlace>, NetworkSourceError> {
        let url = self.search_url();
        let response = self
            .client
            .get(&url)
            .query(&[("q", place), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        decode_json(response, &url).await
    }

    async fn fetch_elements(&self, query: String) -> Result<OverpassResponse, NetworkSourceError> {
        let url = self.interpreter_url();
        let response = self
            .client
            .post(&url)
            .form(&[("data", query)])
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        decode_json(response, &url).await
    }

    async fn load_async(&self, request: &NetworkRequest) -> Result<Vec<RoadNode>, NetworkSourceError> {
        let hits = self.search_places(&request.place).await?;
        let (place, area_id) = resolve_area(&request.place, hits)?;
        info!(
            "Resolved {:?} to {} ({} {}), area {area_id}",
            request.place, place.display_name, place.osm_type, place.osm_id
        );
        let query = self.build_query(area_id, request.network_type);
        let response = self.fetch_elements(query).await?;
        let elements = accept_response(response, &self.interpreter_url())?;
        collect_nodes(elements, request)
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> NetworkSourceError {
        RequestFailure::from_reqwest(error).into_error(url, self.config.timeout.as_secs())
    }
}

impl RoadNetworkSource for OverpassNetworkSource {
    fn load_nodes(&self, request: &NetworkRequest) -> Result<Vec<RoadNode>, NetworkSourceError> {
        let future = self.load_async(request);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

/// How a request failed, separated from the `reqwest` error that reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RequestFailure {
    timed_out: bool,
    status: Option<u16>,
    message: String,
}

impl RequestFailure {
    fn from_reqwest(error: &reqwest::Error) -> Self {
        Self {
            timed_out: error.is_timeout(),
            status: error.status().map(|status| status.as_u16()),
            message: error.to_string(),
        }
    }

    /// A timeout wins over a status, and a status over a transport failure.
    fn into_error(self, url: &str, timeout_secs: u64) -> NetworkSourceError {
        if self.timed_out {
            return NetworkSourceError::Timeout {
                url: url.to_owned(),
                timeout_secs,
            };
        }

        if let Some(status) = self.status {
            return NetworkSourceError::Http {
                url: url.to_owned(),
                status,
                message: self.message,
            };
        }

        NetworkSourceError::Network {
            url: url.to_owned(),
            message: self.message,
        }
    }
}

/// Pick the Overpass area for the first Nominatim hit.
fn resolve_area(
    place: &str,
    hits: Vec<NominatimPlace>,
) -> Result<(NominatimPlace, u64), NetworkSourceError> {
    let hit = hits
        .into_iter()
        .next()
        .ok_or_else(|| NetworkSourceError::PlaceNotFound {
            place: place.to_owned(),
        })?;
    match hit.area_id() {
        Some(area_id) => Ok((hit, area_id)),
        None => Err(NetworkSourceError::UnsupportedPlace {
            place: place.to_owned(),
            osm_type: hit.osm_type,
        }),
    }
}

/// Elements of a completed query.
///
/// Overpass only sets `remark` when the query failed, so a response carrying
/// one is rejected even if it also holds elements.
fn accept_response(
    response: OverpassResponse,
    url: &str,
) -> Result<Vec<OverpassElement>, NetworkSourceError> {
    match response.remark {
        Some(remark) => Err(NetworkSourceError::Remote {
            url: url.to_owned(),
            remark,
        }),
        None => Ok(response.elements),
    }
}

async fn decode_json<T: DeserializeOwned>(
    response: reqwest::Response,
    url: &str,
) -> Result<T, NetworkSourceError> {
    response
        .json()
        .await
        .map_err(|err| NetworkSourceError::Parse {
            url: url.to_owned(),
            message: err.to_string(),
        })
}

/// Feed Overpass elements through the accumulator.
///
/// Ways are processed before nodes regardless of response order, because a
/// node is only kept when a filtered way references it.
fn collect_nodes(
    elements: Vec<OverpassElement>,
    request: &NetworkRequest,
) -> Result<Vec<RoadNode>, NetworkSourceError> {
    let filter = request.network_type.filter();
    let mut accumulator = NetworkAccumulator::default();
    let mut located = Vec::new();
    for element in elements {
        match element {
            OverpassElement::Way { id, nodes, tags } => accumulator.process_way(
                id,
                nodes,
                tags.iter().map(|(key, value)| (key.as_str(), value.as_str())),
                &filter,
            ),
            OverpassElement::Node { id, lat, lon } => located.push((id, lon, lat)),
            OverpassElement::Other => {}
        }
    }

    let wanted = accumulator.referenced_nodes();
    for (id, lon, lat) in located {
        accumulator.resolve_node(id, lon, lat, &wanted);
    }

    let outcome = accumulator.into_nodes(request.simplify, None);
    info!(
        "Received {} of {} ways for {:?} as {} road nodes",
        outcome.ways_kept,
        outcome.ways_seen,
        request.place,
        outcome.nodes.len()
    );
    if outcome.nodes.is_empty() {
        return Err(NetworkSourceError::EmptyNetwork {
            place: request.place.clone(),
        });
    }
    Ok(outcome.nodes)
}
