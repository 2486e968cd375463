use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a road network.
#[derive(Debug, Error)]
pub enum NetworkSourceError {
    /// The OSM PBF extract could not be opened.
    #[error("failed to open OSM PBF file at {path:?}")]
    Open {
        #[source]
        source: osmpbf::Error,
        path: PathBuf,
    },
    /// The OSM PBF extract could not be decoded.
    #[error("failed to decode OSM PBF data at {path:?}")]
    Decode {
        #[source]
        source: osmpbf::Error,
        path: PathBuf,
    },
    /// The place query matched nothing usable as an area.
    #[error("no area found for place {place:?}")]
    PlaceNotFound { place: String },
    /// The place query matched an OSM element that cannot bound an area.
    #[error("place {place:?} resolved to an OSM {osm_type}, which cannot bound an area")]
    UnsupportedPlace { place: String, osm_type: String },
    /// A request exceeded the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },
    /// The service answered with a non-success status.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    Http {
        url: String,
        status: u16,
        message: String,
    },
    /// The request failed before a response arrived.
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
    /// A response body could not be decoded.
    #[error("failed to parse response from {url}: {message}")]
    Parse { url: String, message: String },
    /// Overpass flagged the query as failed; any elements it sent are partial.
    #[error("query to {url} failed: {remark}")]
    Remote { url: String, remark: String },
    /// No road node survived filtering.
    #[error("no road nodes found for {place:?}")]
    EmptyNetwork { place: String },
}

/// Errors raised while constructing an HTTP network source.
#[derive(Debug, Error)]
pub enum SourceBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
