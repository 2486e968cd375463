//! Response types for the Nominatim search and Overpass interpreter APIs.
//!
//! See: <https://nominatim.org/release-docs/latest/api/Search/> and
//! <https://wiki.openstreetmap.org/wiki/Overpass_API/Overpass_QL>.

use std::collections::HashMap;

use serde::Deserialize;

/// Offset Overpass adds to relation ids to form area ids.
const RELATION_AREA_OFFSET: u64 = 3_600_000_000;
/// Offset Overpass adds to way ids to form area ids.
const WAY_AREA_OFFSET: u64 = 2_400_000_000;

/// One Nominatim search hit in `jsonv2` format.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NominatimPlace {
    /// `node`, `way` or `relation`.
    pub osm_type: String,
    /// Identifier of the OSM element.
    pub osm_id: u64,
    /// Human-readable name of the match.
    #[serde(default)]
    pub display_name: String,
}

impl NominatimPlace {
    /// Overpass area id for the matched element.
    ///
    /// Only closed ways and relations bound an area; nodes yield `None`.
    #[must_use]
    pub fn area_id(&self) -> Option<u64> {
        let offset = match self.osm_type.as_str() {
            "relation" => RELATION_AREA_OFFSET,
            "way" => WAY_AREA_OFFSET,
            _ => return None,
        };
        self.osm_id.checked_add(offset)
    }
}

/// Body of an Overpass `[out:json]` response.
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    /// Returned elements in server order.
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
    /// Server-side error text, present when a query timed out or failed.
    #[serde(default)]
    pub remark: Option<String>,
}

/// An element of an Overpass response.
#[derive(Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverpassElement {
    /// A node with coordinates.
    Node {
        /// OSM node id.
        id: i64,
        /// Latitude in degrees.
        lat: f64,
        /// Longitude in degrees.
        lon: f64,
    },
    /// A way listing its node references.
    Way {
        /// OSM way id.
        id: i64,
        /// Ordered node references.
        #[serde(default)]
        nodes: Vec<i64>,
        /// Way tags.
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    /// Relations, areas and anything else the query did not ask for.
    #[serde(other)]
    Other,
}
