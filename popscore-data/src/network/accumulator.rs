//! Collects filtered ways and their node coordinates into road nodes.
//!
//! Both network sources feed the accumulator: ways first (selected through a
//! [`WayFilter`]), then the coordinates of the nodes those ways reference.
//! [`NetworkAccumulator::into_nodes`] applies topology simplification and the
//! optional bounding box.
use std::collections::{HashMap, HashSet};

use geo::{Coord, Rect};
use log::warn;
use popscore_core::RoadNode;

use super::filter::WayFilter;

/// Ways and node locations gathered from an OSM source.
#[derive(Debug, Default)]
pub(crate) struct NetworkAccumulator {
    ways: Vec<Vec<u64>>,
    locations: HashMap<u64, Coord<f64>>,
    ways_seen: u64,
    skipped_ids: u64,
    invalid_locations: u64,
}

/// Road nodes plus counters describing what was discarded.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NetworkOutcome {
    pub(crate) nodes: Vec<RoadNode>,
    pub(crate) ways_seen: u64,
    pub(crate) ways_kept: usize,
    pub(crate) unresolved: usize,
    pub(crate) outside_bounds: usize,
}

impl NetworkAccumulator {
    /// Record a way when its tags pass `filter`.
    pub(crate) fn process_way<'a, R, T>(&mut self, raw_id: i64, refs: R, tags: T, filter: &WayFilter)
    where
        R: IntoIterator<Item = i64>,
        T: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.ways_seen += 1;
        if !filter.accepts(tags) {
            return;
        }
        if raw_id < 0 {
            self.skipped_ids += 1;
            return;
        }
        let node_refs: Vec<u64> = refs
            .into_iter()
            .filter_map(|raw| match u64::try_from(raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    self.skipped_ids += 1;
                    None
                }
            })
            .collect();
        if node_refs.len() >= 2 {
            self.ways.push(node_refs);
        }
    }

    /// Record a node location when a kept way references it.
    pub(crate) fn resolve_node(&mut self, raw_id: i64, lon: f64, lat: f64, wanted: &HashSet<u64>) {
        let Ok(id) = u64::try_from(raw_id) else {
            return;
        };
        if !wanted.contains(&id) {
            return;
        }
        match validated_coord(lon, lat) {
            Some(location) => {
                self.locations.insert(id, location);
            }
            None => self.invalid_locations += 1,
        }
    }

    /// Return the set of node ids referenced by kept ways.
    pub(crate) fn referenced_nodes(&self) -> HashSet<u64> {
        self.ways.iter().flatten().copied().collect()
    }

    pub(crate) fn has_ways(&self) -> bool {
        !self.ways.is_empty()
    }

    pub(crate) fn combine(mut self, other: Self) -> Self {
        self.ways.extend(other.ways);
        for (id, location) in other.locations {
            self.locations.entry(id).or_insert(location);
        }
        self.ways_seen += other.ways_seen;
        self.skipped_ids += other.skipped_ids;
        self.invalid_locations += other.invalid_locations;
        self
    }

    /// Turn the collected ways into road nodes sorted by id.
    ///
    /// With `simplify`, only way endpoints and nodes referenced more than
    /// once (junctions and loop closures) are kept.
    pub(crate) fn into_nodes(self, simplify: bool, bounds: Option<Rect<f64>>) -> NetworkOutcome {
        if self.skipped_ids > 0 {
            warn!(
                "Skipped {} OSM references with negative identifiers",
                self.skipped_ids
            );
        }
        if self.invalid_locations > 0 {
            warn!(
                "Skipped {} nodes with invalid coordinates",
                self.invalid_locations
            );
        }

        let selected = if simplify {
            topological_nodes(&self.ways)
        } else {
            self.referenced_nodes()
        };

        let mut nodes = Vec::with_capacity(selected.len());
        let mut unresolved = 0_usize;
        let mut outside_bounds = 0_usize;
        for id in selected {
            let Some(location) = self.locations.get(&id).copied() else {
                unresolved += 1;
                continue;
            };
            if bounds.is_some_and(|rect| !contains(rect, location)) {
                outside_bounds += 1;
                continue;
            }
            nodes.push(RoadNode::new(id, location));
        }
        nodes.sort_by_key(|node| node.id);

        if unresolved > 0 {
            warn!("Skipped {unresolved} way node references without coordinates");
        }

        NetworkOutcome {
            nodes,
            ways_seen: self.ways_seen,
            ways_kept: self.ways.len(),
            unresolved,
            outside_bounds,
        }
    }
}

fn topological_nodes(ways: &[Vec<u64>]) -> HashSet<u64> {
    let mut reference_counts: HashMap<u64, usize> = HashMap::new();
    let mut selected = HashSet::new();
    for refs in ways {
        if let (Some(first), Some(last)) = (refs.first(), refs.last()) {
            selected.insert(*first);
            selected.insert(*last);
        }
        for id in refs {
            *reference_counts.entry(*id).or_default() += 1;
        }
    }
    selected.extend(
        reference_counts
            .into_iter()
            .filter(|&(_, count)| count > 1)
            .map(|(id, _)| id),
    );
    selected
}

fn contains(rect: Rect<f64>, location: Coord<f64>) -> bool {
    let min = rect.min();
    let max = rect.max();
    (min.x..=max.x).contains(&location.x) && (min.y..=max.y).contains(&location.y)
}

pub(crate) fn validated_coord(lon: f64, lat: f64) -> Option<Coord<f64>> {
    (lon.is_finite()
        && lat.is_finite()
        && (-180.0..=180.0).contains(&lon)
        && (-90.0..=90.0).contains(&lat))
    .then_some(Coord { x: lon, y: lat })
}
