// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use geo::{LineString, MultiLineString};

use crate::{earth_distance, Edge, Graph, Node};

use super::{model, FeatureReader, Options};

/// Highway values which exist in OSM data, but cannot be walked or driven on.
const UNROUTABLE_HIGHWAYS: &[&str] = &[
    "abandoned",
    "construction",
    "planned",
    "platform",
    "proposed",
    "razed",
];

/// Helper object used for storing state related to converting
/// [OSM features](super::model::Feature) into a [Graph].
///
/// Nodes and ways are staged first; the graph itself materializes in
/// [GraphBuilder::finish], once it is known which nodes are junctions.
/// Ways are split at junction nodes (nodes referenced more than once across
/// all routable ways) and every run between two junctions becomes a single
/// [Edge] carrying the summed length and the run's polyline geometry -
/// interior nodes survive only as geometry points.
pub(super) struct GraphBuilder<'a> {
    g: &'a mut Graph,
    options: &'a Options,
    nodes: HashMap<i64, Node>,
    ways: Vec<model::Way>,
    node_uses: HashMap<i64, u32>,
    ignore_bbox: bool,
}

impl<'a> GraphBuilder<'a> {
    /// Create a new, empty graph builder.
    pub(super) fn new(g: &'a mut Graph, options: &'a Options) -> Self {
        let ignore_bbox =
            options.bbox.iter().all(|&x| x == 0.0) || options.bbox.iter().any(|x| !x.is_finite());

        Self {
            g,
            options,
            nodes: HashMap::default(),
            ways: Vec::default(),
            node_uses: HashMap::default(),
            ignore_bbox,
        }
    }

    /// Add all features from the provided [FeatureReader],
    /// then materialize the staged data into the graph.
    pub(super) fn add_features<F: FeatureReader>(
        &mut self,
        mut features: F,
    ) -> Result<(), F::Error> {
        while let Some(f) = features.next()? {
            self.add_feature(f);
        }
        self.finish();
        Ok(())
    }

    fn add_feature(&mut self, f: model::Feature) {
        match f {
            model::Feature::Node(n) => self.add_node(n),
            model::Feature::Way(w) => self.add_way(w),
        }
    }

    fn add_node(&mut self, n: Node) {
        if n.id != 0 && self.is_in_bbox(n.lat, n.lon) {
            self.nodes.insert(n.id, n);
        }
    }

    fn is_in_bbox(&self, lat: f64, lon: f64) -> bool {
        if self.ignore_bbox {
            return true;
        }
        let [min_lon, min_lat, max_lon, max_lat] = self.options.bbox;
        lat >= min_lat && lat <= max_lat && lon >= min_lon && lon <= max_lon
    }

    fn add_way(&mut self, w: model::Way) {
        if !is_routable(&w.tags) {
            return;
        }

        // Remove references to unknown nodes
        let nodes: Vec<i64> = w
            .nodes
            .iter()
            .copied()
            .filter(|node_id| self.nodes.contains_key(node_id))
            .collect();
        if nodes.len() < 2 {
            log::debug!("way {} has fewer than 2 known nodes - skipping", w.id);
            return;
        }

        for node_id in &nodes {
            *self.node_uses.entry(*node_id).or_insert(0) += 1;
        }
        self.ways.push(model::Way {
            id: w.id,
            nodes,
            tags: w.tags,
        });
    }

    /// Splits every staged way at junction nodes and turns the runs
    /// in-between into graph edges.
    fn finish(&mut self) {
        let ways = std::mem::take(&mut self.ways);
        for way in &ways {
            let (forward, backward) = way_direction(&way.tags);
            let mut start = 0;
            for idx in 1..way.nodes.len() {
                let is_junction = self.node_uses.get(&way.nodes[idx]).copied().unwrap_or(0) >= 2;
                if idx == way.nodes.len() - 1 || is_junction {
                    self.add_run(way, &way.nodes[start..=idx], forward, backward);
                    start = idx;
                }
            }
        }
    }

    /// Adds a single junction-to-junction run of a way as an [Edge]
    /// (or two, for two-way streets).
    fn add_run(&mut self, way: &model::Way, run: &[i64], forward: bool, backward: bool) {
        debug_assert!(run.len() >= 2);
        debug_assert!(forward || backward);

        let nodes: Vec<Node> = run
            .iter()
            .map(|node_id| {
                *self
                    .nodes
                    .get(node_id)
                    .expect("staged ways only reference staged nodes")
            })
            .collect();

        let length: f64 = nodes
            .windows(2)
            .map(|pair| earth_distance(pair[0].lat, pair[0].lon, pair[1].lat, pair[1].lon))
            .sum();
        let names = name_aliases(&way.tags);
        let coords: Vec<(f64, f64)> = nodes.iter().map(|n| (n.lon, n.lat)).collect();

        let first = nodes[0];
        let last = nodes[nodes.len() - 1];
        self.g.set_node(first);
        self.g.set_node(last);

        if forward {
            self.g.add_edge(
                first.id,
                Edge {
                    to: last.id,
                    length,
                    names: names.clone(),
                    way_ids: vec![way.id],
                    geometry: MultiLineString::new(vec![LineString::from(coords.clone())]),
                },
            );
        }
        if backward {
            let mut coords = coords;
            coords.reverse();
            self.g.add_edge(
                last.id,
                Edge {
                    to: first.id,
                    length,
                    names,
                    way_ids: vec![way.id],
                    geometry: MultiLineString::new(vec![LineString::from(coords)]),
                },
            );
        }
    }
}

/// Checks whether a way is part of the routable street network:
/// anything with a highway tag, except values describing ways
/// which physically cannot be traversed.
fn is_routable(tags: &HashMap<String, String>) -> bool {
    match tags.get("highway") {
        Some(v) => !UNROUTABLE_HIGHWAYS.contains(&v.as_str()),
        None => false,
    }
}

/// Returns in which directions a way is traversable, as per its
/// [oneway tag](https://wiki.openstreetmap.org/wiki/Key:oneway).
fn way_direction(tags: &HashMap<String, String>) -> (bool, bool) {
    match tags.get("oneway").map(String::as_str) {
        Some("yes") | Some("true") | Some("1") => (true, false),
        Some("-1") | Some("reverse") => (false, true),
        _ => (true, true),
    }
}

/// Splits the name tag on ";" into a list of aliases,
/// as several names may apply to one physical street.
fn name_aliases(tags: &HashMap<String, String>) -> Vec<String> {
    tags.get("name")
        .map(|v| {
            v.split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
