// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::ops::Range;

use crate::{earth_distance, Node};

/// A [k-d tree](https://en.wikipedia.org/wiki/K-d_tree) over the graph's
/// [Nodes](Node) for fast nearest-node lookups. Snapping a point with
/// [Graph::find_nearest_node](crate::Graph::find_nearest_node) walks every
/// node, which quickly dwarfs the route search itself once a session snaps
/// several clicked points; the tree trades a one-time build for
/// logarithmic queries.
///
/// The splitting planes alternate between the latitude and longitude axes
/// and the pruning test assumes euclidean geometry, even though distances
/// are measured with [earth_distance]. Queries near the antimeridian
/// (180°/-180° longitude) or the poles may therefore return a non-optimal
/// node; a single ward sits nowhere near either.
#[derive(Debug, Clone)]
pub struct KDTree {
    /// Non-empty, in median layout: the pivot of any subslice sits at its
    /// midpoint, with smaller axis coordinates to the left of it and
    /// larger ones to the right.
    nodes: Vec<Node>,
}

impl KDTree {
    /// Builds a k-d tree from an iterable of [Nodes](Node).
    /// Returns [None] if the iterable is empty.
    pub fn from_iter<I: IntoIterator<Item = Node>>(nodes: I) -> Option<Self> {
        let mut nodes: Vec<Node> = nodes.into_iter().collect();
        if nodes.is_empty() {
            return None;
        }
        arrange(&mut nodes, false);
        Some(Self { nodes })
    }

    /// Finds the closest [Node] to the given position.
    pub fn find_nearest_node(&self, lat: f64, lon: f64) -> Node {
        let mut best = self.nodes[0];
        let mut best_dist = f64::INFINITY;
        self.search(lat, lon, 0..self.nodes.len(), false, &mut best, &mut best_dist);
        best
    }

    fn search(
        &self,
        lat: f64,
        lon: f64,
        range: Range<usize>,
        lon_divides: bool,
        best: &mut Node,
        best_dist: &mut f64,
    ) {
        if range.is_empty() {
            return;
        }

        let mid = range.start + range.len() / 2;
        let pivot = self.nodes[mid];
        let dist = earth_distance(lat, lon, pivot.lat, pivot.lon);
        if dist < *best_dist {
            *best = pivot;
            *best_dist = dist;
        }

        let (left, right) = (range.start..mid, mid + 1..range.end);
        let query_is_left = if lon_divides {
            lon < pivot.lon
        } else {
            lat < pivot.lat
        };
        let (near, far) = if query_is_left {
            (left, right)
        } else {
            (right, left)
        };

        self.search(lat, lon, near, !lon_divides, best, best_dist);

        // The far half can only hold a better candidate when the splitting
        // plane itself lies closer than the best match so far.
        let (plane_lat, plane_lon) = if lon_divides {
            (lat, pivot.lon)
        } else {
            (pivot.lat, lon)
        };
        if earth_distance(lat, lon, plane_lat, plane_lon) < *best_dist {
            self.search(lat, lon, far, !lon_divides, best, best_dist);
        }
    }
}

/// Rearranges `nodes` into median layout, alternating the splitting axis.
/// Only the median element of each subslice needs to be in its sorted
/// place, so a full sort per level is avoided.
fn arrange(nodes: &mut [Node], lon_divides: bool) {
    if nodes.len() < 2 {
        return;
    }

    let mid = nodes.len() / 2;
    if lon_divides {
        nodes.select_nth_unstable_by(mid, |a, b| a.lon.partial_cmp(&b.lon).unwrap());
    } else {
        nodes.select_nth_unstable_by(mid, |a, b| a.lat.partial_cmp(&b.lat).unwrap());
    }

    let (left, rest) = nodes.split_at_mut(mid);
    arrange(left, !lon_divides);
    arrange(&mut rest[1..], !lon_divides);
}
