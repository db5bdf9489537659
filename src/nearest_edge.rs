// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use geo::{EuclideanDistance, Point};

use crate::{Edge, Graph};

/// Default number of road suggestions returned by [nearest_edges].
pub const DEFAULT_SUGGESTIONS: usize = 20;

/// Default search radius around the queried point, in meters.
pub const DEFAULT_MAX_DISTANCE_M: f64 = 200.0;

/// Degrees per meter close to the service area's latitude.
///
/// Edge geometry is stored in coordinate degrees and distances to it are
/// planar, so the metric search radius is converted with this factor. The
/// approximation only holds near Hanoi - which is the entire service
/// area - and makes the default radius come out at 0.002°.
const DEGREES_PER_METER: f64 = 1.0 / 100_000.0;

/// A single nearest-edge hit.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMatch {
    /// Id of the node the edge goes out of.
    pub from: i64,

    /// The matched edge itself.
    pub edge: Edge,

    /// Planar distance from the queried point to the edge geometry,
    /// in meters.
    pub distance_m: f64,
}

/// Finds the `k` edges closest to the given position, ordered by ascending
/// distance. Edges farther than `max_distance_m` (or without geometry) are
/// skipped. For edges drawn as several disjoint polylines, the distance to
/// the closest polyline counts.
///
/// Returns an empty vector - never an error - when no edge qualifies.
pub fn nearest_edges(
    g: &Graph,
    lat: f64,
    lon: f64,
    k: usize,
    max_distance_m: f64,
) -> Vec<EdgeMatch> {
    let pt = Point::new(lon, lat);
    let max_distance_deg = max_distance_m * DEGREES_PER_METER;

    let mut matches: Vec<EdgeMatch> = g
        .edges()
        .filter_map(|(from, edge)| {
            let distance_deg = edge
                .geometry
                .0
                .iter()
                .filter(|line| !line.0.is_empty())
                .map(|line| pt.euclidean_distance(line))
                .min_by(|a, b| a.partial_cmp(b).unwrap())?;

            (distance_deg <= max_distance_deg).then(|| EdgeMatch {
                from: from.id,
                edge: edge.clone(),
                distance_m: distance_deg / DEGREES_PER_METER,
            })
        })
        .collect();

    matches.sort_by(|a, b| a.distance_m.partial_cmp(&b.distance_m).unwrap());
    matches.truncate(k);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Node;
    use geo::{LineString, MultiLineString};

    fn polyline(coords: &[(f64, f64)]) -> LineString<f64> {
        LineString::from(coords.to_vec())
    }

    /// An east-west street drawn at the given latitude.
    fn street_at(lat: f64) -> MultiLineString<f64> {
        MultiLineString::new(vec![polyline(&[(-0.001, lat), (0.001, lat)])])
    }

    fn edge_with_geometry(to: i64, way: i64, geometry: MultiLineString<f64>) -> Edge {
        Edge {
            to,
            length: 100.0,
            names: vec![],
            way_ids: vec![way],
            geometry,
        }
    }

    /// Four streets around the origin: way 1 at 50 m, way 2 at 100 m,
    /// way 3 at 400 m, and way 4 drawn as two disjoint polylines whose
    /// closer part lies at 20 m.
    fn test_graph() -> Graph {
        let mut g = Graph::default();
        for id in 1..=5 {
            g.set_node(Node {
                id,
                lat: 0.0,
                lon: 0.0,
            });
        }
        g.add_edge(1, edge_with_geometry(2, 1, street_at(0.0005)));
        g.add_edge(2, edge_with_geometry(3, 2, street_at(0.001)));
        g.add_edge(3, edge_with_geometry(4, 3, street_at(0.004)));
        g.add_edge(
            4,
            edge_with_geometry(
                5,
                4,
                MultiLineString::new(vec![
                    polyline(&[(-0.001, 0.003), (0.001, 0.003)]),
                    polyline(&[(-0.001, 0.0002), (0.001, 0.0002)]),
                ]),
            ),
        );
        g
    }

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 0.5),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    #[test]
    fn matches_are_ordered_and_bounded() {
        let g = test_graph();
        let matches = nearest_edges(&g, 0.0, 0.0, DEFAULT_SUGGESTIONS, DEFAULT_MAX_DISTANCE_M);

        let ways: Vec<i64> = matches.iter().map(|m| m.edge.way_ids[0]).collect();
        assert_eq!(ways, vec![4, 1, 2]);

        assert_almost_eq!(matches[0].distance_m, 20.0);
        assert_almost_eq!(matches[1].distance_m, 50.0);
        assert_almost_eq!(matches[2].distance_m, 100.0);

        for pair in matches.windows(2) {
            assert!(pair[0].distance_m <= pair[1].distance_m);
        }
        for m in &matches {
            assert!(m.distance_m <= DEFAULT_MAX_DISTANCE_M);
        }
    }

    #[test]
    fn k_truncates_the_result() {
        let g = test_graph();
        let matches = nearest_edges(&g, 0.0, 0.0, 2, DEFAULT_MAX_DISTANCE_M);

        let ways: Vec<i64> = matches.iter().map(|m| m.edge.way_ids[0]).collect();
        assert_eq!(ways, vec![4, 1]);
    }

    #[test]
    fn a_wider_radius_reaches_farther_streets() {
        let g = test_graph();
        let matches = nearest_edges(&g, 0.0, 0.0, DEFAULT_SUGGESTIONS, 500.0);
        assert_eq!(matches.len(), 4);
    }

    #[test]
    fn no_qualifying_edge_is_not_an_error() {
        let g = test_graph();
        assert!(nearest_edges(&g, 1.0, 1.0, DEFAULT_SUGGESTIONS, DEFAULT_MAX_DISTANCE_M).is_empty());
        assert!(nearest_edges(&Graph::default(), 0.0, 0.0, 20, 200.0).is_empty());
    }

    #[test]
    fn edges_without_geometry_are_skipped() {
        let mut g = Graph::default();
        g.set_node(Node {
            id: 1,
            lat: 0.0,
            lon: 0.0,
        });
        g.set_node(Node {
            id: 2,
            lat: 0.0,
            lon: 0.001,
        });
        g.add_edge(1, edge_with_geometry(2, 1, MultiLineString::new(vec![])));

        assert!(nearest_edges(&g, 0.0, 0.0, 20, 200.0).is_empty());
    }
}
