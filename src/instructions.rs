// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Graph;

/// Turns sharper than this many degrees are reported; anything gentler
/// counts as continuing straight ahead.
const TURN_THRESHOLD: f64 = 30.0;

/// Display name for segments without a name tag.
const UNNAMED: &str = "unnamed road";

/// Converts a route (as returned by [find_route](crate::find_route)) into
/// human-readable instructions, returning them together with the total
/// length of the route in meters.
///
/// Consecutive edges sharing a display name merge into a single
/// "Go {distance}m on {street}" instruction with accumulated distance.
/// A turn ("then turn left/right") is attached to the instruction of the
/// street being departed, and only when the street name changes at the
/// turning node - a turn in the middle of a single street is not surfaced.
///
/// Routes with fewer than two nodes produce no instructions and a total
/// distance of zero. When parallel edges connect a node pair, the first
/// stored edge provides the name and length (see
/// [Graph::edge_between](crate::Graph::edge_between)).
pub fn route_instructions(g: &Graph, route: &[i64]) -> (Vec<String>, f64) {
    let mut instructions: Vec<String> = vec![];
    let mut total_distance = 0.0;
    let mut current_street: Option<String> = None;
    let mut current_distance = 0.0;
    let mut turn = None;

    for i in 0..route.len().saturating_sub(1) {
        let (u, v) = (route[i], route[i + 1]);
        let Some(edge) = g.edge_between(u, v) else {
            continue;
        };

        let distance = edge.length;
        total_distance += distance;
        let street = edge.display_name().unwrap_or(UNNAMED);

        if i > 0 {
            turn = turn_direction(g, route[i - 1], u, v);
        }

        match current_street {
            Some(ref name) if name == street => current_distance += distance,
            _ => {
                if let Some(name) = current_street.take() {
                    let mut instruction = format!("Go {:.0}m on {}", current_distance, name);
                    if let Some(turn) = turn {
                        instruction.push_str(", then ");
                        instruction.push_str(turn);
                    }
                    instructions.push(instruction);
                }
                current_street = Some(street.to_string());
                current_distance = distance;
            }
        }
    }

    if let Some(name) = current_street {
        instructions.push(format!("Go {:.0}m on {}", current_distance, name));
    }

    (instructions, total_distance)
}

/// Direction of the turn at node `b` when traveling a -> b -> c, or [None]
/// when the path continues roughly straight on.
///
/// The angle between the incoming and outgoing vectors comes from the dot
/// product (with the cosine clamped to [-1, 1] against floating-point
/// drift); the sign of the 2D cross product picks left or right.
fn turn_direction(g: &Graph, a: i64, b: i64, c: i64) -> Option<&'static str> {
    let pa = g.get_node(a)?;
    let pb = g.get_node(b)?;
    let pc = g.get_node(c)?;

    let v1 = (pb.lat - pa.lat, pb.lon - pa.lon);
    let v2 = (pc.lat - pb.lat, pc.lon - pb.lon);

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let v1_mag = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let v2_mag = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    // Zero-length hops have no direction to turn from.
    let cos_angle = if v1_mag == 0.0 || v2_mag == 0.0 {
        1.0
    } else {
        dot / (v1_mag * v2_mag)
    };
    let angle = cos_angle.clamp(-1.0, 1.0).acos().to_degrees();
    if angle <= TURN_THRESHOLD {
        return None;
    }

    let cross = v1.0 * v2.1 - v1.1 * v2.0;
    if cross > 0.0 {
        Some("turn right")
    } else {
        Some("turn left")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Edge, Node};
    use geo::MultiLineString;

    fn named_edge(to: i64, length: f64, names: &[&str]) -> Edge {
        Edge {
            to,
            length,
            names: names.iter().map(|s| s.to_string()).collect(),
            way_ids: vec![1],
            geometry: MultiLineString::new(vec![]),
        }
    }

    fn graph_with(nodes: &[(i64, f64, f64)], edges: &[(i64, i64, f64, &[&str])]) -> Graph {
        let mut g = Graph::default();
        for &(id, lat, lon) in nodes {
            g.set_node(Node { id, lat, lon });
        }
        for &(from, to, length, names) in edges {
            g.add_edge(from, named_edge(to, length, names));
        }
        g
    }

    #[test]
    fn edges_on_the_same_street_merge() {
        let g = graph_with(
            &[(1, 0.0, 0.0), (2, 0.0, 1.0), (3, 1.0, 1.0)],
            &[(1, 2, 100.0, &["X"]), (2, 3, 50.0, &["X"])],
        );

        let (instructions, total) = route_instructions(&g, &[1, 2, 3]);
        assert_eq!(instructions, vec!["Go 150m on X"]);
        assert_eq!(total, 150.0);
    }

    #[test]
    fn name_change_with_a_left_turn() {
        // Heading east on X, then north on Y.
        let g = graph_with(
            &[(1, 0.0, 0.0), (2, 0.0, 1.0), (3, 1.0, 1.0)],
            &[(1, 2, 100.0, &["X"]), (2, 3, 50.0, &["Y"])],
        );

        let (instructions, total) = route_instructions(&g, &[1, 2, 3]);
        assert_eq!(
            instructions,
            vec!["Go 100m on X, then turn left", "Go 50m on Y"],
        );
        assert_eq!(total, 150.0);
    }

    #[test]
    fn name_change_with_a_right_turn() {
        // Heading east on X, then south on Y.
        let g = graph_with(
            &[(1, 0.0, 0.0), (2, 0.0, 1.0), (3, -1.0, 1.0)],
            &[(1, 2, 100.0, &["X"]), (2, 3, 50.0, &["Y"])],
        );

        let (instructions, _) = route_instructions(&g, &[1, 2, 3]);
        assert_eq!(
            instructions,
            vec!["Go 100m on X, then turn right", "Go 50m on Y"],
        );
    }

    #[test]
    fn straight_continuation_reports_no_turn() {
        let g = graph_with(
            &[(1, 0.0, 0.0), (2, 0.0, 1.0), (3, 0.0, 2.0)],
            &[(1, 2, 100.0, &["X"]), (2, 3, 50.0, &["Y"])],
        );

        let (instructions, _) = route_instructions(&g, &[1, 2, 3]);
        assert_eq!(instructions, vec!["Go 100m on X", "Go 50m on Y"]);
    }

    #[test]
    fn turns_within_one_street_are_not_surfaced() {
        // A sharp 90° corner, but the name never changes.
        let g = graph_with(
            &[(1, 0.0, 0.0), (2, 0.0, 1.0), (3, 1.0, 1.0)],
            &[(1, 2, 100.0, &["X"]), (2, 3, 50.0, &["X"])],
        );

        let (instructions, _) = route_instructions(&g, &[1, 2, 3]);
        assert_eq!(instructions, vec!["Go 150m on X"]);
    }

    #[test]
    fn unnamed_segments_get_a_placeholder() {
        let g = graph_with(&[(1, 0.0, 0.0), (2, 0.0, 1.0)], &[(1, 2, 80.0, &[])]);

        let (instructions, total) = route_instructions(&g, &[1, 2]);
        assert_eq!(instructions, vec!["Go 80m on unnamed road"]);
        assert_eq!(total, 80.0);
    }

    #[test]
    fn grouping_uses_the_first_alias() {
        let g = graph_with(
            &[(1, 0.0, 0.0), (2, 0.0, 1.0), (3, 0.0, 2.0)],
            &[
                (1, 2, 100.0, &["Phố Cầu Gỗ", "Cau Go"]),
                (2, 3, 50.0, &["Phố Cầu Gỗ", "Pho Cau Go"]),
            ],
        );

        let (instructions, _) = route_instructions(&g, &[1, 2, 3]);
        assert_eq!(instructions, vec!["Go 150m on Phố Cầu Gỗ"]);
    }

    #[test]
    fn degenerate_routes_produce_nothing() {
        let g = graph_with(&[(1, 0.0, 0.0)], &[]);

        assert_eq!(route_instructions(&g, &[]), (vec![], 0.0));
        assert_eq!(route_instructions(&g, &[1]), (vec![], 0.0));
    }

    #[test]
    fn per_instruction_distances_add_up_to_the_total() {
        let g = graph_with(
            &[(1, 0.0, 0.0), (2, 0.0, 1.0), (3, 0.0, 2.0), (4, 1.0, 2.0)],
            &[
                (1, 2, 100.0, &["X"]),
                (2, 3, 50.0, &["X"]),
                (3, 4, 25.0, &["Y"]),
            ],
        );

        let (instructions, total) = route_instructions(&g, &[1, 2, 3, 4]);
        assert_eq!(total, 175.0);

        let summed: f64 = instructions
            .iter()
            .map(|i| {
                i.strip_prefix("Go ")
                    .and_then(|r| r.split('m').next())
                    .and_then(|m| m.parse::<f64>().ok())
                    .unwrap()
            })
            .sum();
        assert_eq!(summed, total);
    }
}
