// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap};

use crate::{earth_distance, ExclusionSet, Graph, RouteError};

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: i64,
    cost: f64,
    score: f64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.score.eq(&other.score)
    }

    fn ne(&self, other: &Self) -> bool {
        self.score.ne(&other.score)
    }
}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        // NOTE: We revert the order of comparison,
        // as lower scores are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other.score.partial_cmp(&self.score)
    }
}

impl Eq for QueueItem {}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.partial_cmp(self).unwrap()
    }
}

fn reconstruct_path(came_from: &HashMap<i64, i64>, mut last: i64) -> Vec<i64> {
    let mut path = vec![last];

    while let Some(&nd) = came_from.get(&last) {
        path.push(nd);
        last = nd;
    }

    path.reverse();
    return path;
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the shortest route between two nodes in the provided graph,
/// honoring the provided set of banned way ids.
///
/// Edges whose way-id set intersects `exclusions` stay in the graph but are
/// never traversed. All parallel edges between a node pair are examined, so
/// banning one carriageway of a divided road leaves the other usable. Costs
/// are edge lengths in meters (see [Edge::cost](crate::Edge::cost)); the
/// heuristic is the straight-line distance to the goal.
///
/// Returns an empty vector if there is no route between the two nodes under
/// the current bans - an expected outcome, not an error. When `from_id`
/// equals `to_id`, the route is the single node itself.
///
/// `step_limit` limits how many nodes may be expanded during the search
/// before returning [RouteError::StepLimitExceeded]. Concluding that no route exists requires
/// expanding all nodes accessible from the start, which is usually very time-consuming,
/// especially on large datasets. The recommended value is
/// [DEFAULT_STEP_LIMIT](crate::DEFAULT_STEP_LIMIT).
pub fn find_route(
    g: &Graph,
    from_id: i64,
    to_id: i64,
    exclusions: &ExclusionSet,
    step_limit: usize,
) -> Result<Vec<i64>, RouteError> {
    assert_ne!(from_id, 0);
    assert_ne!(to_id, 0);

    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();
    let mut came_from: HashMap<i64, i64> = HashMap::default();
    let mut known_costs: HashMap<i64, f64> = HashMap::default();
    let mut steps: usize = 0;

    let to_node = g
        .get_node(to_id)
        .ok_or(RouteError::InvalidReference(to_id))?;

    {
        let from_node = g
            .get_node(from_id)
            .ok_or(RouteError::InvalidReference(from_id))?;

        let initial_distance =
            earth_distance(from_node.lat, from_node.lon, to_node.lat, to_node.lon);

        queue.push(QueueItem {
            at: from_id,
            cost: 0.0,
            score: initial_distance,
        });
        known_costs.insert(from_id, 0.0);
    }

    while let Some(item) = queue.pop() {
        if item.at == to_id {
            return Ok(reconstruct_path(&came_from, to_id));
        }

        // Contrary to the wikipedia definition, we might keep multiple items in the queue for the same node.
        if item.cost > known_costs.get(&item.at).cloned().unwrap_or(f64::INFINITY) {
            continue;
        }

        steps += 1;
        if steps > step_limit {
            return Err(RouteError::StepLimitExceeded);
        }

        for edge in g.get_edges(item.at) {
            assert_ne!(edge.to, 0);

            // Banned segments stay in the graph, but are impassable.
            if exclusions.bans_edge(edge) {
                continue;
            }

            // Check if the referred node exists
            if let Some(neighbor) = g.get_node(edge.to) {
                // Check if this is the cheapest way to the neighbor
                let neighbor_cost = item.cost + edge.cost();
                if neighbor_cost
                    > known_costs
                        .get(&edge.to)
                        .cloned()
                        .unwrap_or(f64::INFINITY)
                {
                    continue;
                }

                // Push the new item into the queue
                came_from.insert(edge.to, item.at);
                known_costs.insert(edge.to, neighbor_cost);
                queue.push(QueueItem {
                    at: edge.to,
                    cost: neighbor_cost,
                    score: neighbor_cost
                        + earth_distance(neighbor.lat, neighbor.lon, to_node.lat, to_node.lon),
                });
            }
        }
    }

    return Ok(vec![]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Edge, Node, DEFAULT_STEP_LIMIT};
    use geo::MultiLineString;

    fn edge(to: i64, length: f64, ways: &[i64]) -> Edge {
        Edge {
            to,
            length,
            names: vec![],
            way_ids: ways.to_vec(),
            geometry: MultiLineString::new(vec![]),
        }
    }

    fn two_way(g: &mut Graph, u: i64, v: i64, length: f64, ways: &[i64]) {
        g.add_edge(u, edge(v, length, ways));
        g.add_edge(v, edge(u, length, ways));
    }

    /// A(1) - B(2) - C(3) chain; A-B belongs to way 11, B-C to way 12.
    fn chain_graph() -> Graph {
        let mut g = Graph::default();
        g.set_node(Node { id: 1, lat: 0.0, lon: 0.0 });
        g.set_node(Node { id: 2, lat: 0.0, lon: 1.0 });
        g.set_node(Node { id: 3, lat: 1.0, lon: 1.0 });
        two_way(&mut g, 1, 2, 100.0, &[11]);
        two_way(&mut g, 2, 3, 50.0, &[12]);
        g
    }

    /// A(1) - B(2) directly (way 7, 250 m), or via C(3) (ways 8 and 9,
    /// 160 m each). Coordinates keep the straight-line heuristic admissible.
    fn detour_graph() -> Graph {
        let mut g = Graph::default();
        g.set_node(Node { id: 1, lat: 0.0, lon: 0.0 });
        g.set_node(Node { id: 2, lat: 0.0, lon: 0.002 });
        g.set_node(Node { id: 3, lat: 0.001, lon: 0.001 });
        two_way(&mut g, 1, 2, 250.0, &[7]);
        two_way(&mut g, 1, 3, 160.0, &[8]);
        two_way(&mut g, 3, 2, 160.0, &[9]);
        g
    }

    #[test]
    fn route_through_a_chain() {
        let g = chain_graph();
        let route = find_route(&g, 1, 3, &ExclusionSet::new(), DEFAULT_STEP_LIMIT).unwrap();
        assert_eq!(route, vec![1, 2, 3]);
    }

    #[test]
    fn banned_way_makes_the_chain_impassable() {
        let g = chain_graph();
        let mut bans = ExclusionSet::new();
        bans.add(11);

        let route = find_route(&g, 1, 3, &bans, DEFAULT_STEP_LIMIT).unwrap();
        assert!(route.is_empty());
    }

    #[test]
    fn clearing_bans_restores_the_route() {
        let g = chain_graph();
        let mut bans = ExclusionSet::new();

        let before = find_route(&g, 1, 3, &bans, DEFAULT_STEP_LIMIT).unwrap();
        bans.add(12);
        assert!(find_route(&g, 1, 3, &bans, DEFAULT_STEP_LIMIT).unwrap().is_empty());

        bans.clear();
        let after = find_route(&g, 1, 3, &bans, DEFAULT_STEP_LIMIT).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn banning_any_way_id_of_an_edge_suffices() {
        let mut g = Graph::default();
        g.set_node(Node { id: 1, lat: 0.0, lon: 0.0 });
        g.set_node(Node { id: 2, lat: 0.0, lon: 0.001 });
        // One physical segment shared by ways 7 and 8.
        two_way(&mut g, 1, 2, 120.0, &[7, 8]);

        let mut bans = ExclusionSet::new();
        bans.add(7);

        let route = find_route(&g, 1, 2, &bans, DEFAULT_STEP_LIMIT).unwrap();
        assert!(route.is_empty());
    }

    #[test]
    fn banning_forces_a_detour() {
        let g = detour_graph();

        let direct = find_route(&g, 1, 2, &ExclusionSet::new(), DEFAULT_STEP_LIMIT).unwrap();
        assert_eq!(direct, vec![1, 2]);

        let mut bans = ExclusionSet::new();
        bans.add(7);
        let detour = find_route(&g, 1, 2, &bans, DEFAULT_STEP_LIMIT).unwrap();
        assert_eq!(detour, vec![1, 3, 2]);
    }

    #[test]
    fn parallel_edges_are_considered_individually() {
        let mut g = Graph::default();
        g.set_node(Node { id: 1, lat: 0.0, lon: 0.0 });
        g.set_node(Node { id: 2, lat: 0.0, lon: 0.002 });
        two_way(&mut g, 1, 2, 250.0, &[7]);
        two_way(&mut g, 1, 2, 300.0, &[21]);

        // Banning either carriageway keeps the other usable.
        let mut bans = ExclusionSet::new();
        bans.add(7);
        assert_eq!(find_route(&g, 1, 2, &bans, DEFAULT_STEP_LIMIT).unwrap(), vec![1, 2]);

        bans.clear();
        bans.add(21);
        assert_eq!(find_route(&g, 1, 2, &bans, DEFAULT_STEP_LIMIT).unwrap(), vec![1, 2]);

        // Banning both cuts the connection.
        bans.add(7);
        assert!(find_route(&g, 1, 2, &bans, DEFAULT_STEP_LIMIT).unwrap().is_empty());
    }

    #[test]
    fn degenerate_route_to_self() {
        let g = chain_graph();
        let mut bans = ExclusionSet::new();
        bans.extend([11, 12]);

        let route = find_route(&g, 2, 2, &bans, DEFAULT_STEP_LIMIT).unwrap();
        assert_eq!(route, vec![2]);
    }

    #[test]
    fn disconnected_components_yield_an_empty_route() {
        let mut g = Graph::default();
        g.set_node(Node { id: 1, lat: 0.0, lon: 0.0 });
        g.set_node(Node { id: 2, lat: 0.0, lon: 0.001 });
        g.set_node(Node { id: 3, lat: 0.01, lon: 0.01 });
        g.set_node(Node { id: 4, lat: 0.01, lon: 0.011 });
        two_way(&mut g, 1, 2, 100.0, &[1]);
        two_way(&mut g, 3, 4, 100.0, &[2]);

        let route = find_route(&g, 1, 4, &ExclusionSet::new(), DEFAULT_STEP_LIMIT).unwrap();
        assert!(route.is_empty());
    }

    #[test]
    fn unknown_endpoints_are_an_error() {
        let g = chain_graph();
        assert_eq!(
            find_route(&g, 1, 99, &ExclusionSet::new(), DEFAULT_STEP_LIMIT),
            Err(RouteError::InvalidReference(99)),
        );
        assert_eq!(
            find_route(&g, 99, 1, &ExclusionSet::new(), DEFAULT_STEP_LIMIT),
            Err(RouteError::InvalidReference(99)),
        );
    }

    #[test]
    fn zero_length_edges_do_not_stall_the_search() {
        let mut g = Graph::default();
        g.set_node(Node { id: 1, lat: 0.0, lon: 0.0 });
        g.set_node(Node { id: 2, lat: 0.0, lon: 0.0 });
        g.set_node(Node { id: 3, lat: 0.0, lon: 0.0 });
        two_way(&mut g, 1, 2, 0.0, &[1]);
        two_way(&mut g, 2, 3, 0.0, &[2]);

        let route = find_route(&g, 1, 3, &ExclusionSet::new(), DEFAULT_STEP_LIMIT).unwrap();
        assert_eq!(route, vec![1, 2, 3]);
    }
}
