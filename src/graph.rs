// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{earth_distance, Edge, Node};
use std::collections::btree_map::{BTreeMap, Entry};

/// Represents a ward's street network as a set of [Nodes](Node)
/// and [Edges](Edge) between them.
///
/// The graph is mutated only while it is being built (from an OSM extract
/// or a snapshot); afterwards every consumer treats it as read-only. Road
/// bans never remove edges - they are applied at query time by the route
/// search, since a banned way id may cover only some of several edges and
/// bans must be reversible.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph(BTreeMap<i64, (Node, Vec<Edge>)>);

impl Graph {
    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over all [Nodes](Node) in the graph.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.0.iter().map(|(_, (node, _))| node)
    }

    /// Returns an iterator over all [Edges](Edge) in the graph,
    /// together with their origin [Node].
    pub fn edges(&self) -> impl Iterator<Item = (&Node, &Edge)> {
        self.0
            .values()
            .flat_map(|(node, edges)| edges.iter().map(move |e| (node, e)))
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: i64) -> Option<Node> {
        self.0.get(&id).map(|&(node, _)| node)
    }

    /// Creates or updates a [Node] with `node.id`.
    ///
    /// All outgoing and incoming edges are preserved.
    /// Updating a [Node] position might result in violation of the
    /// [Edge] length invariant (and thus break route finding) and
    /// is therefore disallowed.
    pub fn set_node(&mut self, node: Node) {
        assert_ne!(node.id, 0);

        match self.0.entry(node.id) {
            Entry::Vacant(e) => {
                e.insert((node, Vec::default()));
            }
            Entry::Occupied(mut e) => {
                debug_assert_eq!(e.get().0.id, node.id);
                e.get_mut().0 = node;
            }
        }
    }

    /// Finds the closest [Node] to the given position.
    ///
    /// This function requires computing the distance to every [Node] in the
    /// graph. Use a [KDTree](crate::KDTree) for repeated queries.
    pub fn find_nearest_node(&self, lat: f64, lon: f64) -> Option<Node> {
        self.0
            .values()
            .map(|&(nd, _)| (earth_distance(lat, lon, nd.lat, nd.lon), nd))
            .min_by(|(a_dist, _), (b_dist, _)| a_dist.partial_cmp(b_dist).unwrap())
            .map(|(_, nd)| nd)
    }

    /// Gets all outgoing [Edges](Edge) from a node with a given id.
    pub fn get_edges(&self, from_id: i64) -> &[Edge] {
        self.0
            .get(&from_id)
            .map(|(_, e)| e.as_slice())
            .unwrap_or_default()
    }

    /// Returns all parallel [Edges](Edge) from one node to another;
    /// the iterator may yield zero, one or multiple edges.
    pub fn edges_between(&self, from_id: i64, to_id: i64) -> impl Iterator<Item = &Edge> {
        self.get_edges(from_id).iter().filter(move |e| e.to == to_id)
    }

    /// Returns the first stored [Edge] from one node to another, if any.
    ///
    /// When parallel edges exist, the first one wins; this is the lookup
    /// the instruction generator uses to attribute names and lengths.
    pub fn edge_between(&self, from_id: i64, to_id: i64) -> Option<&Edge> {
        self.get_edges(from_id).iter().find(|e| e.to == to_id)
    }

    /// Appends an [Edge] going out of a node with a given id.
    ///
    /// Contrary to [Graph::set_node], an existing edge to the same target
    /// is never replaced: parallel edges are a feature of the street model.
    pub fn add_edge(&mut self, from_id: i64, edge: Edge) {
        assert_ne!(from_id, 0);
        assert_ne!(edge.to, 0);

        if let Some((_, edges)) = self.0.get_mut(&from_id) {
            edges.push(edge);
        }
    }
}
