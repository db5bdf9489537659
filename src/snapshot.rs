// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Graph snapshot persistence.
//!
//! Building the street network requires an Overpass download, so the
//! finished [Graph] is cached on disk as a JSON document and reloaded on
//! subsequent runs. The format round-trips every node and edge attribute;
//! geometry is stored as nested `[lon, lat]` coordinate arrays.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use geo::{LineString, MultiLineString};
use serde::{Deserialize, Serialize};

use crate::{Edge, Error, Graph, Node};

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotDoc {
    nodes: Vec<SnapshotNode>,
    edges: Vec<SnapshotEdge>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotNode {
    id: i64,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEdge {
    from: i64,
    to: i64,
    length: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    names: Vec<String>,
    way_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    geometry: Vec<Vec<[f64; 2]>>,
}

impl From<&Node> for SnapshotNode {
    fn from(n: &Node) -> Self {
        Self {
            id: n.id,
            lat: n.lat,
            lon: n.lon,
        }
    }
}

impl SnapshotEdge {
    fn new(from: i64, e: &Edge) -> Self {
        Self {
            from,
            to: e.to,
            length: e.length,
            names: e.names.clone(),
            way_ids: e.way_ids.clone(),
            geometry: e
                .geometry
                .0
                .iter()
                .map(|line| line.0.iter().map(|c| [c.x, c.y]).collect())
                .collect(),
        }
    }

    fn into_edge(self) -> Edge {
        Edge {
            to: self.to,
            length: self.length,
            names: self.names,
            way_ids: self.way_ids,
            geometry: MultiLineString::new(
                self.geometry
                    .into_iter()
                    .map(|line| {
                        LineString::from(
                            line.into_iter().map(|[x, y]| (x, y)).collect::<Vec<_>>(),
                        )
                    })
                    .collect(),
            ),
        }
    }
}

/// Writes the graph to a JSON snapshot file at the provided path.
pub fn save<P: AsRef<Path>>(g: &Graph, path: P) -> Result<(), Error> {
    let doc = SnapshotDoc {
        nodes: g.iter().map(SnapshotNode::from).collect(),
        edges: g
            .edges()
            .map(|(node, edge)| SnapshotEdge::new(node.id, edge))
            .collect(),
    };

    let f = File::create(path)?;
    serde_json::to_writer(BufWriter::new(f), &doc)?;
    Ok(())
}

/// Reads a graph back from a JSON snapshot file at the provided path.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Graph, Error> {
    let f = File::open(path)?;
    let doc: SnapshotDoc = serde_json::from_reader(BufReader::new(f))?;

    let mut g = Graph::default();
    for node in &doc.nodes {
        g.set_node(Node {
            id: node.id,
            lat: node.lat,
            lon: node.lon,
        });
    }
    for edge in doc.edges {
        g.add_edge(edge.from, edge.into_edge());
    }
    Ok(g)
}
