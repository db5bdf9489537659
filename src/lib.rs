// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Constrained street routing over a ward-sized
//! [OpenStreetMap](https://www.openstreetmap.org/) network.
//!
//! wardnav keeps a weighted street graph of a single ward (the demo area is
//! Giảng Võ, Ba Đình, Hà Nội), snaps arbitrary coordinates to graph nodes,
//! finds shortest paths with A* while honoring a user-mutable set of banned
//! OSM way ids, and renders results as turn-by-turn instructions. The graph
//! is built from Overpass API data on first use and cached as a JSON
//! snapshot; road names are resolved to way ids through the same API.
//!
//! # Example
//!
//! ```no_run
//! use wardnav::{ExclusionSet, OverpassClient, SegmentLookup};
//!
//! let mut client = OverpassClient::new("Hà Nội").expect("failed to build the Overpass client");
//! let g = wardnav::load_or_download("giang_vo_ba_dinh.json", wardnav::DEFAULT_PLACE, &client)
//!     .expect("failed to load the street network");
//!
//! let start = g.find_nearest_node(21.0270, 105.8190).expect("empty graph");
//! let end = g.find_nearest_node(21.0326, 105.8225).expect("empty graph");
//!
//! let mut bans = ExclusionSet::new();
//! bans.extend(client.ways_named("Giảng Võ"));
//!
//! let route = wardnav::find_route(&g, start.id, end.id, &bans, wardnav::DEFAULT_STEP_LIMIT)
//!     .expect("route search failed");
//! let (steps, total_m) = wardnav::route_instructions(&g, &route);
//! for step in &steps {
//!     println!("{step}");
//! }
//! println!("total: {total_m:.0} m");
//! ```

use geo::MultiLineString;

mod astar;
mod boundary;
mod distance;
mod error;
mod exclusion;
mod graph;
mod instructions;
mod kd;
mod loader;
mod nearest_edge;
pub mod osm;
pub mod overpass;
mod planner;
pub mod snapshot;

pub use astar::{find_route, RouteError, DEFAULT_STEP_LIMIT};
pub use boundary::ServiceArea;
pub use distance::earth_distance;
pub use error::Error;
pub use exclusion::ExclusionSet;
pub use graph::Graph;
pub use instructions::route_instructions;
pub use kd::KDTree;
pub use loader::{load_from_osm_file, load_or_download, DEFAULT_PLACE};
pub use nearest_edge::{nearest_edges, EdgeMatch, DEFAULT_MAX_DISTANCE_M, DEFAULT_SUGGESTIONS};
pub use overpass::{OverpassClient, SegmentLookup};
pub use planner::{BanCandidate, EndpointStatus, Planner, RouteSummary};

/// Represents an intersection of the street [Graph].
///
/// Nodes with `id == 0` are disallowed; zero ids internally signify
/// the absence of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}

/// Represents an outgoing (one-way) street segment from a specific [Node].
///
/// Two-way streets are stored as two edges, one per direction. Multiple
/// parallel edges may connect the same pair of nodes (e.g. the separate
/// carriageways of a divided road); route search considers all of them.
///
/// Due to implementation details, `to` might not exist in the [Graph].
/// Users must silently ignore such edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Target node id.
    pub to: i64,

    /// Length of the segment in meters.
    pub length: f64,

    /// Street name aliases. The first entry is used for display and for
    /// grouping instructions; empty for unnamed segments.
    pub names: Vec<String>,

    /// OSM way ids this segment belongs to. One way id may span several
    /// edges, and one edge may carry several way ids.
    pub way_ids: Vec<i64>,

    /// Segment geometry in (lon, lat) order, used for rendering and for
    /// nearest-edge lookups. May consist of several disjoint polylines.
    pub geometry: MultiLineString<f64>,
}

impl Edge {
    /// The name this segment is displayed and grouped under: the first alias.
    pub fn display_name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    /// Route-search cost of this segment, in meters.
    ///
    /// Falls back to 1 m when the stored length is missing or degenerate,
    /// so search costs stay positive and termination is guaranteed.
    pub fn cost(&self) -> f64 {
        if self.length.is_finite() && self.length > 0.0 {
            self.length
        } else {
            1.0
        }
    }
}
