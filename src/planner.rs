// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! The interaction facade backing one user session: endpoint selection,
//! road bans and route recomputation.
//!
//! Everything here is synchronous; one user action triggers one
//! recomputation cycle. The exclusion set is mutated strictly between
//! route computations, so a search never observes a ban mid-flight.

use std::collections::HashSet;

use geo::MultiLineString;

use crate::{
    find_route, nearest_edges, route_instructions, Error, ExclusionSet, Graph, KDTree,
    SegmentLookup, ServiceArea, DEFAULT_MAX_DISTANCE_M, DEFAULT_STEP_LIMIT, DEFAULT_SUGGESTIONS,
};

/// Outcome of placing a route endpoint via [Planner::set_endpoint].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointStatus {
    /// The point was accepted as the start or the destination.
    Accepted,

    /// The point lies outside the serviceable area and was rejected.
    OutsideServiceArea,

    /// Both endpoints are already set; clear them first.
    AlreadySet,
}

/// A computed route together with its turn-by-turn rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    /// The node ids of the route, including both snapped endpoints.
    pub nodes: Vec<i64>,

    /// Human-readable turn-by-turn instructions.
    pub instructions: Vec<String>,

    /// Total length of the route, in meters.
    pub total_distance_m: f64,
}

/// A road segment offered for banning, pending user confirmation.
///
/// Lives for a single suggest - confirm/cancel cycle and is never
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct BanCandidate {
    /// The way ids that would be banned on confirmation.
    pub way_ids: Vec<i64>,

    /// Display name of the segment, if it has one.
    pub name: Option<String>,

    /// Length of the segment, in meters.
    pub length_m: f64,

    /// Node the segment goes out of.
    pub from: i64,

    /// Node the segment leads to.
    pub to: i64,

    /// Segment geometry in (lon, lat) order, for highlighting.
    pub geometry: MultiLineString<f64>,

    /// Distance from the queried point to the segment, in meters.
    pub distance_m: f64,
}

/// One user session over an immutable street [Graph]: two route endpoints,
/// the set of banned ways, and the ban candidate awaiting confirmation.
pub struct Planner<L: SegmentLookup> {
    graph: Graph,
    index: Option<KDTree>,
    exclusions: ExclusionSet,
    lookup: L,
    area: ServiceArea,
    endpoints: Vec<(f64, f64)>,
    pending: Option<BanCandidate>,
}

impl<L: SegmentLookup> Planner<L> {
    /// Creates a session over the provided graph, name-lookup collaborator
    /// and service-area boundary.
    pub fn new(graph: Graph, lookup: L, area: ServiceArea) -> Self {
        let index = KDTree::from_iter(graph.iter().copied());
        Self {
            graph,
            index,
            exclusions: ExclusionSet::new(),
            lookup,
            area,
            endpoints: Vec::new(),
            pending: None,
        }
    }

    /// The street graph this session routes over.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The currently banned way ids.
    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    /// The endpoints selected so far, as (lat, lon) pairs.
    pub fn endpoints(&self) -> &[(f64, f64)] {
        &self.endpoints
    }

    /// Stores a route endpoint: the first accepted point becomes the
    /// start, the second the destination. Points outside the serviceable
    /// area are rejected.
    pub fn set_endpoint(&mut self, lat: f64, lon: f64) -> EndpointStatus {
        if self.endpoints.len() >= 2 {
            return EndpointStatus::AlreadySet;
        }
        if !self.area.contains(lat, lon) {
            return EndpointStatus::OutsideServiceArea;
        }
        self.endpoints.push((lat, lon));
        EndpointStatus::Accepted
    }

    /// Forgets both endpoints, so a new pair can be picked.
    pub fn clear_endpoints(&mut self) {
        self.endpoints.clear();
    }

    /// Computes the shortest route between the two selected endpoints
    /// under the current bans, snapping each endpoint to its nearest
    /// graph node.
    ///
    /// `Ok(None)` means no connecting route exists - an expected outcome,
    /// recoverable by clearing bans or picking different points.
    pub fn compute_route(&self) -> Result<Option<RouteSummary>, Error> {
        let &[(start_lat, start_lon), (end_lat, end_lon)] = self.endpoints.as_slice() else {
            return Err(Error::MissingEndpoints);
        };

        let index = self.index.as_ref().ok_or(Error::EmptyGraph)?;
        let start = index.find_nearest_node(start_lat, start_lon);
        let end = index.find_nearest_node(end_lat, end_lon);

        let nodes = find_route(
            &self.graph,
            start.id,
            end.id,
            &self.exclusions,
            DEFAULT_STEP_LIMIT,
        )?;
        if nodes.is_empty() {
            return Ok(None);
        }

        let (instructions, total_distance_m) = route_instructions(&self.graph, &nodes);
        Ok(Some(RouteSummary {
            nodes,
            instructions,
            total_distance_m,
        }))
    }

    /// Bans the given way ids directly, without confirmation.
    pub fn ban_segment<I: IntoIterator<Item = i64>>(&mut self, ids: I) {
        self.exclusions.extend(ids);
    }

    /// Bans every way matching the given road name, resolved through the
    /// lookup collaborator. Returns the number of newly banned way ids;
    /// a failed or empty lookup bans nothing.
    pub fn ban_by_name(&mut self, name: &str) -> usize {
        let ids = self.lookup.ways_named(name);
        ids.into_iter()
            .filter(|&id| self.exclusions.add(id))
            .count()
    }

    /// Lifts every ban.
    pub fn clear_bans(&mut self) {
        self.exclusions.clear();
    }

    /// Suggests the roads closest to the given point as ban candidates,
    /// nearest first. Edges that are already banned are filtered out, and
    /// the two directions of a two-way street collapse into one candidate.
    pub fn suggest_nearest_roads(&self, lat: f64, lon: f64) -> Vec<BanCandidate> {
        let mut seen: HashSet<(i64, i64)> = HashSet::default();

        nearest_edges(
            &self.graph,
            lat,
            lon,
            DEFAULT_SUGGESTIONS,
            DEFAULT_MAX_DISTANCE_M,
        )
        .into_iter()
        .filter(|m| !self.exclusions.bans_edge(&m.edge))
        .filter(|m| {
            let pair = (m.from.min(m.edge.to), m.from.max(m.edge.to));
            seen.insert(pair)
        })
        .map(|m| BanCandidate {
            way_ids: m.edge.way_ids,
            name: m.edge.names.into_iter().next(),
            length_m: m.edge.length,
            from: m.from,
            to: m.edge.to,
            geometry: m.edge.geometry,
            distance_m: m.distance_m,
        })
        .collect()
    }

    /// Stages a candidate for confirmation, replacing any previous one.
    pub fn propose_ban(&mut self, candidate: BanCandidate) {
        self.pending = Some(candidate);
    }

    /// The candidate currently awaiting confirmation, if any.
    pub fn pending_ban(&self) -> Option<&BanCandidate> {
        self.pending.as_ref()
    }

    /// Bans the ways of the staged candidate and returns it.
    /// A no-op when nothing is staged.
    pub fn confirm_ban(&mut self) -> Option<BanCandidate> {
        let candidate = self.pending.take()?;
        self.exclusions.extend(candidate.way_ids.iter().copied());
        Some(candidate)
    }

    /// Drops the staged candidate without banning anything.
    pub fn cancel_ban(&mut self) -> Option<BanCandidate> {
        self.pending.take()
    }
}
