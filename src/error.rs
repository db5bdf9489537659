// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Error conditions raised outside of route search;
/// see [RouteError](crate::RouteError) for the search's own errors.
///
/// Only [Error::DataUnavailable] and [Error::EmptyGraph] are fatal to an
/// interactive session. Name-lookup and boundary failures never surface
/// here - those collaborators degrade to empty results instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Neither the snapshot nor the Overpass download produced a usable
    /// street network. Fatal at startup.
    #[error("street network unavailable: {0}")]
    DataUnavailable(String),

    /// A nearest-node query ran against a graph with no nodes,
    /// which indicates corrupt data.
    #[error("street network has no nodes")]
    EmptyGraph,

    /// A route was requested before both endpoints were set.
    #[error("both route endpoints must be set")]
    MissingEndpoints,

    #[error("route search failed: {0}")]
    Route(#[from] crate::RouteError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}
