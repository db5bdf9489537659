// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::path::Path;

use crate::{osm, snapshot, Error, Graph, OverpassClient};

/// The ward covered by the demo deployment.
pub const DEFAULT_PLACE: &str = "Giảng Võ, Ba Đình, Hà Nội";

/// Loads the street graph from the snapshot at `snapshot_path` when that
/// file exists; otherwise downloads the network of `place` through the
/// provided Overpass client, builds the graph and writes the snapshot for
/// the next run (a failed write is logged, not fatal).
///
/// Fails with [Error::DataUnavailable] when neither source can produce a
/// non-empty graph.
pub fn load_or_download<P: AsRef<Path>>(
    snapshot_path: P,
    place: &str,
    client: &OverpassClient,
) -> Result<Graph, Error> {
    let snapshot_path = snapshot_path.as_ref();

    if snapshot_path.exists() {
        match snapshot::load(snapshot_path) {
            Ok(g) if !g.is_empty() => {
                log::info!(
                    "loaded {} street network nodes from {}",
                    g.len(),
                    snapshot_path.display()
                );
                return Ok(g);
            }
            Ok(_) => log::warn!(
                "snapshot {} holds an empty graph - re-downloading",
                snapshot_path.display()
            ),
            Err(e) => log::warn!(
                "failed to load snapshot {}: {e} - re-downloading",
                snapshot_path.display()
            ),
        }
    }

    let data = client
        .download_network(place)
        .map_err(|e| Error::DataUnavailable(format!("download for {place:?} failed: {e}")))?;

    let mut g = Graph::default();
    let options = osm::Options {
        file_format: osm::FileFormat::Xml,
        bbox: [0.0; 4],
    };
    osm::add_features_from_buffer(&mut g, &options, &data)
        .map_err(|e| Error::DataUnavailable(format!("downloaded network is not parseable: {e}")))?;

    if g.is_empty() {
        return Err(Error::DataUnavailable(format!(
            "no routable streets found for {place:?}"
        )));
    }

    log::info!("built a street network with {} nodes", g.len());
    if let Err(e) = snapshot::save(&g, snapshot_path) {
        log::warn!("failed to write snapshot {}: {e}", snapshot_path.display());
    }

    Ok(g)
}

/// Builds the street graph from a local OSM extract
/// (plain, gzip or bzip2 compressed XML).
pub fn load_from_osm_file<P: AsRef<Path>>(path: P) -> Result<Graph, Error> {
    let path = path.as_ref();
    let mut g = Graph::default();
    let options = osm::Options {
        file_format: osm::FileFormat::from_path(path),
        bbox: [0.0; 4],
    };

    osm::add_features_from_file(&mut g, &options, path)
        .map_err(|e| Error::DataUnavailable(format!("failed to parse {}: {e}", path.display())))?;

    if g.is_empty() {
        return Err(Error::DataUnavailable(format!(
            "no routable streets found in {}",
            path.display()
        )));
    }

    Ok(g)
}
