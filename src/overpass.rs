// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! [Overpass API](https://wiki.openstreetmap.org/wiki/Overpass_API) collaborators:
//! downloading the ward's street network and resolving road names to way ids.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::Error;

/// Public Overpass API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Timeout for name lookups, mirrored in the query header.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(25);

/// Timeout for whole-ward network downloads, which Overpass
/// takes much longer to assemble.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(180);

/// Resolves a road name to the set of OSM way ids carrying it.
///
/// This is the seam for the network-backed lookup: the interactive layer
/// only depends on this trait, so tests can substitute a canned
/// implementation for [OverpassClient].
pub trait SegmentLookup {
    /// Returns the ids of all ways matching the given road name.
    /// An empty vector means "nothing matched", including lookup failures.
    fn ways_named(&mut self, name: &str) -> Vec<i64>;
}

#[derive(Debug, Deserialize)]
struct Response {
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    id: i64,
}

/// A blocking Overpass API client scoped to one administrative area.
///
/// Name lookups are memoized for the lifetime of the client - the ward's
/// street names are a small, static dataset, so there is no eviction.
pub struct OverpassClient {
    endpoint: String,
    area: String,
    http: reqwest::blocking::Client,
    cache: HashMap<String, Vec<i64>>,
}

impl OverpassClient {
    /// Creates a client whose name lookups are scoped to the given
    /// administrative area (e.g. "Hà Nội").
    pub fn new(area: &str) -> Result<Self, Error> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("wardnav/", env!("CARGO_PKG_VERSION")))
            .timeout(DOWNLOAD_TIMEOUT)
            .build()?;

        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            area: area.to_string(),
            http,
            cache: HashMap::default(),
        })
    }

    /// Overrides the Overpass API endpoint, e.g. to point at a mirror.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    /// Downloads the OSM XML street network of the given place.
    ///
    /// The result can be fed straight into
    /// [osm::add_features_from_buffer](crate::osm::add_features_from_buffer).
    pub fn download_network(&self, place: &str) -> Result<Vec<u8>, Error> {
        let query = format!(
            "[out:xml][timeout:180];\
             area[\"name\"=\"{place}\"]->.searchArea;\
             way[\"highway\"](area.searchArea);\
             (._;>;);\
             out body;"
        );

        log::info!("downloading the street network of {place:?}");
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("data", query.as_str())])
            .send()?
            .error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }

    /// Runs a single name-lookup query, without caching or retries.
    fn query_ways(&self, name: &str) -> Result<Vec<i64>, Error> {
        let body = self
            .http
            .get(&self.endpoint)
            .query(&[("data", name_query(&self.area, name).as_str())])
            .timeout(LOOKUP_TIMEOUT)
            .send()?
            .error_for_status()?
            .text()?;
        parse_way_ids(&body)
    }

    fn query_ways_with_retry(&self, name: &str) -> Result<Vec<i64>, Error> {
        match self.query_ways(name) {
            // A single transparent retry on transient transport failures
            Err(Error::Http(e)) if e.is_timeout() || e.is_connect() => {
                log::debug!("retrying road name lookup for {name:?}: {e}");
                self.query_ways(name)
            }
            other => other,
        }
    }
}

impl SegmentLookup for OverpassClient {
    /// Returns the ids of all ways inside the client's area which match the
    /// given road name exactly, case-insensitively, or as a substring.
    ///
    /// Successful results are memoized per name. A persistent lookup
    /// failure logs a warning and resolves to an empty vector (banning
    /// nothing), so a flaky Overpass never blocks the rest of the session.
    fn ways_named(&mut self, name: &str) -> Vec<i64> {
        if let Some(ids) = self.cache.get(name) {
            return ids.clone();
        }

        match self.query_ways_with_retry(name) {
            Ok(ids) => {
                log::debug!("road name {name:?} resolved to {} way(s)", ids.len());
                self.cache.insert(name.to_string(), ids.clone());
                ids
            }
            Err(e) => {
                log::warn!("road name lookup for {name:?} failed: {e}");
                vec![]
            }
        }
    }
}

/// Builds the Overpass query resolving a road name inside an area:
/// the union of an exact, a case-insensitive exact and a substring match.
fn name_query(area: &str, name: &str) -> String {
    format!(
        "[out:json][timeout:25];\
         area[\"name\"=\"{area}\"]->.searchArea;\
         (\
           way[\"name\"=\"{name}\"](area.searchArea);\
           way[\"name\"~\"^{name}$\",i](area.searchArea);\
           way[\"name\"~\"{name}\",i](area.searchArea);\
         );\
         out ids;"
    )
}

fn parse_way_ids(body: &str) -> Result<Vec<i64>, Error> {
    let response: Response = serde_json::from_str(body)?;
    Ok(response.elements.into_iter().map(|e| e.id).collect())
}
