// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Service-area boundary validation.
//!
//! Route endpoints must lie inside the ward the network was built for;
//! the ward polygon comes from Nominatim. When the polygon cannot be
//! fetched the check fails open and accepts every point - an unreachable
//! geocoder should not take the whole routing demo down with it.

use std::time::Duration;

use geo::{Contains, MultiPolygon, Point};

use crate::Error;

/// Public Nominatim search endpoint.
pub const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";

const FETCH_TIMEOUT: Duration = Duration::from_secs(25);

/// The polygon of the serviceable area, or the lack thereof.
#[derive(Debug, Clone, Default)]
pub struct ServiceArea {
    polygon: Option<MultiPolygon<f64>>,
}

impl ServiceArea {
    /// An area without a polygon, which accepts every point.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// An area bounded by the provided polygon.
    pub fn from_polygon(polygon: MultiPolygon<f64>) -> Self {
        Self {
            polygon: Some(polygon),
        }
    }

    /// Fetches the boundary polygon of the named place from Nominatim.
    ///
    /// This never fails: lookup problems are logged and produce an
    /// unbounded (fail-open) area instead.
    pub fn fetch(place: &str) -> Self {
        match fetch_polygon(place) {
            Ok(Some(polygon)) => Self::from_polygon(polygon),
            Ok(None) => {
                log::warn!("no boundary polygon found for {place:?} - accepting all points");
                Self::unbounded()
            }
            Err(e) => {
                log::warn!("boundary lookup for {place:?} failed: {e} - accepting all points");
                Self::unbounded()
            }
        }
    }

    /// Checks whether the given position lies in the serviceable area.
    /// Unconditionally true for unbounded areas.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        match &self.polygon {
            Some(polygon) => polygon.contains(&Point::new(lon, lat)),
            None => true,
        }
    }

    /// Returns true when an actual polygon backs this area.
    pub fn is_bounded(&self) -> bool {
        self.polygon.is_some()
    }
}

fn fetch_polygon(place: &str) -> Result<Option<MultiPolygon<f64>>, Error> {
    let http = reqwest::blocking::Client::builder()
        .user_agent(concat!("wardnav/", env!("CARGO_PKG_VERSION")))
        .timeout(FETCH_TIMEOUT)
        .build()?;

    let body = http
        .get(NOMINATIM_ENDPOINT)
        .query(&[
            ("q", place),
            ("format", "geojson"),
            ("polygon_geojson", "1"),
            ("limit", "1"),
        ])
        .send()?
        .error_for_status()?
        .text()?;

    parse_polygon(&body)
}

/// Extracts the first (multi)polygon from a GeoJSON search response.
fn parse_polygon(body: &str) -> Result<Option<MultiPolygon<f64>>, Error> {
    let geojson::GeoJson::FeatureCollection(collection) = body.parse()? else {
        return Ok(None);
    };

    for feature in collection.features {
        let Some(geometry) = feature.geometry else {
            continue;
        };
        match geo::Geometry::<f64>::try_from(geometry) {
            Ok(geo::Geometry::Polygon(p)) => return Ok(Some(MultiPolygon::new(vec![p]))),
            Ok(geo::Geometry::MultiPolygon(mp)) => return Ok(Some(mp)),
            // Nominatim may answer with a point or a linestring for
            // places that have no area; those cannot bound anything.
            _ => continue,
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A 0.02° × 0.02° square around central Ba Đình.
    const SQUARE_GEOJSON: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"display_name": "Giảng Võ, Ba Đình"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [105.81, 21.02],
                    [105.83, 21.02],
                    [105.83, 21.04],
                    [105.81, 21.04],
                    [105.81, 21.02]
                ]]
            }
        }]
    }"#;

    #[test]
    fn points_are_classified_against_the_polygon() {
        let polygon = parse_polygon(SQUARE_GEOJSON).unwrap().unwrap();
        let area = ServiceArea::from_polygon(polygon);

        assert!(area.is_bounded());
        assert!(area.contains(21.03, 105.82));
        assert!(!area.contains(21.05, 105.82));
        assert!(!area.contains(21.03, 105.85));
    }

    #[test]
    fn unbounded_areas_accept_everything() {
        let area = ServiceArea::unbounded();
        assert!(!area.is_bounded());
        assert!(area.contains(21.03, 105.82));
        assert!(area.contains(-89.0, 179.0));
    }

    #[test]
    fn non_area_responses_produce_no_polygon() {
        let point_response = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {},
                "geometry": {"type": "Point", "coordinates": [105.82, 21.03]}
            }]
        }"#;
        assert!(parse_polygon(point_response).unwrap().is_none());

        let empty = r#"{"type": "FeatureCollection", "features": []}"#;
        assert!(parse_polygon(empty).unwrap().is_none());
    }

    #[test]
    fn malformed_responses_are_an_error() {
        assert!(parse_polygon("not geojson at all").is_err());
    }
}
