//! Polygon, multipolygon and district containment.

use geo_types::{Coord, Polygon, Rect};
use tracing::debug;

use super::ring::ring_contains;
use crate::models::{DistrictBoundary, DistrictGeometry, GeoPoint};

/// Inside the exterior ring and not inside any hole
pub fn polygon_contains(point: Coord<f64>, polygon: &Polygon<f64>) -> bool {
    ring_contains(point, polygon.exterior())
        && !polygon
            .interiors()
            .iter()
            .any(|hole| ring_contains(point, hole))
}

/// Whether `geometry` contains `point`.
///
/// Multipolygons are tested polygon by polygon in input order; an empty
/// multipolygon contains nothing.
pub fn contains(point: &GeoPoint, geometry: &DistrictGeometry) -> bool {
    let coord = point.to_coord();
    geometry
        .polygons()
        .iter()
        .any(|polygon| polygon_contains(coord, polygon))
}

/// Inclusive envelope check; never rejects a point the ray cast would accept
fn envelope_admits(envelope: Option<&Rect<f64>>, point: Coord<f64>) -> bool {
    match envelope {
        Some(rect) => {
            point.x >= rect.min().x
                && point.x <= rect.max().x
                && point.y >= rect.min().y
                && point.y <= rect.max().y
        }
        None => false,
    }
}

/// First district (in dataset order) whose geometry contains `point`
pub fn find_district<'a>(
    point: &GeoPoint,
    districts: &'a [DistrictBoundary],
) -> Option<&'a DistrictBoundary> {
    let coord = point.to_coord();

    let found = districts.iter().find(|district| {
        district
            .polygons_with_envelopes()
            .any(|(polygon, envelope)| {
                envelope_admits(envelope, coord) && polygon_contains(coord, polygon)
            })
    });

    debug!(
        "PIP lookup at ({}, {}) over {} districts: {:?}",
        point.latitude,
        point.longitude,
        districts.len(),
        found.map(|d| d.station_id.as_str())
    );

    found
}
