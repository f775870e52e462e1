//! Station assignment: district containment first, nearest station second.

use std::sync::Arc;

use rayon::prelude::*;
use serde_json::{json, Value};
use tracing::debug;

use crate::cache::{BoundaryCache, Snapshot};
use crate::models::assignment::{MSG_INVALID_COORDINATES, MSG_NO_STATION_DATA, MSG_UNKNOWN_AGENCY};
use crate::models::{AgencyType, AssignmentRequest, AssignmentResult, DistrictGeometry, GeoPoint};
use crate::nearest::nearest;
use crate::pip::find_district;
use crate::simplify::simplify_geometry;

/// Assign against one fixed snapshot
pub fn assign_in(snapshot: &Snapshot, point: &GeoPoint, agency: AgencyType) -> AssignmentResult {
    if !point.is_valid() {
        return AssignmentResult::not_found(MSG_INVALID_COORDINATES);
    }

    let districts = snapshot.districts(agency);
    if !districts.is_empty() {
        if let Some(district) = find_district(point, districts) {
            return AssignmentResult::district(district);
        }
    }

    match nearest(point, snapshot.facilities(agency)) {
        Some((facility, distance)) => AssignmentResult::nearest(facility, distance),
        None => AssignmentResult::not_found(MSG_NO_STATION_DATA),
    }
}

/// Read-only query front over the boundary cache
#[derive(Clone)]
pub struct Assigner {
    cache: Arc<BoundaryCache>,
}

impl Assigner {
    pub fn new(cache: Arc<BoundaryCache>) -> Self {
        Self { cache }
    }

    /// Suggest the responsible station for an incident at `point`
    pub fn assign(&self, point: GeoPoint, agency: AgencyType) -> AssignmentResult {
        let snapshot = self.cache.snapshot();
        let result = assign_in(&snapshot, &point, agency);
        debug!(
            "assign ({}, {}) {} -> {:?} {:?} (generation {})",
            point.latitude,
            point.longitude,
            agency,
            result.method,
            result.station_id,
            snapshot.generation()
        );
        result
    }

    /// Like [`assign`](Self::assign), with the agency given as a label
    pub fn assign_str(&self, latitude: f64, longitude: f64, agency: &str) -> AssignmentResult {
        match parse_agency(agency) {
            Some(agency) => self.assign(GeoPoint::new(latitude, longitude), agency),
            None => AssignmentResult::not_found(MSG_UNKNOWN_AGENCY),
        }
    }

    /// Evaluate many requests against a single snapshot, in parallel.
    /// Results keep the request order; an unknown agency only fails its own
    /// item.
    pub fn assign_batch(&self, requests: &[AssignmentRequest]) -> Vec<AssignmentResult> {
        let snapshot = self.cache.snapshot();
        requests
            .par_iter()
            .map(|req| match parse_agency(&req.agency_type) {
                Some(agency) => assign_in(
                    &snapshot,
                    &GeoPoint::new(req.latitude, req.longitude),
                    agency,
                ),
                None => AssignmentResult::not_found(MSG_UNKNOWN_AGENCY),
            })
            .collect()
    }

    /// Districts of `agency` as a GeoJSON FeatureCollection, simplified for
    /// rendering
    pub fn simplified_boundaries(&self, agency: AgencyType, tolerance: f64) -> Value {
        let snapshot = self.cache.snapshot();
        let features: Vec<Value> = snapshot
            .districts(agency)
            .iter()
            .map(|district| {
                json!({
                    "type": "Feature",
                    "id": district.station_id,
                    "properties": {
                        "stationId": district.station_id,
                        "stationName": district.station_name,
                        "region": district.region,
                        "area": district.area,
                    },
                    "geometry": geometry_json(&simplify_geometry(&district.geometry, tolerance)),
                })
            })
            .collect();

        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }
}

fn parse_agency(label: &str) -> Option<AgencyType> {
    match label.parse::<AgencyType>() {
        Ok(agency) => Some(agency),
        Err(e) => {
            debug!("{}", e);
            None
        }
    }
}

fn polygon_json(polygon: &geo_types::Polygon<f64>) -> Value {
    let ring = |ls: &geo_types::LineString<f64>| -> Vec<[f64; 2]> {
        ls.coords().map(|c| [c.x, c.y]).collect()
    };
    let mut rings = vec![ring(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(ring));
    json!(rings)
}

fn geometry_json(geometry: &DistrictGeometry) -> Value {
    match geometry {
        DistrictGeometry::Polygon(p) => json!({
            "type": "Polygon",
            "coordinates": polygon_json(p),
        }),
        DistrictGeometry::MultiPolygon(mp) => json!({
            "type": "MultiPolygon",
            "coordinates": mp.0.iter().map(polygon_json).collect::<Vec<_>>(),
        }),
    }
}
