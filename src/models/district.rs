//! District boundaries and point facilities.

use geo::BoundingRect;
use geo_types::{MultiPolygon, Polygon, Rect};
use serde::{Deserialize, Serialize};

use super::{AgencyType, GeoPoint};

/// District geometry, resolved from an explicit type discriminator
#[derive(Debug, Clone, PartialEq)]
pub enum DistrictGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl DistrictGeometry {
    /// Polygons in input order
    pub fn polygons(&self) -> &[Polygon<f64>] {
        match self {
            DistrictGeometry::Polygon(p) => std::slice::from_ref(p),
            DistrictGeometry::MultiPolygon(mp) => &mp.0,
        }
    }

    /// GeoJSON type name
    pub fn type_name(&self) -> &'static str {
        match self {
            DistrictGeometry::Polygon(_) => "Polygon",
            DistrictGeometry::MultiPolygon(_) => "MultiPolygon",
        }
    }
}

/// A district polygon administratively assigned to one station
#[derive(Debug, Clone)]
pub struct DistrictBoundary {
    pub station_id: String,
    pub station_name: String,
    pub region: Option<String>,
    /// Surface area in km², when the source carries it
    pub area: Option<f64>,
    pub geometry: DistrictGeometry,
    /// Bounding box per polygon, same order as `geometry.polygons()`
    envelopes: Vec<Option<Rect<f64>>>,
}

impl DistrictBoundary {
    pub fn new(
        station_id: String,
        station_name: String,
        region: Option<String>,
        area: Option<f64>,
        geometry: DistrictGeometry,
    ) -> Self {
        let envelopes = geometry
            .polygons()
            .iter()
            .map(|p| p.bounding_rect())
            .collect();

        Self {
            station_id,
            station_name,
            region,
            area,
            geometry,
            envelopes,
        }
    }

    /// Polygons paired with their bounding boxes (`None` for empty polygons)
    pub fn polygons_with_envelopes(
        &self,
    ) -> impl Iterator<Item = (&Polygon<f64>, Option<&Rect<f64>>)> {
        self.geometry
            .polygons()
            .iter()
            .zip(self.envelopes.iter().map(Option::as_ref))
    }

    /// Bounding box of the whole district as (min_lon, min_lat, max_lon, max_lat)
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.envelopes
            .iter()
            .flatten()
            .map(|r| (r.min().x, r.min().y, r.max().x, r.max().y))
            .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
    }
}

/// A point location representing a single agency outpost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: String,
    pub name: String,
    pub location: GeoPoint,
    pub agency: AgencyType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Facility {
    pub fn new(id: String, name: String, location: GeoPoint, agency: AgencyType) -> Self {
        Self {
            id,
            name,
            location,
            agency,
            region: None,
            address: None,
            phone: None,
        }
    }
}
