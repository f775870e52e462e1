//! Assignment request and result types.
//!
//! The serialized field names follow what the incident workflow persists:
//! `stationId`, `stationName`, `assignmentMethod`, `distance`, `districtName`.

use serde::{Deserialize, Serialize};

use super::{AgencyType, DistrictBoundary, Facility};

pub const MSG_INVALID_COORDINATES: &str = "invalid coordinates";
pub const MSG_NO_STATION_DATA: &str = "no station data available";
pub const MSG_UNKNOWN_AGENCY: &str = "unknown agency type";
pub const MSG_DISTRICT_MATCH: &str = "point lies within a station district";
pub const MSG_NEAREST_MATCH: &str = "nearest station by great-circle distance";

/// How a station was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentMethod {
    District,
    Nearest,
    None,
}

/// One assignment query. The agency stays a raw label so an unknown one
/// yields a negative result for that item only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub agency_type: String,
}

impl AssignmentRequest {
    pub fn new(latitude: f64, longitude: f64, agency: AgencyType) -> Self {
        Self {
            latitude,
            longitude,
            agency_type: agency.label().to_string(),
        }
    }
}

/// Suggested station for an incident
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResult {
    pub found: bool,

    #[serde(rename = "assignmentMethod")]
    pub method: AssignmentMethod,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_name: Option<String>,

    /// Region of the matched district
    #[serde(rename = "districtName", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Meters; zero for district matches
    #[serde(rename = "distance", skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,

    pub message: String,
}

impl AssignmentResult {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            found: false,
            method: AssignmentMethod::None,
            station_id: None,
            station_name: None,
            region: None,
            distance_meters: None,
            message: message.into(),
        }
    }

    pub fn district(district: &DistrictBoundary) -> Self {
        Self {
            found: true,
            method: AssignmentMethod::District,
            station_id: Some(district.station_id.clone()),
            station_name: Some(district.station_name.clone()),
            region: district.region.clone(),
            distance_meters: Some(0.0),
            message: MSG_DISTRICT_MATCH.to_string(),
        }
    }

    pub fn nearest(facility: &Facility, distance_meters: f64) -> Self {
        Self {
            found: true,
            method: AssignmentMethod::Nearest,
            station_id: Some(facility.id.clone()),
            station_name: Some(facility.name.clone()),
            region: None,
            distance_meters: Some(distance_meters),
            message: MSG_NEAREST_MATCH.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;

    #[test]
    fn test_serialized_field_names() {
        let facility = Facility::new(
            "PS-7".into(),
            "Omonoia Police".into(),
            GeoPoint::new(37.98, 23.72),
            AgencyType::Police,
        );
        let json = serde_json::to_value(AssignmentResult::nearest(&facility, 812.5)).unwrap();

        assert_eq!(json["found"], true);
        assert_eq!(json["assignmentMethod"], "Nearest");
        assert_eq!(json["stationId"], "PS-7");
        assert_eq!(json["stationName"], "Omonoia Police");
        assert_eq!(json["distance"], 812.5);
        assert!(json.get("districtName").is_none());
    }

    #[test]
    fn test_not_found_shape() {
        let json = serde_json::to_value(AssignmentResult::not_found(MSG_INVALID_COORDINATES))
            .unwrap();
        assert_eq!(json["found"], false);
        assert_eq!(json["assignmentMethod"], "None");
        assert_eq!(json["message"], "invalid coordinates");
        assert!(json.get("stationId").is_none());
    }

    #[test]
    fn test_request_accepts_camel_case() {
        let req: AssignmentRequest = serde_json::from_str(
            r#"{"latitude": 37.9, "longitude": 23.7, "agencyType": "CoastGuard"}"#,
        )
        .unwrap();
        assert_eq!(req.agency_type.parse::<AgencyType>(), Ok(AgencyType::CoastGuard));
    }

    #[test]
    fn test_request_batch_keeps_unknown_labels() {
        let reqs: Vec<AssignmentRequest> = serde_json::from_str(
            r#"[{"latitude": 37.9, "longitude": 23.7, "agencyType": "Fire"},
                {"latitude": 37.9, "longitude": 23.7, "agencyType": "Ambulance"},
                {"latitude": 37.9, "longitude": 23.7, "agencyType": "fire"}]"#,
        )
        .unwrap();
        assert_eq!(reqs.len(), 3);
        assert_eq!(reqs[1].agency_type, "Ambulance");
    }
}
