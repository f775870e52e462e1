//! One adapter per external schema.
//!
//! Each adapter maps one raw feature to one normalized record. Adapters are
//! selected by [`DatasetKind`]; a failing feature is logged, counted and
//! skipped.

use serde_json::Value;
use tracing::{debug, info};

use super::geojson::{
    decode_payload, feature_array, feature_geometry, nested_string, number_prop, properties,
    string_prop, string_value, FeatureGeometry,
};
use super::{DatasetError, DatasetKind, DatasetRecords, FeatureError, ParseReport};
use crate::models::{AgencyType, DistrictBoundary, Facility, GeoPoint};

type Adapter<T> = fn(&Value, usize) -> Result<T, FeatureError>;

/// Parse a raw payload for `kind` into normalized records
pub fn parse_dataset(kind: DatasetKind, bytes: &[u8]) -> Result<ParseReport, DatasetError> {
    let root = decode_payload(bytes)?;

    let report = match kind {
        DatasetKind::FireDistricts => {
            let (records, skipped) = collect(kind, feature_array(&root)?, fire_district);
            ParseReport {
                records: DatasetRecords::Districts(records),
                skipped,
            }
        }
        DatasetKind::FireStations => {
            let items = root.as_array().ok_or_else(|| {
                DatasetError::Format("station export must be a JSON array".to_string())
            })?;
            facilities(kind, items, fire_station)
        }
        DatasetKind::PoliceStations => facilities(kind, feature_array(&root)?, police_station),
        DatasetKind::CoastGuardStations => {
            facilities(kind, feature_array(&root)?, coast_guard_station)
        }
        DatasetKind::Hospitals => facilities(kind, feature_array(&root)?, hospital),
    };

    info!(
        "Parsed {} records from {} ({} malformed features skipped)",
        report.records.len(),
        kind,
        report.skipped
    );

    Ok(report)
}

fn facilities(kind: DatasetKind, items: &[Value], adapter: Adapter<Facility>) -> ParseReport {
    let (records, skipped) = collect(kind, items, adapter);
    ParseReport {
        records: DatasetRecords::Facilities(records),
        skipped,
    }
}

fn collect<T>(kind: DatasetKind, items: &[Value], adapter: Adapter<T>) -> (Vec<T>, usize) {
    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0;

    for (index, item) in items.iter().enumerate() {
        if !item.is_object() {
            debug!("Skipping {} feature #{}: {}", kind, index, FeatureError::NotAnObject);
            skipped += 1;
            continue;
        }
        match adapter(item, index) {
            Ok(record) => records.push(record),
            Err(e) => {
                debug!("Skipping {} feature #{}: {}", kind, index, e);
                skipped += 1;
            }
        }
    }

    (records, skipped)
}

fn point_geometry(feature: &Value) -> Result<GeoPoint, FeatureError> {
    match feature_geometry(feature)? {
        FeatureGeometry::Point(p) => Ok(p),
        FeatureGeometry::Area(g) => Err(FeatureError::UnsupportedGeometry(
            g.type_name().to_string(),
        )),
    }
}

fn feature_id(feature: &Value) -> Option<String> {
    feature.get("id").and_then(string_value)
}

/// Fire districts: `KOD_YPIR`, `ONOMA_YPIR`, `PERIFEREIA`, `EMBADO`
fn fire_district(feature: &Value, _index: usize) -> Result<DistrictBoundary, FeatureError> {
    let props = properties(feature);

    let station_id =
        string_prop(props, "KOD_YPIR").ok_or(FeatureError::MissingProperty("KOD_YPIR"))?;
    let station_name =
        string_prop(props, "ONOMA_YPIR").ok_or(FeatureError::MissingProperty("ONOMA_YPIR"))?;

    let geometry = match feature_geometry(feature)? {
        FeatureGeometry::Area(g) => g,
        FeatureGeometry::Point(_) => {
            return Err(FeatureError::UnsupportedGeometry("Point".to_string()))
        }
    };

    Ok(DistrictBoundary::new(
        station_id,
        station_name,
        string_prop(props, "PERIFEREIA"),
        number_prop(props, "EMBADO"),
        geometry,
    ))
}

/// Fire station repository export: plain records with `latitude`/`longitude`
fn fire_station(item: &Value, _index: usize) -> Result<Facility, FeatureError> {
    let id = item
        .get("id")
        .and_then(string_value)
        .ok_or(FeatureError::MissingProperty("id"))?;
    let name = item
        .get("name")
        .and_then(string_value)
        .ok_or(FeatureError::MissingProperty("name"))?;

    let latitude = item
        .get("latitude")
        .and_then(Value::as_f64)
        .ok_or(FeatureError::BadCoordinates("missing latitude"))?;
    let longitude = item
        .get("longitude")
        .and_then(Value::as_f64)
        .ok_or(FeatureError::BadCoordinates("missing longitude"))?;
    let location = GeoPoint::new(latitude, longitude);
    if !location.is_valid() {
        return Err(FeatureError::OutOfRange {
            lat: latitude,
            lon: longitude,
        });
    }

    let mut facility = Facility::new(id, name, location, AgencyType::Fire);
    facility.region = item.get("region").and_then(string_value);
    facility.phone = item.get("phone").and_then(string_value);
    Ok(facility)
}

/// Police: `name`, nested `address.street`/`address.city`, `prefecture`, `phone`
fn police_station(feature: &Value, index: usize) -> Result<Facility, FeatureError> {
    let props = properties(feature);
    let name = string_prop(props, "name").ok_or(FeatureError::MissingProperty("name"))?;
    let location = point_geometry(feature)?;
    let id = feature_id(feature).unwrap_or_else(|| format!("police-{}", index));

    let address = match (
        nested_string(props, &["address", "street"]),
        nested_string(props, &["address", "city"]),
    ) {
        (Some(street), Some(city)) => Some(format!("{}, {}", street, city)),
        (street, city) => street.or(city),
    };

    let mut facility = Facility::new(id, name, location, AgencyType::Police);
    facility.region = string_prop(props, "prefecture");
    facility.address = address;
    facility.phone = string_prop(props, "phone");
    Ok(facility)
}

/// Coast guard: `LIMENARXEIO`, `KODIKOS`, `DIEFTHINSI`, `NOMOS`, `TILEFONO`
fn coast_guard_station(feature: &Value, index: usize) -> Result<Facility, FeatureError> {
    let props = properties(feature);
    let name =
        string_prop(props, "LIMENARXEIO").ok_or(FeatureError::MissingProperty("LIMENARXEIO"))?;
    let location = point_geometry(feature)?;
    let id = string_prop(props, "KODIKOS")
        .or_else(|| feature_id(feature))
        .unwrap_or_else(|| format!("coast-guard-{}", index));

    let mut facility = Facility::new(id, name, location, AgencyType::CoastGuard);
    facility.region = string_prop(props, "NOMOS");
    facility.address = string_prop(props, "DIEFTHINSI");
    facility.phone = string_prop(props, "TILEFONO");
    Ok(facility)
}

/// Hospitals: `hospital_name`, `hospital_id`, `addr_full`, `health_region`, `contact.tel`
fn hospital(feature: &Value, index: usize) -> Result<Facility, FeatureError> {
    let props = properties(feature);
    let name = string_prop(props, "hospital_name")
        .ok_or(FeatureError::MissingProperty("hospital_name"))?;
    let location = point_geometry(feature)?;
    let id = string_prop(props, "hospital_id")
        .or_else(|| feature_id(feature))
        .unwrap_or_else(|| format!("hospital-{}", index));

    let mut facility = Facility::new(id, name, location, AgencyType::Hospital);
    facility.region = string_prop(props, "health_region");
    facility.address = string_prop(props, "addr_full");
    facility.phone = nested_string(props, &["contact", "tel"]);
    Ok(facility)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn districts(report: ParseReport) -> Vec<DistrictBoundary> {
        match report.records {
            DatasetRecords::Districts(d) => d,
            other => panic!("expected districts, got {other:?}"),
        }
    }

    fn facility_list(report: ParseReport) -> Vec<Facility> {
        match report.records {
            DatasetRecords::Facilities(f) => f,
            other => panic!("expected facilities, got {other:?}"),
        }
    }

    #[test]
    fn test_fire_districts() {
        let payload = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {
                        "KOD_YPIR": "101",
                        "ONOMA_YPIR": "1st Athens Fire Station",
                        "PERIFEREIA": "Attica",
                        "EMBADO": "12,75"
                    },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[23.70, 37.97], [23.75, 37.97], [23.75, 38.00], [23.70, 38.00], [23.70, 37.97]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": {"KOD_YPIR": 102, "ONOMA_YPIR": "Islands"},
                    "geometry": {
                        "type": "MultiPolygon",
                        "coordinates": [[[[23.4, 37.7], [23.5, 37.7], [23.5, 37.8], [23.4, 37.7]]]]
                    }
                }
            ]
        });

        let report = parse_dataset(DatasetKind::FireDistricts, payload.to_string().as_bytes()).unwrap();
        assert_eq!(report.skipped, 0);
        let districts = districts(report);
        assert_eq!(districts.len(), 2);
        assert_eq!(districts[0].station_id, "101");
        assert_eq!(districts[0].region.as_deref(), Some("Attica"));
        assert_eq!(districts[0].area, Some(12.75));
        assert_eq!(districts[1].station_id, "102");
        assert_eq!(districts[1].region, None);
        assert_eq!(districts[1].geometry.type_name(), "MultiPolygon");
    }

    #[test]
    fn test_malformed_feature_is_skipped() {
        let mut features: Vec<Value> = (0..4)
            .map(|i| {
                json!({
                    "type": "Feature",
                    "id": format!("H{i}"),
                    "properties": {"hospital_name": format!("Hospital {i}")},
                    "geometry": {"type": "Point", "coordinates": [23.7 + i as f64 * 0.01, 37.9]}
                })
            })
            .collect();
        features.insert(
            2,
            json!({
                "type": "Feature",
                "properties": {"hospital_name": "No coordinates"},
                "geometry": {"type": "Point"}
            }),
        );
        let payload = json!({"type": "FeatureCollection", "features": features});

        let report = parse_dataset(DatasetKind::Hospitals, payload.to_string().as_bytes()).unwrap();
        assert_eq!(report.skipped, 1);
        let hospitals = facility_list(report);
        assert_eq!(hospitals.len(), 4);
        assert!(hospitals.iter().all(|h| h.name != "No coordinates"));
        assert_eq!(hospitals[2].id, "H2");
    }

    #[test]
    fn test_fire_station_export() {
        let payload = json!([
            {"id": 7, "name": "Pagrati", "latitude": 37.968, "longitude": 23.746, "region": "Attica"},
            {"id": "8", "name": "Missing coords"},
            {"id": "9", "name": "Bad lat", "latitude": 123.0, "longitude": 23.0},
            "not an object"
        ]);
        let report = parse_dataset(DatasetKind::FireStations, payload.to_string().as_bytes()).unwrap();
        assert_eq!(report.skipped, 3);
        let stations = facility_list(report);
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id, "7");
        assert_eq!(stations[0].agency, AgencyType::Fire);
        assert_eq!(stations[0].region.as_deref(), Some("Attica"));
    }

    #[test]
    fn test_police_optional_fields() {
        let payload = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {
                        "name": "Exarchia Police Department",
                        "address": {"street": "Kallidromiou 20", "city": "Athens"},
                        "prefecture": "Attica"
                    },
                    "geometry": {"type": "Point", "coordinates": [23.737, 37.986]}
                },
                {
                    "type": "Feature",
                    "properties": {"name": "Syros Police"},
                    "geometry": {"type": "Point", "coordinates": [24.94, 37.44]}
                }
            ]
        });
        let report = parse_dataset(DatasetKind::PoliceStations, payload.to_string().as_bytes()).unwrap();
        let stations = facility_list(report);
        assert_eq!(stations[0].id, "police-0");
        assert_eq!(stations[0].address.as_deref(), Some("Kallidromiou 20, Athens"));
        assert_eq!(stations[1].id, "police-1");
        assert_eq!(stations[1].address, None);
        assert_eq!(stations[1].phone, None);
    }

    #[test]
    fn test_coast_guard_schema() {
        let payload = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {
                    "LIMENARXEIO": "Central Port Authority of Piraeus",
                    "KODIKOS": "KLP",
                    "NOMOS": "Attica",
                    "TILEFONO": "2104147800"
                },
                "geometry": {"type": "Point", "coordinates": [23.643, 37.941]}
            }]
        });
        let report =
            parse_dataset(DatasetKind::CoastGuardStations, payload.to_string().as_bytes()).unwrap();
        let stations = facility_list(report);
        assert_eq!(stations[0].id, "KLP");
        assert_eq!(stations[0].agency, AgencyType::CoastGuard);
        assert_eq!(stations[0].phone.as_deref(), Some("2104147800"));
    }

    #[test]
    fn test_facility_polygon_rejected() {
        let payload = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"name": "Area instead of point"},
                "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]}
            }]
        });
        let report = parse_dataset(DatasetKind::PoliceStations, payload.to_string().as_bytes()).unwrap();
        assert_eq!(report.skipped, 1);
        assert!(report.records.is_empty());
    }

    #[test]
    fn test_undecodable_payload_fails_whole_load() {
        assert!(matches!(
            parse_dataset(DatasetKind::FireDistricts, b"not json"),
            Err(DatasetError::Json(_))
        ));
        assert!(matches!(
            parse_dataset(DatasetKind::FireStations, br#"{"type": "FeatureCollection", "features": []}"#),
            Err(DatasetError::Format(_))
        ));
    }
}
