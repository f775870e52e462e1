//! Loosely-typed GeoJSON reading.
//!
//! Geometry shape is always taken from the `type` discriminator first; the
//! coordinate nesting is then required to match it.

use std::io::Read;

use flate2::read::GzDecoder;
use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{Map, Value};

use super::{DatasetError, FeatureError};
use crate::models::{DistrictGeometry, GeoPoint};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Parsed feature geometry
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    Point(GeoPoint),
    Area(DistrictGeometry),
}

/// Decompress gzip payloads and parse JSON
pub fn decode_payload(bytes: &[u8]) -> Result<Value, DatasetError> {
    if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoded = Vec::new();
        GzDecoder::new(bytes)
            .read_to_end(&mut decoded)
            .map_err(DatasetError::Gzip)?;
        Ok(serde_json::from_slice(&decoded)?)
    } else {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// The `features` array of a FeatureCollection
pub fn feature_array(root: &Value) -> Result<&[Value], DatasetError> {
    match root.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        Some(other) => {
            return Err(DatasetError::Format(format!(
                "expected FeatureCollection, found {}",
                other
            )))
        }
        None => return Err(DatasetError::Format("missing top-level type".to_string())),
    }

    root.get("features")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| DatasetError::Format("FeatureCollection without features".to_string()))
}

/// Parse a GeoJSON geometry object
pub fn parse_geometry(geometry: &Value) -> Result<FeatureGeometry, FeatureError> {
    if geometry.is_null() {
        return Err(FeatureError::MissingGeometry);
    }

    let geo_type = geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or(FeatureError::MissingGeometryType)?;

    let coordinates = geometry
        .get("coordinates")
        .ok_or(FeatureError::BadCoordinates("missing coordinates"))?;

    match geo_type {
        "Point" => parse_position(coordinates).map(|c| FeatureGeometry::Point(GeoPoint::from(c))),
        "Polygon" => parse_polygon(coordinates)
            .map(|p| FeatureGeometry::Area(DistrictGeometry::Polygon(p))),
        "MultiPolygon" => {
            let polygons = coordinates
                .as_array()
                .ok_or(FeatureError::BadCoordinates("multipolygon is not an array"))?
                .iter()
                .map(parse_polygon)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(FeatureGeometry::Area(DistrictGeometry::MultiPolygon(
                MultiPolygon::new(polygons),
            )))
        }
        other => Err(FeatureError::UnsupportedGeometry(other.to_string())),
    }
}

/// `[lon, lat, ...]` with range validation
fn parse_position(value: &Value) -> Result<Coord<f64>, FeatureError> {
    let arr = value
        .as_array()
        .ok_or(FeatureError::BadCoordinates("position is not an array"))?;
    if arr.len() < 2 {
        return Err(FeatureError::BadCoordinates("position needs lon and lat"));
    }

    let lon = arr[0]
        .as_f64()
        .ok_or(FeatureError::BadCoordinates("longitude is not a number"))?;
    let lat = arr[1]
        .as_f64()
        .ok_or(FeatureError::BadCoordinates("latitude is not a number"))?;

    if !GeoPoint::new(lat, lon).is_valid() {
        return Err(FeatureError::OutOfRange { lat, lon });
    }

    Ok(Coord { x: lon, y: lat })
}

fn parse_ring(value: &Value) -> Result<LineString<f64>, FeatureError> {
    let coords = value
        .as_array()
        .ok_or(FeatureError::BadCoordinates("ring is not an array"))?
        .iter()
        .map(parse_position)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LineString::new(coords))
}

fn parse_polygon(value: &Value) -> Result<Polygon<f64>, FeatureError> {
    let rings = value
        .as_array()
        .ok_or(FeatureError::BadCoordinates("polygon is not an array"))?;

    let (exterior, holes) = rings
        .split_first()
        .ok_or(FeatureError::BadCoordinates("polygon has no exterior ring"))?;

    Ok(Polygon::new(
        parse_ring(exterior)?,
        holes.iter().map(parse_ring).collect::<Result<Vec<_>, _>>()?,
    ))
}

/// Feature geometry, or `MissingGeometry`
pub fn feature_geometry(feature: &Value) -> Result<FeatureGeometry, FeatureError> {
    parse_geometry(feature.get("geometry").unwrap_or(&Value::Null))
}

/// Feature properties; a missing or null `properties` reads as empty
pub fn properties(feature: &Value) -> Option<&Map<String, Value>> {
    feature.get("properties").and_then(Value::as_object)
}

/// Non-empty trimmed string, numbers rendered as text
pub fn string_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn string_prop(props: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    props?.get(key).and_then(string_value)
}

/// String under a nested object path, e.g. `["address", "street"]`
pub fn nested_string(props: Option<&Map<String, Value>>, path: &[&str]) -> Option<String> {
    let (first, rest) = path.split_first()?;
    let mut current = props?.get(*first)?;
    for key in rest {
        current = current.get(*key)?;
    }
    string_value(current)
}

/// Number, or numeric string (decimal comma accepted)
pub fn number_prop(props: Option<&Map<String, Value>>, key: &str) -> Option<f64> {
    let value = match props?.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_polygon_by_discriminator() {
        let g = json!({
            "type": "Polygon",
            "coordinates": [[[23.0, 37.0], [24.0, 37.0], [24.0, 38.0], [23.0, 37.0]]]
        });
        match parse_geometry(&g).unwrap() {
            FeatureGeometry::Area(DistrictGeometry::Polygon(p)) => {
                assert_eq!(p.exterior().0[1], Coord { x: 24.0, y: 37.0 });
                assert!(p.interiors().is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_multipolygon_by_discriminator() {
        let g = json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]]
            ]
        });
        match parse_geometry(&g).unwrap() {
            FeatureGeometry::Area(DistrictGeometry::MultiPolygon(mp)) => assert_eq!(mp.0.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_discriminator_mismatch_is_rejected() {
        // polygon nesting labelled as MultiPolygon
        let g = json!({
            "type": "MultiPolygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        });
        assert!(matches!(
            parse_geometry(&g),
            Err(FeatureError::BadCoordinates(_))
        ));
    }

    #[test]
    fn test_point_and_range_check() {
        let g = json!({"type": "Point", "coordinates": [23.7275, 37.9838]});
        assert_eq!(
            parse_geometry(&g).unwrap(),
            FeatureGeometry::Point(GeoPoint::new(37.9838, 23.7275))
        );

        let bad = json!({"type": "Point", "coordinates": [23.7, 137.9]});
        assert!(matches!(
            parse_geometry(&bad),
            Err(FeatureError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_missing_parts() {
        assert_eq!(
            parse_geometry(&Value::Null),
            Err(FeatureError::MissingGeometry)
        );
        assert_eq!(
            parse_geometry(&json!({"coordinates": [0.0, 0.0]})),
            Err(FeatureError::MissingGeometryType)
        );
        assert!(matches!(
            parse_geometry(&json!({"type": "Point"})),
            Err(FeatureError::BadCoordinates(_))
        ));
        assert_eq!(
            parse_geometry(&json!({"type": "LineString", "coordinates": []})),
            Err(FeatureError::UnsupportedGeometry("LineString".to_string()))
        );
    }

    #[test]
    fn test_property_helpers() {
        let feature = json!({
            "properties": {
                "name": "  Piraeus  ",
                "code": 42,
                "area": "12,5",
                "blank": "",
                "contact": {"tel": "210 1234567"}
            }
        });
        let props = properties(&feature);
        assert_eq!(string_prop(props, "name").as_deref(), Some("Piraeus"));
        assert_eq!(string_prop(props, "code").as_deref(), Some("42"));
        assert_eq!(string_prop(props, "blank"), None);
        assert_eq!(number_prop(props, "area"), Some(12.5));
        assert_eq!(
            nested_string(props, &["contact", "tel"]).as_deref(),
            Some("210 1234567")
        );
        assert_eq!(nested_string(props, &["contact", "fax"]), None);
        assert_eq!(string_prop(properties(&json!({})), "name"), None);
    }

    #[test]
    fn test_gzip_payload() {
        use flate2::{write::GzEncoder, Compression};
        use std::io::Write;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(br#"{"type": "FeatureCollection", "features": []}"#)
            .unwrap();
        let bytes = encoder.finish().unwrap();

        let root = decode_payload(&bytes).unwrap();
        assert!(feature_array(&root).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_container() {
        let root = json!({"type": "Feature"});
        assert!(matches!(feature_array(&root), Err(DatasetError::Format(_))));
    }
}
