//! Great-circle nearest-facility search.

use crate::models::{Facility, GeoPoint};

/// Mean Earth radius in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two points in meters
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // rounding can push h a hair past 1 for antipodal points
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_METERS * c
}

/// Closest facility to `point` with its distance in meters.
///
/// Ties keep the first facility encountered.
pub fn nearest<'a>(point: &GeoPoint, facilities: &'a [Facility]) -> Option<(&'a Facility, f64)> {
    let mut best: Option<(&Facility, f64)> = None;

    for facility in facilities {
        let distance = haversine_distance(point, &facility.location);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((facility, distance)),
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgencyType;

    fn facility(id: &str, lat: f64, lon: f64) -> Facility {
        Facility::new(
            id.into(),
            format!("Station {id}"),
            GeoPoint::new(lat, lon),
            AgencyType::Fire,
        )
    }

    #[test]
    fn test_known_distance() {
        // Athens (Syntagma) to Piraeus port, roughly 8.6 km
        let syntagma = GeoPoint::new(37.9755, 23.7348);
        let piraeus = GeoPoint::new(37.9420, 23.6465);
        let d = haversine_distance(&syntagma, &piraeus);
        assert!((8_000.0..9_000.0).contains(&d), "{d}");
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = haversine_distance(&GeoPoint::new(0.0, 0.0), &GeoPoint::new(1.0, 0.0));
        let expected = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn test_symmetry() {
        let a = GeoPoint::new(37.9838, 23.7275);
        let b = GeoPoint::new(40.6401, 22.9444);
        assert_eq!(haversine_distance(&a, &b), haversine_distance(&b, &a));
    }

    #[test]
    fn test_antipodal_points() {
        let d = haversine_distance(&GeoPoint::new(0.0, 0.0), &GeoPoint::new(0.0, 180.0));
        assert!((d - EARTH_RADIUS_METERS * std::f64::consts::PI).abs() < 1e-3);
    }

    #[test]
    fn test_single_facility() {
        let stations = vec![facility("1", 37.9838, 23.7275)];
        let (found, distance) = nearest(&GeoPoint::new(37.9838, 23.7275), &stations).unwrap();
        assert_eq!(found.id, "1");
        assert!(distance.abs() < 1e-6);

        let query = GeoPoint::new(38.0, 23.8);
        let (_, distance) = nearest(&query, &stations).unwrap();
        assert_eq!(distance, haversine_distance(&query, &stations[0].location));
    }

    #[test]
    fn test_picks_minimum() {
        let stations = vec![
            facility("far", 40.0, 20.0),
            facility("near", 38.0, 23.7),
            facility("mid", 39.0, 23.0),
        ];
        let (found, _) = nearest(&GeoPoint::new(37.98, 23.72), &stations).unwrap();
        assert_eq!(found.id, "near");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let stations = vec![facility("first", 1.0, 0.0), facility("second", -1.0, 0.0)];
        let (found, _) = nearest(&GeoPoint::new(0.0, 0.0), &stations).unwrap();
        assert_eq!(found.id, "first");
    }

    #[test]
    fn test_empty_list() {
        assert!(nearest(&GeoPoint::new(0.0, 0.0), &[]).is_none());
    }
}
