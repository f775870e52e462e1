//! Agency types and geographic points.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Emergency agency a station belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum AgencyType {
    Fire,
    Police,
    CoastGuard,
    Hospital,
}

impl AgencyType {
    /// All agency types in a stable order
    pub fn all() -> &'static [AgencyType] {
        &[
            AgencyType::Fire,
            AgencyType::Police,
            AgencyType::CoastGuard,
            AgencyType::Hospital,
        ]
    }

    /// Label used in URLs and logs
    pub fn label(&self) -> &'static str {
        match self {
            AgencyType::Fire => "fire",
            AgencyType::Police => "police",
            AgencyType::CoastGuard => "coast_guard",
            AgencyType::Hospital => "hospital",
        }
    }
}

impl std::fmt::Display for AgencyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown agency type: {0}")]
pub struct UnknownAgency(pub String);

impl FromStr for AgencyType {
    type Err = UnknownAgency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fire" => Ok(AgencyType::Fire),
            "police" => Ok(AgencyType::Police),
            "coast_guard" | "coastguard" | "coast-guard" => Ok(AgencyType::CoastGuard),
            "hospital" => Ok(AgencyType::Hospital),
            _ => Err(UnknownAgency(s.to_string())),
        }
    }
}

/// Geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether the point lies within the valid latitude/longitude ranges.
    ///
    /// NaN and infinite components are rejected.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Planar coordinate with `x = longitude`, `y = latitude`
    pub fn to_coord(self) -> geo_types::Coord<f64> {
        geo_types::Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }
}

impl From<geo_types::Coord<f64>> for GeoPoint {
    fn from(c: geo_types::Coord<f64>) -> Self {
        Self {
            latitude: c.y,
            longitude: c.x,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_ranges() {
        assert!(GeoPoint::new(37.9838, 23.7275).is_valid());
        assert!(GeoPoint::new(90.0, -180.0).is_valid());
        assert!(!GeoPoint::new(90.1, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 180.5).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_agency_parse() {
        assert_eq!("Fire".parse::<AgencyType>(), Ok(AgencyType::Fire));
        assert_eq!(
            "coast-guard".parse::<AgencyType>(),
            Ok(AgencyType::CoastGuard)
        );
        assert_eq!(" HOSPITAL ".parse::<AgencyType>(), Ok(AgencyType::Hospital));
        assert!("ambulance".parse::<AgencyType>().is_err());
    }
}
