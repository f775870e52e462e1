//! Per-agency dataset ingestion.
//!
//! Raw bytes from a [`DatasetProvider`] are decoded, each feature is mapped
//! through the adapter selected by its [`DatasetKind`], and the normalized
//! records are published to the [`BoundaryCache`](crate::cache::BoundaryCache)
//! by the [`DatasetLoader`].

mod error;
pub mod geojson;
mod loader;
mod provider;
mod schema;

use serde::{Deserialize, Serialize};

use crate::models::{AgencyType, DistrictBoundary, Facility};

pub use error::{DatasetError, FeatureError};
pub use loader::{DatasetLoader, LoadOutcome, LoaderStats};
pub use provider::{DatasetProvider, FileProvider, HttpProvider, SourceProvider};
pub use schema::parse_dataset;

/// External dataset variants, one adapter each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    FireDistricts,
    FireStations,
    PoliceStations,
    CoastGuardStations,
    Hospitals,
}

impl DatasetKind {
    pub fn all() -> &'static [DatasetKind] {
        &[
            DatasetKind::FireDistricts,
            DatasetKind::FireStations,
            DatasetKind::PoliceStations,
            DatasetKind::CoastGuardStations,
            DatasetKind::Hospitals,
        ]
    }

    /// Agency whose cache slot this dataset fills
    pub fn agency(&self) -> AgencyType {
        match self {
            DatasetKind::FireDistricts | DatasetKind::FireStations => AgencyType::Fire,
            DatasetKind::PoliceStations => AgencyType::Police,
            DatasetKind::CoastGuardStations => AgencyType::CoastGuard,
            DatasetKind::Hospitals => AgencyType::Hospital,
        }
    }

    /// Whether the dataset holds district polygons rather than facility points
    pub fn is_district(&self) -> bool {
        matches!(self, DatasetKind::FireDistricts)
    }

    pub fn label(&self) -> &'static str {
        match self {
            DatasetKind::FireDistricts => "fire_districts",
            DatasetKind::FireStations => "fire_stations",
            DatasetKind::PoliceStations => "police_stations",
            DatasetKind::CoastGuardStations => "coast_guard_stations",
            DatasetKind::Hospitals => "hospitals",
        }
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Normalized records of one dataset
#[derive(Debug, Clone)]
pub enum DatasetRecords {
    Districts(Vec<DistrictBoundary>),
    Facilities(Vec<Facility>),
}

impl DatasetRecords {
    pub fn len(&self) -> usize {
        match self {
            DatasetRecords::Districts(d) => d.len(),
            DatasetRecords::Facilities(f) => f.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of parsing one dataset payload
#[derive(Debug, Clone)]
pub struct ParseReport {
    pub records: DatasetRecords,
    /// Malformed features dropped during parsing
    pub skipped: usize,
}
