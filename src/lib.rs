//! Cedar - geographic station/district assignment for emergency agencies.
//!
//! This library provides the assignment engine shared by the server and
//! ingest binaries: dataset ingestion, district containment, nearest-station
//! fallback, boundary simplification and the snapshot cache they read from.

pub mod assign;
pub mod cache;
pub mod config;
pub mod dataset;
pub mod logging;
pub mod models;
pub mod nearest;
pub mod pip;
pub mod simplify;

pub use assign::Assigner;
pub use cache::{BoundaryCache, Snapshot};
pub use models::{AgencyType, AssignmentMethod, AssignmentResult, GeoPoint};
