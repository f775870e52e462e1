//! Core data models for station assignment.

pub mod agency;
pub mod assignment;
pub mod district;

pub use agency::{AgencyType, GeoPoint, UnknownAgency};
pub use assignment::{AssignmentMethod, AssignmentRequest, AssignmentResult};
pub use district::{DistrictBoundary, DistrictGeometry, Facility};
