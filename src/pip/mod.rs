//! Point-in-Polygon (PIP) district containment.
//!
//! Even-odd ray casting over the original, unsimplified district geometry.
//! Districts are scanned linearly in dataset order and the first covering
//! district wins.

mod containment;
mod ring;

pub use containment::{contains, find_district, polygon_contains};
pub use ring::{is_degenerate, ring_contains};
