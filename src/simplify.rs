//! Douglas-Peucker simplification for rendering.
//!
//! Output is lossy and only meant for map payloads. Containment always runs
//! on the original geometry.

use geo_types::{Coord, LineString, MultiPolygon, Polygon};

use crate::models::DistrictGeometry;

/// Default rendering tolerance in degrees
pub const DEFAULT_TOLERANCE: f64 = 0.0005;

/// Distance from `p` to the segment `a`-`b`, falling back to the distance
/// to `a` when the segment has zero length
fn point_segment_distance(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;

    if len_sq == 0.0 {
        return (p.x - a.x).hypot(p.y - a.y);
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    let proj_x = a.x + t * dx;
    let proj_y = a.y + t * dy;
    (p.x - proj_x).hypot(p.y - proj_y)
}

/// Appends the simplified form of `points` to `out`, excluding the last point
fn simplify_into(points: &[Coord<f64>], tolerance: f64, out: &mut Vec<Coord<f64>>) {
    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_distance = 0.0;
    let mut split = 0;
    for (i, p) in points.iter().enumerate().take(points.len() - 1).skip(1) {
        let d = point_segment_distance(*p, first, last);
        if d > max_distance {
            max_distance = d;
            split = i;
        }
    }

    if max_distance > tolerance {
        simplify_into(&points[..=split], tolerance, out);
        simplify_into(&points[split..], tolerance, out);
    } else {
        out.push(first);
    }
}

/// Simplify a ring. The first and last points are always kept and a
/// non-positive tolerance returns the ring unchanged.
pub fn simplify_ring(ring: &LineString<f64>, tolerance: f64) -> LineString<f64> {
    let points = &ring.0;
    if points.len() <= 2 || tolerance.is_nan() || tolerance <= 0.0 {
        return ring.clone();
    }

    let mut out = Vec::with_capacity(points.len());
    simplify_into(points, tolerance, &mut out);
    out.push(points[points.len() - 1]);

    LineString::new(out)
}

pub fn simplify_polygon(polygon: &Polygon<f64>, tolerance: f64) -> Polygon<f64> {
    Polygon::new(
        simplify_ring(polygon.exterior(), tolerance),
        polygon
            .interiors()
            .iter()
            .map(|hole| simplify_ring(hole, tolerance))
            .collect(),
    )
}

pub fn simplify_geometry(geometry: &DistrictGeometry, tolerance: f64) -> DistrictGeometry {
    match geometry {
        DistrictGeometry::Polygon(p) => DistrictGeometry::Polygon(simplify_polygon(p, tolerance)),
        DistrictGeometry::MultiPolygon(mp) => DistrictGeometry::MultiPolygon(MultiPolygon::new(
            mp.0.iter().map(|p| simplify_polygon(p, tolerance)).collect(),
        )),
    }
}
