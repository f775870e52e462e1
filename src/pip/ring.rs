//! Ray casting over a single ring.

use geo_types::{Coord, LineString};

/// Whether a ring has fewer than 3 distinct points
pub fn is_degenerate(ring: &LineString<f64>) -> bool {
    let mut seen: [Option<Coord<f64>>; 3] = [None; 3];
    let mut distinct = 0;

    for c in ring.coords() {
        if seen[..distinct].iter().flatten().any(|s| s == c) {
            continue;
        }
        seen[distinct] = Some(*c);
        distinct += 1;
        if distinct == 3 {
            return false;
        }
    }

    true
}

/// Even-odd test of `point` against `ring`.
///
/// A horizontal ray is cast toward increasing longitude (`x`). An edge counts
/// as crossed when exactly one endpoint lies strictly above the point and the
/// intersection lies strictly to the right of it. With this half-open rule a
/// point on a left or bottom edge is inside and a point on a right or top edge
/// is outside, and the answer never changes between calls.
///
/// A closing point equal to the first point adds a zero-length edge that can
/// never be crossed, so open and closed rings agree.
pub fn ring_contains(point: Coord<f64>, ring: &LineString<f64>) -> bool {
    if is_degenerate(ring) {
        return false;
    }

    let coords = &ring.0;
    let mut inside = false;
    let mut j = coords.len() - 1;

    for i in 0..coords.len() {
        let a = coords[i];
        let b = coords[j];

        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }

        j = i;
    }

    inside
}
