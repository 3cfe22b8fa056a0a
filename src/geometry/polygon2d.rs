//! 2D polygon predicates: area, convex-CCW test, convex-hull reordering,
//! point-in-polygon, and segment-segment intersection.

use super::Point2;
use crate::error::GeometryError;

/// Signed area of a 2D polygon via the shoelace formula (positive ⇒ CCW).
#[inline]
pub fn signed_area_2d(polygon: &[Point2]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    0.5 * sum
}

/// Area of a 2D polygon in any vertex order, computed by triangulating
/// about the vertex-average centroid and summing absolute triangle areas
/// (spec.md §4.1 table).
pub fn polygon_area_2d(polygon: &[Point2]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let hub: Point2 = polygon.iter().fold(Point2::zeros(), |acc, v| acc + v) / n as f64;
    let mut area = 0.0;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let cross = (a - hub).x * (b - hub).y - (b - hub).x * (a - hub).y;
        area += (0.5 * cross).abs();
    }
    area
}

/// True if `polygon` is convex and ordered counter-clockwise.
///
/// Computed by checking that every cross product of consecutive edges has
/// the same (non-negative) sign. Fewer than 3 vertices is never convex.
pub fn is_ccw_convex(polygon: &[Point2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    if signed_area_2d(polygon) <= 0.0 {
        return false;
    }
    for i in 0..n {
        let prev = polygon[(i + n - 1) % n];
        let cur = polygon[i];
        let next = polygon[(i + 1) % n];
        let e1 = cur - prev;
        let e2 = next - cur;
        let cross = e1.x * e2.y - e1.y * e2.x;
        if cross < -1e-12 {
            return false;
        }
    }
    true
}

/// True if `point` lies inside (or on the boundary of, within `tol`) the
/// convex polygon `polygon`, assumed CCW.
pub fn point_in_convex_polygon(point: Point2, polygon: &[Point2], tol: f64) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let edge = b - a;
        let to_point = point - a;
        let cross = edge.x * to_point.y - edge.y * to_point.x;
        if cross < -tol {
            return false;
        }
    }
    true
}

/// Reorder an arbitrary convex-hull point set into CCW order in place.
///
/// Algorithm (spec.md §4.1): pick a starting segment such that every other
/// vertex lies on one side of it, then repeatedly pick the next vertex
/// that minimizes the turning angle (i.e. walk the hull). Reordering an
/// already-CCW convex polygon is a no-op up to rotation of the starting
/// index (spec.md §8 property 6).
pub fn reorder_ccw(polygon: &mut Vec<Point2>) -> Result<(), GeometryError> {
    let n = polygon.len();
    if n < 3 {
        return Err(GeometryError::InvalidFaceInput);
    }
    if is_ccw_convex(polygon) {
        return Ok(());
    }

    // Find a starting edge (lowest-then-leftmost vertex paired with the
    // next vertex in the *hull* sense) such that all other points are on
    // one side: start from the point with the lowest y (ties: lowest x),
    // which is guaranteed to be a hull vertex, then walk by minimal
    // turning angle (classic gift-wrapping / Jarvis march).
    let start_idx = (0..n)
        .min_by(|&a, &b| {
            let pa = polygon[a];
            let pb = polygon[b];
            pa.y.partial_cmp(&pb.y)
                .unwrap()
                .then(pa.x.partial_cmp(&pb.x).unwrap())
        })
        .unwrap();

    let mut ordered = Vec::with_capacity(n);
    let mut used = vec![false; n];
    let mut current = start_idx;
    let mut current_dir = Point2::new(1.0, 0.0); // walk starting "east"

    for _ in 0..n {
        ordered.push(polygon[current]);
        used[current] = true;

        // Pick the unused vertex with the smallest CCW turning angle from
        // `current_dir`.
        let mut best: Option<(usize, f64)> = None;
        for j in 0..n {
            if used[j] {
                continue;
            }
            let cand_dir = polygon[j] - polygon[current];
            if cand_dir.norm_squared() <= 1e-20 {
                continue;
            }
            let angle = signed_turn_angle(current_dir, cand_dir);
            let better = match best {
                Some((_, best_angle)) => angle < best_angle,
                None => true,
            };
            if better {
                best = Some((j, angle));
            }
        }

        match best {
            Some((j, _)) => {
                current_dir = polygon[j] - polygon[current];
                current = j;
            }
            None => break,
        }
    }

    if ordered.len() < 3 {
        return Err(GeometryError::DegenerateOverlap);
    }

    *polygon = ordered;
    if signed_area_2d(polygon) < 0.0 {
        polygon.reverse();
    }
    Ok(())
}

/// Turning angle (in `[0, 2*pi)`) from `from` to `to`, measured CCW.
fn signed_turn_angle(from: Point2, to: Point2) -> f64 {
    let a0 = from.y.atan2(from.x);
    let a1 = to.y.atan2(to.x);
    let mut d = a1 - a0;
    while d < 0.0 {
        d += std::f64::consts::TAU;
    }
    while d >= std::f64::consts::TAU {
        d -= std::f64::consts::TAU;
    }
    d
}

/// Result of a 2D segment-segment intersection test.
pub struct SegmentIntersection {
    pub point: Point2,
    pub intersects: bool,
    /// True when the intersection collapses onto a vertex already marked
    /// interior to the other polygon (spec.md §4.1 table).
    pub duplicate: bool,
}

/// 2D segment-segment intersection, with the interior-membership flags
/// used by the clipper to detect degenerate "duplicate" intersections.
#[allow(clippy::too_many_arguments)]
pub fn segment_segment_intersection_2d(
    p0: Point2,
    p1: Point2,
    q0: Point2,
    q1: Point2,
    p0_interior_to_q: bool,
    p1_interior_to_q: bool,
    q0_interior_to_p: bool,
    q1_interior_to_p: bool,
    pos_tol: f64,
) -> SegmentIntersection {
    let r = p1 - p0;
    let s = q1 - q0;
    let denom = r.x * s.y - r.y * s.x;

    if denom.abs() <= 1e-14 {
        return SegmentIntersection {
            point: Point2::zeros(),
            intersects: false,
            duplicate: false,
        };
    }

    let qp = q0 - p0;
    let t = (qp.x * s.y - qp.y * s.x) / denom;
    let u = (qp.x * r.y - qp.y * r.x) / denom;

    let eps = 1e-9;
    if !(-eps..=1.0 + eps).contains(&t) || !(-eps..=1.0 + eps).contains(&u) {
        return SegmentIntersection {
            point: Point2::zeros(),
            intersects: false,
            duplicate: false,
        };
    }

    let point = p0 + r * t.clamp(0.0, 1.0);

    // Duplicate when the computed point coincides (within pos_tol) with an
    // endpoint already flagged interior to the other polygon.
    let mut duplicate = false;
    if p0_interior_to_q && (point - p0).norm() <= pos_tol {
        duplicate = true;
    }
    if p1_interior_to_q && (point - p1).norm() <= pos_tol {
        duplicate = true;
    }
    if q0_interior_to_p && (point - q0).norm() <= pos_tol {
        duplicate = true;
    }
    if q1_interior_to_p && (point - q1).norm() <= pos_tol {
        duplicate = true;
    }

    SegmentIntersection {
        point,
        intersects: true,
        duplicate,
    }
}

/// Drop edges shorter than `len_tol` from `polygon`, returning the
/// compacted vertex list. An empty-ish result (fewer than `min_vertices`)
/// signals a degenerate overlap to the caller.
pub fn collapse_short_edges(polygon: &[Point2], len_tol: f64, min_vertices: usize) -> Vec<Point2> {
    if polygon.is_empty() {
        return Vec::new();
    }
    let mut out: Vec<Point2> = Vec::with_capacity(polygon.len());
    for &v in polygon {
        if let Some(&last) = out.last() {
            if (v - last).norm() < len_tol {
                continue;
            }
        }
        out.push(v);
    }
    // Check wrap-around edge too.
    if out.len() > min_vertices {
        if let (Some(&first), Some(&last)) = (out.first(), out.last()) {
            if (first - last).norm() < len_tol {
                out.pop();
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn area_of_unit_square() {
        assert!((polygon_area_2d(&unit_square()) - 1.0).abs() < 1e-12);
        assert!((signed_area_2d(&unit_square()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unit_square_is_ccw_convex() {
        assert!(is_ccw_convex(&unit_square()));
    }

    #[test]
    fn clockwise_square_is_not_ccw() {
        let mut sq = unit_square();
        sq.reverse();
        assert!(!is_ccw_convex(&sq));
    }

    #[test]
    fn reorder_is_idempotent_on_ccw_polygon() {
        let sq = unit_square();
        let mut reordered = sq.clone();
        reorder_ccw(&mut reordered).unwrap();
        assert!(is_ccw_convex(&reordered));
        assert!((polygon_area_2d(&reordered) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn reorder_fixes_shuffled_polygon() {
        let mut shuffled = vec![
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 0.0),
        ];
        reorder_ccw(&mut shuffled).unwrap();
        assert!(is_ccw_convex(&shuffled));
        assert!((polygon_area_2d(&shuffled) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn point_in_convex_polygon_basic() {
        let sq = unit_square();
        assert!(point_in_convex_polygon(Point2::new(0.5, 0.5), &sq, 1e-9));
        assert!(!point_in_convex_polygon(Point2::new(1.5, 0.5), &sq, 1e-9));
    }

    #[test]
    fn segment_intersection_crossing() {
        let res = segment_segment_intersection_2d(
            Point2::new(0.0, 0.5),
            Point2::new(1.0, 0.5),
            Point2::new(0.5, 0.0),
            Point2::new(0.5, 1.0),
            false,
            false,
            false,
            false,
            1e-9,
        );
        assert!(res.intersects);
        assert!((res.point - Point2::new(0.5, 0.5)).norm() < 1e-9);
        assert!(!res.duplicate);
    }

    #[test]
    fn segment_intersection_parallel_misses() {
        let res = segment_segment_intersection_2d(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            false,
            false,
            false,
            false,
            1e-9,
        );
        assert!(!res.intersects);
    }

    #[test]
    fn collapse_short_edges_drops_tiny_segments() {
        let poly = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1e-9, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
        ];
        let out = collapse_short_edges(&poly, 1e-6, 2);
        assert_eq!(out.len(), 3);
    }
}
