//! Point/plane and point/line projections, and line-plane intersection.

use nalgebra::Vector3;

use super::Point2;

/// Project `point` onto the plane through `origin` with unit `normal`.
#[inline]
pub fn project_point_onto_plane(point: Vector3<f64>, origin: Vector3<f64>, normal: Vector3<f64>) -> Vector3<f64> {
    let d = (point - origin).dot(&normal);
    point - normal * d
}

/// Project a 2D `point` onto the line through `origin` with in-plane unit
/// `normal` (the line's normal, not its direction).
#[inline]
pub fn project_point_onto_line_2d(point: Point2, origin: Point2, normal: Point2) -> Point2 {
    let d = (point - origin).dot(&normal);
    point - normal * d
}

/// Intersection of the segment `(a, b)` with the plane through `origin`
/// with unit `normal`.
///
/// Returns `(point, in_plane, intersects)`. `in_plane` is true when both
/// endpoints lie (within `tol`) on the plane, in which case there is no
/// unique intersection and `point` is the segment midpoint as a
/// placeholder. `intersects` is false when the segment does not cross the
/// plane within `[0, 1]` parametrically.
pub fn line_plane_intersection(
    a: Vector3<f64>,
    b: Vector3<f64>,
    origin: Vector3<f64>,
    normal: Vector3<f64>,
    tol: f64,
) -> (Vector3<f64>, bool, bool) {
    let da = (a - origin).dot(&normal);
    let db = (b - origin).dot(&normal);

    if da.abs() <= tol && db.abs() <= tol {
        return ((a + b) * 0.5, true, true);
    }

    let denom = da - db;
    if denom.abs() <= 1e-300 {
        // Segment parallel to the plane and not on it: no intersection.
        return (Vector3::zeros(), false, false);
    }

    let t = da / denom;
    if !(-1e-9..=1.0 + 1e-9).contains(&t) {
        return (Vector3::zeros(), false, false);
    }
    let t = t.clamp(0.0, 1.0);
    (a + (b - a) * t, false, true)
}
