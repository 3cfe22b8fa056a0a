//! Convex polygon-polygon clipping (spec.md §4.1 "Polygon clipping algorithm").

use super::polygon2d::{
    collapse_short_edges, is_ccw_convex, point_in_convex_polygon, polygon_area_2d, reorder_ccw,
    segment_segment_intersection_2d,
};
use super::Point2;
use crate::error::GeometryError;

/// The convex overlap of two convex polygons, plus its area.
pub struct Overlap {
    pub vertices: Vec<Point2>,
    pub area: f64,
}

/// Compute the convex 2D overlap of `a` and `b`, both assumed convex CCW.
///
/// Steps (spec.md §4.1):
/// 1. Classify each vertex of A/B by point-in-polygon membership in the
///    other.
/// 2. Collect vertices-of-A-inside-B, vertices-of-B-inside-A, and
///    edge-edge intersections.
/// 3. Deduplicate coincident interior vertices (within 1e-15).
/// 4. Short-circuit when one polygon fully contains the other.
/// 5. Reorder into convex CCW and collapse short edges.
/// 6. Report zero-area overlap (not an error) if fewer than 3 vertices
///    (2D: 2) remain.
pub fn polygon_intersection(
    a: &[Point2],
    b: &[Point2],
    pos_tol: f64,
    len_tol: f64,
) -> Result<Overlap, GeometryError> {
    if a.len() < 3 || b.len() < 3 {
        return Err(GeometryError::InvalidFaceInput);
    }
    if !is_ccw_convex(a) || !is_ccw_convex(b) {
        return Err(GeometryError::FaceOrientation);
    }

    let a_inside_b: Vec<bool> = a.iter().map(|&v| point_in_convex_polygon(v, b, pos_tol)).collect();
    let b_inside_a: Vec<bool> = b.iter().map(|&v| point_in_convex_polygon(v, a, pos_tol)).collect();

    if a_inside_b.iter().all(|&x| x) {
        return finish_overlap(a.to_vec(), len_tol);
    }
    if b_inside_a.iter().all(|&x| x) {
        return finish_overlap(b.to_vec(), len_tol);
    }

    let mut collected: Vec<Point2> = Vec::new();
    for (i, &v) in a.iter().enumerate() {
        if a_inside_b[i] {
            collected.push(v);
        }
    }

    let mut b_interior_points: Vec<Point2> = Vec::new();
    for (i, &v) in b.iter().enumerate() {
        if b_inside_a[i] {
            // Drop any B-interior vertex coincident with an already-collected
            // A-interior vertex within 1e-15 (spec.md step 3).
            let is_duplicate = collected.iter().any(|&c| (c - v).norm() < 1e-15);
            if !is_duplicate {
                b_interior_points.push(v);
            }
        }
    }
    collected.extend(b_interior_points);

    let na = a.len();
    let nb = b.len();
    for i in 0..na {
        let p0 = a[i];
        let p1 = a[(i + 1) % na];
        for j in 0..nb {
            let q0 = b[j];
            let q1 = b[(j + 1) % nb];
            let result = segment_segment_intersection_2d(
                p0,
                p1,
                q0,
                q1,
                a_inside_b[i],
                a_inside_b[(i + 1) % na],
                b_inside_a[j],
                b_inside_a[(j + 1) % nb],
                pos_tol,
            );
            if result.intersects && !result.duplicate {
                collected.push(result.point);
            }
        }
    }

    if collected.len() < 3 {
        return Ok(Overlap {
            vertices: Vec::new(),
            area: 0.0,
        });
    }

    reorder_ccw(&mut collected)?;
    finish_overlap(collected, len_tol)
}

fn finish_overlap(mut vertices: Vec<Point2>, len_tol: f64) -> Result<Overlap, GeometryError> {
    vertices = collapse_short_edges(&vertices, len_tol, 2);
    if vertices.len() < 3 {
        return Ok(Overlap {
            vertices: Vec::new(),
            area: 0.0,
        });
    }
    let area = polygon_area_2d(&vertices);
    Ok(Overlap { vertices, area })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(cx: f64, cy: f64, half: f64) -> Vec<Point2> {
        vec![
            Point2::new(cx - half, cy - half),
            Point2::new(cx + half, cy - half),
            Point2::new(cx + half, cy + half),
            Point2::new(cx - half, cy + half),
        ]
    }

    #[test]
    fn identical_squares_full_overlap() {
        let a = square(0.5, 0.5, 0.5);
        let b = a.clone();
        let overlap = polygon_intersection(&a, &b, 1e-9, 1e-9).unwrap();
        assert!((overlap.area - 1.0).abs() < 1e-9);
    }

    #[test]
    fn offset_squares_partial_overlap() {
        let a = square(0.5, 0.5, 0.5); // unit square [0,1]x[0,1]
        let b = square(0.75, 0.75, 0.5); // [0.25,1.25]x[0.25,1.25]
        let overlap = polygon_intersection(&a, &b, 1e-9, 1e-9).unwrap();
        assert!((overlap.area - 0.5625).abs() < 1e-9, "area = {}", overlap.area);
        assert_eq!(overlap.vertices.len(), 4);
    }

    #[test]
    fn disjoint_squares_zero_overlap() {
        let a = square(0.0, 0.0, 0.4);
        let b = square(10.0, 10.0, 0.4);
        let overlap = polygon_intersection(&a, &b, 1e-9, 1e-9).unwrap();
        assert!(overlap.area < 1e-12);
        assert!(overlap.vertices.is_empty());
    }

    #[test]
    fn overlap_symmetric_in_area() {
        let a = square(0.5, 0.5, 0.5);
        let b = square(0.8, 0.6, 0.5);
        let ab = polygon_intersection(&a, &b, 1e-9, 1e-9).unwrap();
        let ba = polygon_intersection(&b, &a, 1e-9, 1e-9).unwrap();
        assert!((ab.area - ba.area).abs() < 1e-10);
    }

    #[test]
    fn rejects_non_convex_input() {
        let bad = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let sq = square(1.0, 1.0, 0.5);
        assert!(polygon_intersection(&bad, &sq, 1e-9, 1e-9).is_err());
    }
}
