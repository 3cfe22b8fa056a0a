//! Contact-plane builder (`CheckInterfacePair`), spec.md §4.4.
//!
//! This is the heart of the library: per candidate pair, it filters by
//! normal orientation, builds the common bisector plane, projects both
//! faces onto it, computes the convex overlap, and decides whether the
//! pair is in contact.

use nalgebra::Vector3;

use crate::config::{ContactCase, Model, Tolerances};
use crate::error::GeometryError;
use crate::geometry::{self, Point2};
use crate::mesh::MeshView;

/// Contact-plane record for one active face pair (spec.md §3).
#[derive(Clone, Debug)]
pub struct ContactPlane {
    pub f1: u32,
    pub f2: u32,
    pub origin: Vector3<f64>,
    pub normal: Vector3<f64>,
    pub e1: Vector3<f64>,
    pub e2: Vector3<f64>,
    pub overlap_local: Vec<Point2>,
    pub overlap_global: Vec<Vector3<f64>>,
    pub overlap_area: f64,
    pub overlap_centroid: Vector3<f64>,
    /// Overlap centroid projected back onto face 1's plane.
    pub c_on_f1: Vector3<f64>,
    /// Overlap centroid projected back onto face 2's plane.
    pub c_on_f2: Vector3<f64>,
    /// Signed distance between the two projected centroids along `normal`;
    /// negative ⇒ interpenetration.
    pub gap: f64,
    pub in_contact: bool,
    pub face1_local: Vec<Point2>,
    pub face2_local: Vec<Point2>,
}

/// Outcome of checking one candidate pair: either it's inactive (no error,
/// just geometrically irrelevant) or it produced an active contact plane.
pub enum PairOutcome {
    Inactive,
    Active(Box<ContactPlane>),
}

/// Evaluate one candidate face pair (spec.md §4.4 steps 1-7).
pub fn check_interface_pair(
    mesh1: &MeshView,
    mesh2: &MeshView,
    f1: u32,
    f2: u32,
    case: ContactCase,
    model: Model,
    tol: &Tolerances,
) -> Result<PairOutcome, GeometryError> {
    let n1 = mesh1.face_normal(f1);
    let n2 = mesh2.face_normal(f2);

    // 1. Orientation filter: normals must oppose with a margin.
    if n1.dot(&n2) > -tol.orientation_margin {
        return Ok(PairOutcome::Inactive);
    }

    // 2. Common-plane construction: bisector of the two face normals,
    // origin at the midpoint of the two face centroids.
    let bisector = n1 - n2;
    let bisector_len = bisector.norm();
    if bisector_len <= 1e-12 {
        return Err(GeometryError::NoFaceGeomError);
    }
    let plane_normal = bisector / bisector_len;
    let c1 = mesh1.face_centroid(f1);
    let c2 = mesh2.face_centroid(f2);
    let origin = (c1 + c2) * 0.5;

    let (e1, e2) = in_plane_basis(plane_normal);

    // 3. Projection: project vertices onto the common plane, express in
    // local 2D coordinates, reorder CCW.
    let face1_world = mesh1.face_coords(f1);
    let face2_world = mesh2.face_coords(f2);

    let mut face1_local = project_to_local(&face1_world, origin, plane_normal, e1, e2);
    let mut face2_local = project_to_local(&face2_world, origin, plane_normal, e1, e2);

    geometry::reorder_ccw(&mut face1_local)?;
    geometry::reorder_ccw(&mut face2_local)?;

    // 4. Overlap.
    let overlap = geometry::polygon_intersection(&face1_local, &face2_local, tol.pos_tol, tol.len_tol)?;
    if overlap.area <= 1e-14 || overlap.vertices.len() < 3 {
        return Err(GeometryError::DegenerateOverlap);
    }

    let overlap_centroid_local = geometry::vertex_average_centroid(
        &overlap
            .vertices
            .iter()
            .map(|v| Vector3::new(v.x, v.y, 0.0))
            .collect::<Vec<_>>(),
    )?;
    let overlap_centroid = origin + e1 * overlap_centroid_local.x + e2 * overlap_centroid_local.y;

    let overlap_global: Vec<Vector3<f64>> = overlap
        .vertices
        .iter()
        .map(|v| origin + e1 * v.x + e2 * v.y)
        .collect();

    // 5. Gap: project the overlap centroid back onto each face's own
    // plane, then take the signed separation along the common normal.
    let c_on_f1 = geometry::project_point_onto_plane(overlap_centroid, c1, n1);
    let c_on_f2 = geometry::project_point_onto_plane(overlap_centroid, c2, n2);
    let gap = (c_on_f1 - c_on_f2).dot(&plane_normal);

    let r1 = mesh1.face_radius(f1);
    let r2 = mesh2.face_radius(f2);
    let max_r = r1.max(r2);

    // 6. Contact decision.
    let in_contact = match model {
        Model::Tied => {
            let gap_tol = tol.gap_tied_tol * max_r;
            gap <= gap_tol
        }
        _ => {
            let gap_tol = tol.gap_tol_ratio * max_r;
            gap <= gap_tol
        }
    };

    if in_contact && matches!(case, ContactCase::Auto) {
        let t1 = mesh1.element_thickness(f1);
        let t2 = mesh2.element_thickness(f2);
        match (t1, t2) {
            (Some(t1), Some(t2)) if t1 > 0.0 && t2 > 0.0 => {
                let t_eff = (t1 * t2) / (t1 + t2);
                if gap < -tol.auto_penetration_fraction * t_eff {
                    return Ok(PairOutcome::Inactive);
                }
            }
            _ => return Err(GeometryError::NoFaceGeomError),
        }
    }

    if !in_contact {
        return Ok(PairOutcome::Inactive);
    }

    Ok(PairOutcome::Active(Box::new(ContactPlane {
        f1,
        f2,
        origin,
        normal: plane_normal,
        e1,
        e2,
        overlap_local: overlap.vertices,
        overlap_global,
        overlap_area: overlap.area,
        overlap_centroid,
        c_on_f1,
        c_on_f2,
        gap,
        in_contact: true,
        face1_local,
        face2_local,
    })))
}

/// Build an orthonormal in-plane basis `(e1, e2)` for `normal`.
pub fn in_plane_basis(normal: Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let helper = if normal.x.abs() < 0.9 {
        Vector3::new(1.0, 0.0, 0.0)
    } else {
        Vector3::new(0.0, 1.0, 0.0)
    };
    let e1 = normal.cross(&helper).normalize();
    let e2 = normal.cross(&e1).normalize();
    (e1, e2)
}

fn project_to_local(
    world: &[Vector3<f64>],
    origin: Vector3<f64>,
    normal: Vector3<f64>,
    e1: Vector3<f64>,
    e2: Vector3<f64>,
) -> Vec<Point2> {
    world
        .iter()
        .map(|&p| {
            let on_plane = geometry::project_point_onto_plane(p, origin, normal);
            let rel = on_plane - origin;
            Point2::new(rel.dot(&e1), rel.dot(&e2))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshView;

    fn quad_mesh(z: f64, verts: [(f64, f64); 4]) -> MeshView {
        let mut coords = Vec::new();
        for (x, y) in verts {
            coords.push(x);
            coords.push(y);
            coords.push(z);
        }
        let mut m = MeshView::new(1, 3, 4, 4, vec![0, 1, 2, 3], coords).unwrap();
        m.update_face_cache();
        m
    }

    #[test]
    fn s1_unit_square_zero_gap() {
        let mesh1 = quad_mesh(0.0, [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        // mesh2 faces the opposite way: reverse winding so normal points -z.
        let mut coords2 = Vec::new();
        for (x, y) in [(0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)] {
            coords2.push(x);
            coords2.push(y);
            coords2.push(0.0);
        }
        let mut mesh2 = MeshView::new(2, 3, 4, 4, vec![0, 1, 2, 3], coords2).unwrap();
        mesh2.update_face_cache();

        let tol = Tolerances::default();
        let outcome =
            check_interface_pair(&mesh1, &mesh2, 0, 0, ContactCase::NoSliding, Model::Frictionless, &tol)
                .unwrap();
        match outcome {
            PairOutcome::Active(plane) => {
                assert!((plane.overlap_area - 1.0).abs() < 1e-9);
                assert!(plane.gap.abs() < 1e-9);
            }
            PairOutcome::Inactive => panic!("expected an active contact plane"),
        }
    }

    #[test]
    fn same_facing_normals_are_filtered_out() {
        let mesh1 = quad_mesh(0.0, [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let mesh2 = quad_mesh(-0.05, [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let tol = Tolerances::default();
        let outcome =
            check_interface_pair(&mesh1, &mesh2, 0, 0, ContactCase::NoCase, Model::Frictionless, &tol)
                .unwrap();
        assert!(matches!(outcome, PairOutcome::Inactive));
    }
}
