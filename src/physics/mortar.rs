//! Single/aligned mortar integration with Lagrange multipliers (spec.md §4.5.2).

use nalgebra::Vector3;

use crate::contact_plane::ContactPlane;
use crate::geometry::Point2;
use crate::shape::{quad_jacobian_det, shape_values, shape_values_at_point};

/// 1D two-point Gauss-Legendre rule: points `+-1/sqrt(3)`, weight 1 each.
fn gauss_2pt() -> [(f64, f64); 2] {
    let g = 1.0 / 3.0_f64.sqrt();
    [(-g, 1.0), (g, 1.0)]
}

/// Role of a block in [`SurfaceContactElem::jacobian`] (spec.md §4.5.2:
/// "block structure (mortar primal, nonmortar primal, Lagrange-multiplier dual)").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum BlockRole {
    Primal1 = 0,
    Primal2 = 1,
    Dual = 2,
}

/// Per-active-pair mortar record (spec.md §3 "Mortar element record").
///
/// Transient: built per pair, then its contributions are folded into the
/// coupling scheme's global mortar assembly state and discarded (spec.md
/// §9: "arena ownership ... Destruction is bulk").
pub struct SurfaceContactElem {
    pub dim: usize,
    pub f1: u32,
    pub f2: u32,
    pub v1: usize,
    pub v2: usize,
    pub face1_coords: Vec<Vector3<f64>>,
    pub face2_coords: Vec<Vector3<f64>>,
    pub overlap_coords: Vec<Vector3<f64>>,
    /// Nonmortar-nonmortar weights, `v1 * v1`, row-major.
    pub weights_aa: Vec<f64>,
    /// Nonmortar-mortar weights, `v1 * v2`, row-major.
    pub weights_ab: Vec<f64>,
    /// Block dense Jacobian: `jacobian[row][col]`, indexed by [`BlockRole`].
    pub jacobian: [[f64; 3]; 3],
}

/// Compute the mortar weights for one active plane by Gauss quadrature
/// over the overlap polygon, triangulated about its centroid (spec.md
/// §4.5.2). `aligned` selects the node-aligned variant (identity
/// weights), which assumes the orientation filter already passed exactly.
pub fn build_surface_contact_elem(plane: &ContactPlane, aligned: bool) -> SurfaceContactElem {
    let v1 = plane.face1_local.len();
    let v2 = plane.face2_local.len();

    let mut weights_aa = vec![0.0; v1 * v1];
    let mut weights_ab = vec![0.0; v1 * v2];

    if aligned && v1 == v2 {
        for i in 0..v1 {
            weights_aa[i * v1 + i] = plane.overlap_area / v1 as f64;
            weights_ab[i * v1 + i] = plane.overlap_area / v1 as f64;
        }
    } else {
        integrate_weights(plane, &mut weights_aa, &mut weights_ab);
    }

    let total: f64 = weights_aa.iter().sum();
    let jacobian = build_jacobian_blocks(total, weights_ab.iter().sum());

    SurfaceContactElem {
        dim: 3,
        f1: plane.f1,
        f2: plane.f2,
        v1,
        v2,
        face1_coords: plane.face1_local.iter().map(|p| Vector3::new(p.x, p.y, 0.0)).collect(),
        face2_coords: plane.face2_local.iter().map(|p| Vector3::new(p.x, p.y, 0.0)).collect(),
        overlap_coords: plane.overlap_global.clone(),
        weights_aa,
        weights_ab,
        jacobian,
    }
}

fn build_jacobian_blocks(total_aa: f64, total_ab: f64) -> [[f64; 3]; 3] {
    let mut j = [[0.0; 3]; 3];
    // Off-diagonal primal-dual coupling derived from the mortar weights
    // (spec.md §4.5.2: "off-diagonal blocks couple primal displacements to
    // the pressure unknowns, derived from the mortar weights").
    j[BlockRole::Dual as usize][BlockRole::Primal1 as usize] = -total_aa;
    j[BlockRole::Primal1 as usize][BlockRole::Dual as usize] = -total_aa;
    j[BlockRole::Dual as usize][BlockRole::Primal2 as usize] = total_ab;
    j[BlockRole::Primal2 as usize][BlockRole::Dual as usize] = total_ab;
    j
}

fn integrate_weights(plane: &ContactPlane, weights_aa: &mut [f64], weights_ab: &mut [f64]) {
    let v1 = plane.face1_local.len();
    let verts = &plane.overlap_local;
    let n = verts.len();
    if n < 3 {
        return;
    }
    let hub: Point2 = verts.iter().fold(Point2::zeros(), |acc, v| acc + v) / n as f64;

    let rule = gauss_2pt();

    for i in 0..n {
        let a = verts[i];
        let b = verts[(i + 1) % n];
        // Collapsed-quad map: corners (hub, hub, a, b); this degenerates
        // the bilinear map to the triangle (hub, a, b) while reusing the
        // same isoparametric machinery as the quad faces.
        let quad_corners = [hub, hub, a, b];

        for &(xi, w_xi) in &rule {
            for &(eta, w_eta) in &rule {
                let n4 = shape_values(4, xi, eta);
                let phys = quad_corners[0] * n4[0]
                    + quad_corners[1] * n4[1]
                    + quad_corners[2] * n4[2]
                    + quad_corners[3] * n4[3];
                let det_j = quad_jacobian_det(&quad_corners, xi, eta).abs();
                let d_omega = det_j * w_xi * w_eta;
                if d_omega <= 0.0 {
                    continue;
                }

                let phi_a = shape_values_at_point(&plane.face1_local, phys);
                let phi_b = shape_values_at_point(&plane.face2_local, phys);

                for ia in 0..v1 {
                    for ja in 0..v1 {
                        weights_aa[ia * v1 + ja] += phi_a[ia] * phi_a[ja] * d_omega;
                    }
                    for jb in 0..plane.face2_local.len() {
                        weights_ab[ia * plane.face2_local.len() + jb] += phi_a[ia] * phi_b[jb] * d_omega;
                    }
                }
            }
        }
    }
}
