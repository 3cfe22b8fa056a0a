//! Common-plane penalty kernel (spec.md §4.5.1).

use crate::config::{Model, PenaltyOptions};
use crate::contact_plane::ContactPlane;
use crate::mesh::MeshView;
use crate::shape::shape_values_at_point;

/// Result of applying one active plane's penalty contribution, returned
/// for diagnostics/testing (spec.md §8 property 3, "penalty force
/// equilibrium").
#[derive(Clone, Copy, Debug, Default)]
pub struct PenaltyContribution {
    pub normal_force_magnitude: f64,
}

/// Apply the common-plane penalty force for one active contact plane,
/// accumulating into both meshes' response buffers.
///
/// For non-TIED models, only `gap < 0` (interpenetration) produces a
/// force; TIED additionally fires on `gap >= 0` (cohesive/tensile). The
/// caller is expected to only invoke this for planes whose `in_contact`
/// flag is set (spec.md §4.4 step 7 already filtered on the appropriate
/// gap tolerance).
pub fn apply_common_plane_penalty(
    mesh1: &mut MeshView,
    mesh2: &mut MeshView,
    plane: &ContactPlane,
    model: Model,
    options: &PenaltyOptions,
) -> PenaltyContribution {
    let is_tied = matches!(model, Model::Tied);
    if !is_tied && plane.gap >= 0.0 {
        return PenaltyContribution::default();
    }

    let k = if options.constant_stiffness {
        options.k_constant
    } else {
        let t1 = mesh1.element_thickness(plane.f1);
        let t2 = mesh2.element_thickness(plane.f2);
        match (t1, t2) {
            (Some(t1), Some(t2)) if t1 + t2 > 0.0 => {
                let t_eff = (t1 * t2) / (t1 + t2);
                options.k_host * plane.overlap_area / t_eff
            }
            _ => options.k_constant,
        }
    };

    let f_n = k * plane.gap.abs();

    // Compressive contact (gap < 0, interpenetrating) pushes the faces
    // apart along `plane.normal` (which points roughly from face 2's side
    // toward face 1's side, being the normalized `n1 - n2` bisector).
    // TIED additionally fires once separated (gap >= 0), where the force
    // must be cohesive (faces pulled together), i.e. the opposite sign.
    let sign = if plane.gap >= 0.0 { -1.0 } else { 1.0 };

    let weights1 = shape_values_at_point(&plane.face1_local, local_of(plane, true));
    let weights2 = shape_values_at_point(&plane.face2_local, local_of(plane, false));

    let force_on_1 = plane.normal * (sign * f_n);
    let force_on_2 = -force_on_1;

    distribute(mesh1, plane.f1, &weights1, force_on_1);
    distribute(mesh2, plane.f2, &weights2, force_on_2);

    PenaltyContribution {
        normal_force_magnitude: f_n,
    }
}

fn local_of(plane: &ContactPlane, _face1: bool) -> crate::geometry::Point2 {
    let rel = plane.overlap_centroid - plane.origin;
    crate::geometry::Point2::new(rel.dot(&plane.e1), rel.dot(&plane.e2))
}

fn distribute(mesh: &mut MeshView, face_id: u32, weights: &[f64], total_force: nalgebra::Vector3<f64>) {
    let nodes = mesh.face_nodes(face_id).to_vec();
    for (node, &w) in nodes.iter().zip(weights) {
        let contribution = total_force * w;
        mesh.add_response(*node, 0, contribution.x);
        mesh.add_response(*node, 1, contribution.y);
        mesh.add_response(*node, 2, contribution.z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContactCase, Tolerances};
    use crate::contact_plane::{check_interface_pair, PairOutcome};

    fn quad_mesh(id: u32, z: f64, winding: [(f64, f64); 4]) -> MeshView {
        let mut coords = Vec::new();
        for (x, y) in winding {
            coords.push(x);
            coords.push(y);
            coords.push(z);
        }
        let mut m = MeshView::new(id, 3, 4, 4, vec![0, 1, 2, 3], coords).unwrap();
        m.update_face_cache();
        m
    }

    fn build_plane(gap_z: f64, thickness: Option<(f64, f64)>) -> (MeshView, MeshView, ContactPlane) {
        let mut mesh1 = quad_mesh(1, 0.0, [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let mut mesh2 = quad_mesh(2, gap_z, [(0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]);

        if let Some((t1, t2)) = thickness {
            mesh1.register_element_thickness(vec![t1]).unwrap();
            mesh2.register_element_thickness(vec![t2]).unwrap();
            mesh1.update_face_cache();
            mesh2.update_face_cache();
        }

        let tol = Tolerances::default();
        let outcome = check_interface_pair(
            &mesh1,
            &mesh2,
            0,
            0,
            ContactCase::NoCase,
            Model::Frictionless,
            &tol,
        )
        .unwrap();
        let plane = match outcome {
            PairOutcome::Active(p) => *p,
            PairOutcome::Inactive => panic!("expected contact"),
        };
        (mesh1, mesh2, plane)
    }

    #[test]
    fn s2_interpenetration_force_magnitude() {
        let (mut mesh1, mut mesh2, plane) = build_plane(-0.05, Some((1.0, 1.0)));
        let options = PenaltyOptions {
            constant_stiffness: false,
            k_constant: 0.0,
            k_host: 50.0,
        };
        let contribution =
            apply_common_plane_penalty(&mut mesh1, &mut mesh2, &plane, Model::Frictionless, &options);
        assert!(
            (contribution.normal_force_magnitude - 5.0).abs() < 1e-8,
            "F_n = {}",
            contribution.normal_force_magnitude
        );

        let total1 = mesh1.total_response();
        assert!((total1.norm() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn penalty_force_satisfies_equilibrium() {
        let (mut mesh1, mut mesh2, plane) = build_plane(-0.05, None);
        let options = PenaltyOptions {
            constant_stiffness: true,
            k_constant: 50.0,
            k_host: 0.0,
        };
        let contribution =
            apply_common_plane_penalty(&mut mesh1, &mut mesh2, &plane, Model::Frictionless, &options);

        let total1 = mesh1.total_response();
        let total2 = mesh2.total_response();
        let residual = (total1 + total2).norm();
        assert!(
            residual <= 1e-10 * contribution.normal_force_magnitude.max(1.0),
            "residual = {residual}"
        );
    }
}
