//! Timestep vote (spec.md §4.6 `compute_timestep`, §9 Open Question 1).
//!
//! Aggregates per-plane velocity projections and recommends a reduced
//! `dt` when interpenetration growth within the proposed step would
//! threaten numerical stability.

use crate::contact_plane::ContactPlane;
use crate::mesh::MeshView;

/// Absolute velocity-projection epsilon (spec.md SPEC_FULL §12 Q1):
/// guards a divide-by-near-zero approach velocity. Kept as a fixed
/// constant rather than mesh-scaled, since it bounds a velocity, not a
/// geometric tolerance.
pub const TIMESTEP_VEL_EPS: f64 = 1.0e-12;

/// Fraction of remaining gap that a single step is allowed to consume.
pub const MAX_GAP_CONSUMPTION_FRACTION: f64 = 0.5;

/// Recommend a (possibly reduced) timestep for the next cycle.
///
/// For each active, interpenetrating plane, project the relative
/// approach velocity onto the common-plane normal. If the proposed `dt`
/// would consume more than [`MAX_GAP_CONSUMPTION_FRACTION`] of the
/// remaining gap, shrink `dt` to the value that would consume exactly
/// that fraction. Returns the minimum such `dt` across all active planes,
/// or the proposed `dt` unchanged if no plane requires a reduction.
pub fn compute_timestep(mesh1: &MeshView, mesh2: &MeshView, planes: &[ContactPlane], proposed_dt: f64) -> f64 {
    let mut dt = proposed_dt;

    for plane in planes {
        if plane.gap >= 0.0 {
            continue;
        }
        let v1 = face_velocity_projection(mesh1, plane.f1, plane.normal);
        let v2 = face_velocity_projection(mesh2, plane.f2, plane.normal);
        let closing_speed = (v2 - v1).abs() + TIMESTEP_VEL_EPS;

        let remaining_gap = plane.gap.abs();
        let allowed_travel = MAX_GAP_CONSUMPTION_FRACTION * remaining_gap;
        let limited_dt = allowed_travel / closing_speed;

        if limited_dt < dt {
            dt = limited_dt;
        }
    }

    dt.max(0.0)
}

fn face_velocity_projection(mesh: &MeshView, face_id: u32, normal: nalgebra::Vector3<f64>) -> f64 {
    match mesh.face_velocities(face_id) {
        Some(vels) => {
            let avg = vels.iter().fold(nalgebra::Vector3::zeros(), |acc, v| acc + v) / vels.len() as f64;
            avg.dot(&normal)
        }
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContactCase, Model, Tolerances};
    use crate::contact_plane::{check_interface_pair, PairOutcome};
    use crate::mesh::MeshView;

    fn quad_mesh(id: u32, z: f64, winding: [(f64, f64); 4], vel: Option<[f64; 3]>) -> MeshView {
        let mut coords = Vec::new();
        for (x, y) in winding {
            coords.push(x);
            coords.push(y);
            coords.push(z);
        }
        let mut m = MeshView::new(id, 3, 4, 4, vec![0, 1, 2, 3], coords).unwrap();
        if let Some(v) = vel {
            m.register_velocities(v.repeat(4)).unwrap();
        }
        m.update_face_cache();
        m
    }

    #[test]
    fn no_active_planes_keeps_dt() {
        let dt = compute_timestep(
            &quad_mesh(1, 0.0, [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], None),
            &quad_mesh(2, 5.0, [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], None),
            &[],
            1e-3,
        );
        assert!((dt - 1e-3).abs() < 1e-15);
    }

    #[test]
    fn fast_closing_velocity_shrinks_dt() {
        let mesh1 = quad_mesh(
            1,
            0.0,
            [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
            Some([0.0, 0.0, 10.0]),
        );
        let mesh2 = quad_mesh(
            2,
            -0.05,
            [(0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)],
            Some([0.0, 0.0, -10.0]),
        );
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
        let dt = compute_timestep(&mesh1, &mesh2, std::slice::from_ref(&plane), 1.0);
        assert!(dt < 1.0);
    }
}
