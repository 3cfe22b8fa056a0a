//! Quantified invariants and round-trip laws not already covered by
//! in-module unit tests: area monotonicity, gap sign convention, and the
//! 2D local/global in-plane coordinate round-trip.

use contact_mechanics::config::{ContactCase, Model, Tolerances};
use contact_mechanics::contact_plane::{check_interface_pair, in_plane_basis, PairOutcome};
use contact_mechanics::geometry::{polygon_intersection, Point2};
use contact_mechanics::mesh::MeshView;
use nalgebra::Vector3;

fn quad_mesh(id: u32, z: f64, verts: [(f64, f64); 4]) -> MeshView {
    let mut coords = Vec::new();
    for (x, y) in verts {
        coords.push(x);
        coords.push(y);
        coords.push(z);
    }
    let mut m = MeshView::new(id, 3, 4, 4, vec![0, 1, 2, 3], coords).unwrap();
    m.update_face_cache();
    m
}

/// Property 2 (spec.md §8): shrinking one face toward the other's interior
/// never increases the reported overlap area.
#[test]
fn overlap_area_is_monotone_under_shrinking_offset() {
    let a = vec![
        Point2::new(0.0, 0.0),
        Point2::new(1.0, 0.0),
        Point2::new(1.0, 1.0),
        Point2::new(0.0, 1.0),
    ];

    let mut last_area = f64::INFINITY;
    for &offset in &[0.0, 0.1, 0.2, 0.3, 0.4, 0.5] {
        let b = vec![
            Point2::new(offset, offset),
            Point2::new(1.0 + offset, offset),
            Point2::new(1.0 + offset, 1.0 + offset),
            Point2::new(offset, 1.0 + offset),
        ];
        let overlap = polygon_intersection(&a, &b, 1e-9, 1e-9).unwrap();
        assert!(
            overlap.area <= last_area + 1e-12,
            "area grew from {last_area} to {} as offset increased to {offset}",
            overlap.area
        );
        last_area = overlap.area;
    }
    assert!(last_area < 1e-9, "fully offset squares should no longer overlap");
}

/// Property 7 (spec.md §8): moving the second face directly away from the
/// first along the common normal increases the reported gap by the same
/// amount, to first order.
#[test]
fn gap_tracks_separation_distance_linearly() {
    let mesh1 = quad_mesh(1, 0.0, [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
    let tol = Tolerances::default();

    let mut gaps = Vec::new();
    for &z in &[0.01, 0.02, 0.03] {
        let mesh2 = quad_mesh(2, z, [(0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]);
        let outcome =
            check_interface_pair(&mesh1, &mesh2, 0, 0, ContactCase::TiedNormal, Model::Tied, &tol).unwrap();
        let plane = match outcome {
            PairOutcome::Active(p) => *p,
            PairOutcome::Inactive => panic!("expected an active (tied) plane at separation {z}"),
        };
        gaps.push(plane.gap);
    }

    assert!((gaps[0] - 0.01).abs() < 1e-9);
    assert!((gaps[1] - 0.02).abs() < 1e-9);
    assert!((gaps[2] - 0.03).abs() < 1e-9);
    assert!((gaps[1] - gaps[0] - 0.01).abs() < 1e-9);
    assert!((gaps[2] - gaps[1] - 0.01).abs() < 1e-9);
}

/// Round-trip law (spec.md §8): converting a 3D in-plane point to local 2D
/// coordinates and back recovers the original point to machine precision.
#[test]
fn local_to_global_round_trip_on_arbitrary_plane() {
    let normal = Vector3::new(0.3, -0.7, 0.65).normalize();
    let (e1, e2) = in_plane_basis(normal);
    let origin = Vector3::new(1.5, -2.0, 0.25);

    for &(u, v) in &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (-1.3, 2.7), (5.5, -5.5)] {
        let world = origin + e1 * u + e2 * v;
        let rel = world - origin;
        let local = Point2::new(rel.dot(&e1), rel.dot(&e2));
        assert!((local.x - u).abs() < 1e-12);
        assert!((local.y - v).abs() < 1e-12);

        let back = origin + e1 * local.x + e2 * local.y;
        assert!((back - world).norm() < 1e-12);
    }
}
