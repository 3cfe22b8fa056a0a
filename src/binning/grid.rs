//! Uniform spatial grid binning (spec.md §4.3).
//!
//! Each face is inserted into every cell its bounding box touches; faces
//! of mesh 1 and mesh 2 sharing a cell become candidate pairs. Cell size
//! is driven by the median face radius across both meshes.

use std::collections::{HashMap, HashSet};

use nalgebra::Point3;
use parry3d_f64::bounding_volume::Aabb;

use super::CandidatePair;
use crate::mesh::MeshView;

pub struct GridParams {
    pub cell_size: f64,
}

impl GridParams {
    pub fn from_meshes(mesh1: &MeshView, mesh2: &MeshView) -> Self {
        let mut radii: Vec<f64> = (0..mesh1.num_faces())
            .map(|f| mesh1.face_radius(f as u32))
            .chain((0..mesh2.num_faces()).map(|f| mesh2.face_radius(f as u32)))
            .filter(|r| *r > 0.0)
            .collect();
        radii.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let median = if radii.is_empty() {
            1.0
        } else {
            radii[radii.len() / 2]
        };
        // Two face-radii wide so that adjacent-cell faces are still found
        // via the 1-ring neighbor scan below.
        Self {
            cell_size: (2.0 * median).max(1e-6),
        }
    }
}

type CellKey = (i64, i64, i64);

fn face_aabb(mesh: &MeshView, face_id: u32) -> Aabb {
    let coords = mesh.face_coords(face_id);
    let mut mins = Point3::new(f64::MAX, f64::MAX, f64::MAX);
    let mut maxs = Point3::new(f64::MIN, f64::MIN, f64::MIN);
    for c in &coords {
        mins.x = mins.x.min(c.x);
        mins.y = mins.y.min(c.y);
        mins.z = mins.z.min(c.z);
        maxs.x = maxs.x.max(c.x);
        maxs.y = maxs.y.max(c.y);
        maxs.z = maxs.z.max(c.z);
    }
    Aabb { mins, maxs }
}

fn cells_touched(aabb: &Aabb, cell_size: f64) -> Vec<CellKey> {
    let to_cell = |v: f64| (v / cell_size).floor() as i64;
    let (i0, j0, k0) = (to_cell(aabb.mins.x), to_cell(aabb.mins.y), to_cell(aabb.mins.z));
    let (i1, j1, k1) = (to_cell(aabb.maxs.x), to_cell(aabb.maxs.y), to_cell(aabb.maxs.z));

    let mut out = Vec::new();
    for i in i0..=i1 {
        for j in j0..=j1 {
            for k in k0..=k1 {
                out.push((i, j, k));
            }
        }
    }
    out
}

/// Build a uniform grid over both meshes' face bounding boxes and return
/// the deduplicated set of candidate pairs sharing at least one cell.
pub fn uniform_grid_pairs(mesh1: &MeshView, mesh2: &MeshView, params: &GridParams) -> Vec<CandidatePair> {
    let mut grid: HashMap<CellKey, (Vec<u32>, Vec<u32>)> = HashMap::new();

    for f in 0..mesh1.num_faces() as u32 {
        let aabb = face_aabb(mesh1, f);
        for cell in cells_touched(&aabb, params.cell_size) {
            grid.entry(cell).or_default().0.push(f);
        }
    }
    for f in 0..mesh2.num_faces() as u32 {
        let aabb = face_aabb(mesh2, f);
        for cell in cells_touched(&aabb, params.cell_size) {
            grid.entry(cell).or_default().1.push(f);
        }
    }

    let mut seen: HashSet<(u32, u32)> = HashSet::new();
    let mut out = Vec::new();
    for (f1_list, f2_list) in grid.values() {
        for &f1 in f1_list {
            for &f2 in f2_list {
                if seen.insert((f1, f2)) {
                    out.push(CandidatePair { f1, f2 });
                }
            }
        }
    }
    out
}
