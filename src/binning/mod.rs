//! Pair finder (binning), spec.md §4.3.
//!
//! Two policies share one output shape: a deduplicated, deterministic (for
//! a given input) list of candidate `(f1, f2)` pairs. Grid cell size is a
//! performance tuning knob, never a correctness one (spec.md §4.3).

mod cartesian;
mod grid;

pub use cartesian::cartesian_product;
pub use grid::{uniform_grid_pairs, GridParams};

/// A single candidate face pair (spec.md §3 "Candidate pair").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CandidatePair {
    pub f1: u32,
    pub f2: u32,
}

use crate::config::Binning;
use crate::mesh::MeshView;

/// Run the configured binning policy over the two mesh views.
pub fn find_candidates(mesh1: &MeshView, mesh2: &MeshView, policy: Binning) -> Vec<CandidatePair> {
    match policy {
        Binning::CartesianProduct => cartesian_product(mesh1.num_faces(), mesh2.num_faces()),
        Binning::Grid => uniform_grid_pairs(mesh1, mesh2, &GridParams::from_meshes(mesh1, mesh2)),
    }
}
