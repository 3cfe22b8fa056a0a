//! Cartesian-product binning: enumerate all `F1 * F2` pairs.
//!
//! Degenerate but correct; used for tiny meshes or when binning is pinned
//! (spec.md §4.3: "`NO_SLIDING` cases where topology is fixed").

use super::CandidatePair;

pub fn cartesian_product(num_faces_1: usize, num_faces_2: usize) -> Vec<CandidatePair> {
    let mut out = Vec::with_capacity(num_faces_1 * num_faces_2);
    for f1 in 0..num_faces_1 as u32 {
        for f2 in 0..num_faces_2 as u32 {
            out.push(CandidatePair { f1, f2 });
        }
    }
    out
}
