//! Physics kernel (spec.md §4.5): per-active-plane contributions to nodal
//! forces (common-plane penalty) or mortar weights/block Jacobian
//! (single/aligned mortar with Lagrange multipliers).

pub mod common_plane;
pub mod mortar;

pub use common_plane::{apply_common_plane_penalty, PenaltyContribution};
pub use mortar::{build_surface_contact_elem, BlockRole, SurfaceContactElem};
