//! Geometry primitives (spec.md §4.1).
//!
//! Pure, stateless functions on raw coordinate arrays. No type here owns a
//! mesh or a face id; they all take plain `nalgebra` vectors/points so the
//! same code path is usable from the contact-plane builder, from tests, and
//! eventually from a device kernel (see [`crate::exec`]).
//!
//! Tolerances are explicit parameters throughout, never machine epsilon:
//! callers derive length tolerances from face radii (`pos_tol`, `len_tol`
//! in [`crate::config`]), per spec.md's "near-zero comparisons use explicit
//! tolerances ... scales with the mesh".

pub mod centroid;
pub mod clip;
pub mod plane;
pub mod polygon2d;

pub use centroid::{area_weighted_centroid, vertex_average_centroid};
pub use clip::polygon_intersection;
pub use plane::{line_plane_intersection, project_point_onto_line_2d, project_point_onto_plane};
pub use polygon2d::{is_ccw_convex, polygon_area_2d, reorder_ccw};

use nalgebra::Vector2;

/// A 2D point, always expressed in a contact-plane-local basis.
pub type Point2 = Vector2<f64>;

/// A 3D point/vector in the host's world frame.
pub type Point3 = nalgebra::Vector3<f64>;
