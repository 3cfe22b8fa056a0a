//! Mesh view: a read-only, device-copyable descriptor of one surface mesh
//! (spec.md §4.2).
//!
//! `MeshView` intentionally contains no algorithms of its own beyond the
//! per-face cache refresh (`update_face_cache`); the contact-plane builder
//! and physics kernel are free functions operating on it, following the
//! "plain-data descriptor + free functions" reframing in spec.md §9.

use nalgebra::Vector3;

use crate::error::HostError;

/// Number of vertices per face: 2 (2D segment), 3 (triangle), 4 (quad).
pub type FaceVertexCount = usize;

/// Cached, once-per-cycle face data (spec.md §3 "Mesh").
#[derive(Clone, Copy, Debug, Default)]
pub struct FaceCache {
    pub normal: Vector3<f64>,
    pub centroid: Vector3<f64>,
    pub radius: f64,
    pub area: f64,
    /// Element thickness; `None` until the host registers it, required for
    /// the `AUTO` contact case and element-wise penalty stiffness.
    pub thickness: Option<f64>,
}

/// A read-only surface mesh descriptor.
///
/// All coordinate/connectivity/response buffers are owned here (the "host
/// memory space" execution mode in spec.md §9); a device-resident variant
/// would hold the same shape of data behind a different allocator tag, but
/// is out of scope for this core (see spec.md §1 Non-goals).
pub struct MeshView {
    pub id: u32,
    pub dim: usize,
    pub verts_per_face: FaceVertexCount,
    num_nodes: usize,
    /// Flattened `num_faces * verts_per_face` node-id connectivity.
    connectivity: Vec<u32>,
    /// Flattened `num_nodes * dim` coordinates.
    coords: Vec<f64>,
    /// Flattened `num_nodes * dim` velocities, if registered.
    velocities: Option<Vec<f64>>,
    /// Flattened `num_nodes * dim` response (force) accumulator.
    response: Vec<f64>,
    /// Per-face element thickness, if registered.
    element_thickness: Option<Vec<f64>>,
    /// Set once the host registers a response sink (spec.md §6
    /// `register_nodal_response`); penalty enforcement requires it.
    response_registered: bool,
    face_cache: Vec<FaceCache>,
}

impl MeshView {
    /// Register a new mesh. Fails with [`HostError`] if nodes/faces are
    /// zero or a buffer has the wrong length (host-contract violation,
    /// spec.md §7).
    pub fn new(
        id: u32,
        dim: usize,
        verts_per_face: FaceVertexCount,
        num_nodes: usize,
        connectivity: Vec<u32>,
        coords: Vec<f64>,
    ) -> Result<Self, HostError> {
        if num_nodes == 0 {
            return Err(HostError::ZeroNodes(id));
        }
        let num_faces = connectivity.len() / verts_per_face.max(1);
        if num_faces == 0 || connectivity.len() % verts_per_face != 0 {
            return Err(HostError::ZeroFaces(id));
        }
        if coords.len() != num_nodes * dim {
            return Err(HostError::MissingCoordinates(id));
        }
        Ok(Self {
            id,
            dim,
            verts_per_face,
            num_nodes,
            connectivity,
            coords,
            velocities: None,
            response: vec![0.0; num_nodes * dim],
            element_thickness: None,
            response_registered: false,
            face_cache: vec![FaceCache::default(); num_faces],
        })
    }

    /// Mark that the host has registered a nodal response sink (spec.md §6
    /// `register_nodal_response`). Idempotent.
    pub fn register_response_sink(&mut self) {
        self.response_registered = true;
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    #[inline]
    pub fn num_faces(&self) -> usize {
        self.face_cache.len()
    }

    pub fn register_velocities(&mut self, velocities: Vec<f64>) -> Result<(), HostError> {
        if velocities.len() != self.num_nodes * self.dim {
            return Err(HostError::MissingCoordinates(self.id));
        }
        self.velocities = Some(velocities);
        Ok(())
    }

    /// Overwrite the current coordinate buffer (spec.md §6
    /// `register_nodal_displacements`). This mesh has no separate reference
    /// configuration: the host is expected to supply the *current* deformed
    /// positions each cycle, not an incremental delta. Stale face-cache data
    /// until the next `update_face_cache()` call.
    pub fn update_coords(&mut self, coords: Vec<f64>) -> Result<(), HostError> {
        if coords.len() != self.num_nodes * self.dim {
            return Err(HostError::MissingCoordinates(self.id));
        }
        self.coords = coords;
        Ok(())
    }

    pub fn register_element_thickness(&mut self, thickness: Vec<f64>) -> Result<(), HostError> {
        if thickness.len() != self.num_faces() {
            return Err(HostError::MissingCoordinates(self.id));
        }
        self.element_thickness = Some(thickness);
        Ok(())
    }

    /// Clear the response (force) accumulator. Owned by the host between
    /// cycles (spec.md §5 "the host owns clearing them between cycles").
    pub fn clear_response(&mut self) {
        self.response.iter_mut().for_each(|v| *v = 0.0);
    }

    #[inline]
    pub fn node_coord(&self, node_id: u32) -> Vector3<f64> {
        self.vec_at(&self.coords, node_id)
    }

    #[inline]
    pub fn node_velocity(&self, node_id: u32) -> Option<Vector3<f64>> {
        self.velocities.as_ref().map(|v| self.vec_at(v, node_id))
    }

    fn vec_at(&self, buf: &[f64], node_id: u32) -> Vector3<f64> {
        let base = node_id as usize * self.dim;
        let x = buf[base];
        let y = buf.get(base + 1).copied().unwrap_or(0.0);
        let z = if self.dim == 3 { buf[base + 2] } else { 0.0 };
        Vector3::new(x, y, z)
    }

    /// Node ids for `face_id`, in connectivity order.
    pub fn face_nodes(&self, face_id: u32) -> &[u32] {
        let start = face_id as usize * self.verts_per_face;
        &self.connectivity[start..start + self.verts_per_face]
    }

    /// Vertex coordinates for `face_id` (length `verts_per_face`).
    pub fn face_coords(&self, face_id: u32) -> Vec<Vector3<f64>> {
        self.face_nodes(face_id)
            .iter()
            .map(|&n| self.node_coord(n))
            .collect()
    }

    /// Vertex velocities for `face_id`, if the host registered velocities.
    pub fn face_velocities(&self, face_id: u32) -> Option<Vec<Vector3<f64>>> {
        if self.velocities.is_none() {
            return None;
        }
        Some(
            self.face_nodes(face_id)
                .iter()
                .map(|&n| self.node_velocity(n).unwrap())
                .collect(),
        )
    }

    #[inline]
    pub fn face_normal(&self, face_id: u32) -> Vector3<f64> {
        self.face_cache[face_id as usize].normal
    }

    #[inline]
    pub fn face_centroid(&self, face_id: u32) -> Vector3<f64> {
        self.face_cache[face_id as usize].centroid
    }

    #[inline]
    pub fn face_radius(&self, face_id: u32) -> f64 {
        self.face_cache[face_id as usize].radius
    }

    #[inline]
    pub fn face_area(&self, face_id: u32) -> f64 {
        self.face_cache[face_id as usize].area
    }

    #[inline]
    pub fn element_thickness(&self, face_id: u32) -> Option<f64> {
        self.face_cache[face_id as usize].thickness
    }

    pub fn has_element_thickness(&self) -> bool {
        self.element_thickness.is_some()
    }

    pub fn has_response_sink(&self) -> bool {
        self.response_registered
    }

    /// Accumulate `value` into node `node_id`'s response along axis `d`.
    /// Associative addition, safe to call from parallel kernels operating
    /// on disjoint or overlapping node sets (spec.md §5: "atomic" on
    /// device paths; sequential accumulation here is exact).
    #[inline]
    pub fn add_response(&mut self, node_id: u32, d: usize, value: f64) {
        let idx = node_id as usize * self.dim + d;
        self.response[idx] += value;
    }

    pub fn response_at(&self, node_id: u32, d: usize) -> f64 {
        self.response[node_id as usize * self.dim + d]
    }

    pub fn total_response(&self) -> Vector3<f64> {
        (0..self.num_nodes)
            .map(|n| self.node_response(n as u32))
            .fold(Vector3::zeros(), |acc, v| acc + v)
    }

    fn node_response(&self, node_id: u32) -> Vector3<f64> {
        self.vec_at(&self.response, node_id)
    }

    /// Recompute per-face cached data: normal, centroid, bounding radius,
    /// area, and (if registered) element thickness. Called once per cycle
    /// at the start of any cycle that will bin (spec.md §4.2); never
    /// mutated during `apply()` (spec.md §5).
    pub fn update_face_cache(&mut self) {
        let n = self.num_faces();
        for f in 0..n {
            let coords = self.face_coords(f as u32);
            let centroid = coords.iter().fold(Vector3::zeros(), |acc, v| acc + v) / coords.len() as f64;
            let radius = coords
                .iter()
                .map(|v| (v - centroid).norm())
                .fold(0.0_f64, f64::max);

            let (normal, area) = face_normal_and_area(&coords);

            self.face_cache[f] = FaceCache {
                normal,
                centroid,
                radius,
                area,
                thickness: self.element_thickness.as_ref().map(|t| t[f]),
            };
        }
    }
}

/// Outward unit normal and area of a planar (or nearly planar) face,
/// computed via Newell's method so it's robust for quads that aren't
/// perfectly flat.
fn face_normal_and_area(coords: &[Vector3<f64>]) -> (Vector3<f64>, f64) {
    let n = coords.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = coords[i];
        let b = coords[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    let len = normal.norm();
    if len <= 1e-300 {
        return (Vector3::new(0.0, 0.0, 1.0), 0.0);
    }
    let unit = normal / len;
    // Newell's formula gives twice the signed planar area projected along
    // the normal; area = |sum| / 2 directly in 3D for a planar polygon.
    (unit, 0.5 * len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square_mesh() -> MeshView {
        let coords = vec![
            0.0, 0.0, 0.0, // n0
            1.0, 0.0, 0.0, // n1
            1.0, 1.0, 0.0, // n2
            0.0, 1.0, 0.0, // n3
        ];
        let connectivity = vec![0, 1, 2, 3];
        let mut mesh = MeshView::new(1, 3, 4, 4, connectivity, coords).unwrap();
        mesh.update_face_cache();
        mesh
    }

    #[test]
    fn face_cache_area_and_normal() {
        let mesh = unit_square_mesh();
        assert!((mesh.face_area(0) - 1.0).abs() < 1e-9);
        assert!((mesh.face_normal(0) - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-9);
        assert!((mesh.face_centroid(0) - Vector3::new(0.5, 0.5, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn zero_nodes_rejected() {
        assert!(MeshView::new(1, 3, 4, 0, vec![], vec![]).is_err());
    }

    #[test]
    fn response_accumulates() {
        let mut mesh = unit_square_mesh();
        mesh.add_response(0, 2, 5.0);
        mesh.add_response(0, 2, 2.5);
        assert!((mesh.response_at(0, 2) - 7.5).abs() < 1e-12);
    }
}
