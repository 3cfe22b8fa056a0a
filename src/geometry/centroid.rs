//! Vertex-average and area-weighted centroids.

use nalgebra::Vector3;

use crate::error::GeometryError;

/// Vertex-average centroid of an arbitrary point set. Fails if empty.
pub fn vertex_average_centroid(vertices: &[Vector3<f64>]) -> Result<Vector3<f64>, GeometryError> {
    if vertices.is_empty() {
        return Err(GeometryError::InvalidFaceInput);
    }
    let sum: Vector3<f64> = vertices.iter().fold(Vector3::zeros(), |acc, v| acc + v);
    Ok(sum / vertices.len() as f64)
}

/// Area-weighted centroid of a (possibly non-planar) 3D polygon, computed
/// by triangulating about the vertex-average centroid and weighting each
/// triangle's centroid by its area. Fails if fewer than 3 vertices.
pub fn area_weighted_centroid(polygon: &[Vector3<f64>]) -> Result<Vector3<f64>, GeometryError> {
    if polygon.len() < 3 {
        return Err(GeometryError::InvalidFaceInput);
    }
    let hub = vertex_average_centroid(polygon)?;

    let mut area_sum = 0.0;
    let mut weighted = Vector3::zeros();
    let n = polygon.len();
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let tri_centroid = (a + b + hub) / 3.0;
        let tri_area = 0.5 * (b - a).cross(&(hub - a)).norm();
        area_sum += tri_area;
        weighted += tri_centroid * tri_area;
    }

    if area_sum <= 1e-300 {
        // Degenerate (zero-area) polygon: fall back to the vertex average
        // rather than dividing by zero.
        return Ok(hub);
    }
    Ok(weighted / area_sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_average_of_square() {
        let sq = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        let c = vertex_average_centroid(&sq).unwrap();
        assert!((c - Vector3::new(0.5, 0.5, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn vertex_average_empty_fails() {
        assert!(vertex_average_centroid(&[]).is_err());
    }

    #[test]
    fn area_weighted_centroid_of_square() {
        let sq = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        let c = area_weighted_centroid(&sq).unwrap();
        assert!((c - Vector3::new(0.5, 0.5, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn area_weighted_centroid_too_few_vertices() {
        let seg = vec![Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0)];
        assert!(area_weighted_centroid(&seg).is_err());
    }
}
