//! Mesh data structures and functionality

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};

/// An indexed triangle mesh with one 3-channel attribute per vertex.
///
/// The attribute array carries surface colors or normals, aligned 1:1 with
/// the vertex array. Invariants (`attributes.len() == vertices.len()`,
/// every face index in range) are checked by [`TriangleMesh::validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub attributes: Vec<Vector3f>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Check the structural invariants of the mesh.
    pub fn validate(&self) -> Result<()> {
        if self.attributes.len() != self.vertices.len() {
            return Err(Error::InvalidData(format!(
                "{} attributes for {} vertices",
                self.attributes.len(),
                self.vertices.len()
            )));
        }
        for (i, face) in self.faces.iter().enumerate() {
            if face.iter().any(|&v| v >= self.vertices.len()) {
                return Err(Error::InvalidData(format!(
                    "face {} references vertex out of range (mesh has {} vertices)",
                    i,
                    self.vertices.len()
                )));
            }
        }
        Ok(())
    }

    /// Flat `f32` view of the vertex positions for external serializers.
    pub fn vertex_buffer(&self) -> &[f32] {
        point_buffer(&self.vertices)
    }

    /// Flat `f32` view of the per-vertex attributes.
    pub fn attribute_buffer(&self) -> &[f32] {
        vector_buffer(&self.attributes)
    }

    /// Calculate face normals
    pub fn face_normals(&self) -> Vec<Vector3f> {
        self.faces
            .iter()
            .map(|face| {
                let v0 = self.vertices[face[0]];
                let v1 = self.vertices[face[1]];
                let v2 = self.vertices[face[2]];

                let edge1 = v1 - v0;
                let edge2 = v2 - v0;

                edge1.cross(&edge2).normalize()
            })
            .collect()
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> TriangleMesh {
        TriangleMesh {
            vertices: vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            faces: vec![[0, 1, 2]],
            attributes: vec![Vector3f::new(0.5, 0.5, 0.5); 3],
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(triangle().validate().is_ok());
        assert!(TriangleMesh::new().validate().is_ok());
    }

    #[test]
    fn test_validate_attribute_mismatch() {
        let mut mesh = triangle();
        mesh.attributes.pop();
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_validate_face_out_of_range() {
        let mut mesh = triangle();
        mesh.faces.push([0, 1, 3]);
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_flat_buffers() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_buffer().len(), 9);
        assert_eq!(mesh.attribute_buffer().len(), 9);
        assert_eq!(mesh.vertex_buffer()[3], 1.0);
    }

    #[test]
    fn test_face_normals() {
        let normals = triangle().face_normals();
        assert_eq!(normals.len(), 1);
        assert_eq!(normals[0], Vector3f::new(0.0, 0.0, 1.0));
    }
}
