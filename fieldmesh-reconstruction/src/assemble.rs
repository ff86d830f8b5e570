//! Final mesh assembly
//!
//! Combines extracted geometry with resolved attributes into the immutable
//! output mesh, optionally mapping vertices from the oracle's frame back to
//! world space through the inverse calibration.

use crate::parallel;
use fieldmesh_core::{Calibration, Error, Point3f, Result, TriangleMesh, Vector3f};

/// Build the final mesh from pipeline stage outputs.
///
/// The structural invariants (one attribute per vertex, face indices in
/// range) are enforced here; a violation means an upstream stage broke its
/// contract. With a world calibration the inverse transform is applied to
/// every vertex, homogeneous multiply with the w component dropped.
pub fn assemble_mesh(
    vertices: Vec<Point3f>,
    faces: Vec<[usize; 3]>,
    attributes: Vec<Vector3f>,
    world_calibration: Option<&Calibration>,
) -> Result<TriangleMesh> {
    let vertices = match world_calibration {
        Some(calib) => {
            let inverse = calib.inverse().ok_or_else(|| {
                Error::InvalidData("world calibration is not invertible".to_string())
            })?;
            parallel::parallel_map(&vertices, |v| inverse.transform_point(v))
        }
        None => vertices,
    };

    let mesh = TriangleMesh {
        vertices,
        faces,
        attributes,
    };
    mesh.validate()?;
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix4, Vector3};

    fn quad() -> (Vec<Point3f>, Vec<[usize; 3]>, Vec<Vector3f>) {
        let vertices = vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(1.0, 1.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [0, 2, 3]];
        let attributes = vec![Vector3f::new(1.0, 0.0, 0.0); 4];
        (vertices, faces, attributes)
    }

    #[test]
    fn test_assemble_without_calibration() {
        let (vertices, faces, attributes) = quad();
        let mesh = assemble_mesh(vertices.clone(), faces, attributes, None).unwrap();
        assert_eq!(mesh.vertices, vertices);
        assert_eq!(mesh.face_count(), 2);
    }

    #[test]
    fn test_attribute_mismatch_rejected() {
        let (vertices, faces, mut attributes) = quad();
        attributes.pop();
        assert!(assemble_mesh(vertices, faces, attributes, None).is_err());
    }

    #[test]
    fn test_face_out_of_range_rejected() {
        let (vertices, mut faces, attributes) = quad();
        faces.push([0, 1, 4]);
        assert!(assemble_mesh(vertices, faces, attributes, None).is_err());
    }

    #[test]
    fn test_singular_calibration_rejected() {
        let (vertices, faces, attributes) = quad();
        let singular = Calibration::from(Matrix4::zeros());
        assert!(assemble_mesh(vertices, faces, attributes, Some(&singular)).is_err());
    }

    /// Feeding assembled vertices back through the forward calibration must
    /// recover the pre-assembly coordinates.
    #[test]
    fn test_calibration_round_trip() {
        let (vertices, faces, attributes) = quad();
        let calib = Calibration::uniform_scaling(2.0)
            .compose(Calibration::translation(Vector3::new(0.5, -1.5, 3.0)));

        let mesh = assemble_mesh(vertices.clone(), faces, attributes, Some(&calib)).unwrap();

        for (world, original) in mesh.vertices.iter().zip(&vertices) {
            let forward = calib.transform_point(world);
            assert_relative_eq!(forward.x, original.x, epsilon = 1e-5);
            assert_relative_eq!(forward.y, original.y, epsilon = 1e-5);
            assert_relative_eq!(forward.z, original.z, epsilon = 1e-5);
        }
    }
}
