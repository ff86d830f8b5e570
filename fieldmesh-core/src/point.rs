//! Point types and related functionality

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Flat `f32` view of a packed point buffer (x0, y0, z0, x1, ...).
///
/// External serializers and GPU uploads consume vertex data as a plain
/// scalar stream; the cast is zero-copy.
pub fn point_buffer(points: &[Point3f]) -> &[f32] {
    bytemuck::cast_slice(points)
}

/// Flat `f32` view of a packed vector buffer.
pub fn vector_buffer(vectors: &[Vector3f]) -> &[f32] {
    bytemuck::cast_slice(vectors)
}
