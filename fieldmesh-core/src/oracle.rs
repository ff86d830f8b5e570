//! Batched point-query capabilities implemented by field collaborators
//!
//! A reconstruction never sees a model; it only sees these traits. Any
//! learned network or closed-form function that can answer a batch of 3D
//! queries is interchangeable. Oracles are expected to be expensive per
//! call and internally vectorized, so callers batch aggressively and
//! implementations are free to parallelize inside a single call.

use crate::error::Result;
use crate::point::{Point3f, Vector3f};

/// Occupancy-like scalar field, queried one batch of points at a time.
///
/// Values are typically in `[0, 1]` with a fixed iso-level separating
/// inside from outside, but any scalar field with that structure works.
pub trait ScalarField {
    /// Evaluate the field at every point in the batch, one value per point.
    fn query(&self, points: &[Point3f]) -> Result<Vec<f32>>;
}

/// Per-vertex 3-channel attribute field: surface colors or normals.
///
/// Points arrive already mapped into the oracle's native frame; see
/// the attribute resolver for the calibration step.
pub trait AttributeField {
    /// Evaluate the attribute at every point in the batch.
    fn query(&self, points: &[Point3f]) -> Result<Vec<Vector3f>>;
}

/// A 2D source image indexed by continuous uv coordinates.
///
/// Used by the projected-color attribute flavor: vertices are projected
/// into the image plane and this collaborator performs the actual pixel
/// lookup (bilinear or otherwise, its concern).
pub trait ImagePlane {
    /// Sample the image at every uv coordinate, one color per coordinate.
    fn sample(&self, uv: &[[f32; 2]]) -> Result<Vec<Vector3f>>;
}
