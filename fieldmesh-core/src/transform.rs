//! Calibration transforms between world space and oracle space

use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Homogeneous 4x4 calibration transform.
///
/// Supplied by the caller to map vertices into an oracle's native frame
/// (e.g. a camera projection), and inverted to map reconstructed vertices
/// back to world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub matrix: Matrix4<f32>,
}

impl Calibration {
    /// Create an identity calibration
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a pure translation calibration
    pub fn translation(translation: Vector3<f32>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&translation),
        }
    }

    /// Create a uniform scaling calibration
    pub fn uniform_scaling(scale: f32) -> Self {
        Self {
            matrix: Matrix4::new_scaling(scale),
        }
    }

    /// Apply the calibration to a point: homogeneous multiply, then drop
    /// the homogeneous component.
    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        let homogeneous = self.matrix * point.to_homogeneous();
        Point3::from_homogeneous(homogeneous).unwrap_or(*point)
    }

    /// Compose this calibration with another
    pub fn compose(self, other: Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Get the inverse calibration, if the matrix is invertible
    pub fn inverse(self) -> Option<Self> {
        self.matrix.try_inverse().map(|inv_matrix| Self {
            matrix: inv_matrix,
        })
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Calibration {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

impl From<Matrix4<f32>> for Calibration {
    fn from(matrix: Matrix4<f32>) -> Self {
        Self { matrix }
    }
}
