//! Axis-aligned bounding volumes

use crate::error::{Error, Result};
use crate::point::{Point3f, Vector3f};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box delimiting a sampling volume.
///
/// Constructed through [`Aabb::new`], which enforces the componentwise
/// `min <= max` invariant; the fields stay private so the invariant cannot
/// be broken afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    min: Point3f,
    max: Point3f,
}

impl Aabb {
    /// Create a bounding box from its extreme corners.
    pub fn new(min: Point3f, max: Point3f) -> Result<Self> {
        if min.x <= max.x && min.y <= max.y && min.z <= max.z {
            Ok(Self { min, max })
        } else {
            Err(Error::InvalidData(format!(
                "bounding box min {:?} exceeds max {:?}",
                min, max
            )))
        }
    }

    pub fn min(&self) -> Point3f {
        self.min
    }

    pub fn max(&self) -> Point3f {
        self.max
    }

    /// Edge lengths along each axis.
    pub fn extent(&self) -> Vector3f {
        self.max - self.min
    }

    /// World position of normalized coordinates, `[0, 0, 0]` mapping to the
    /// min corner and `[1, 1, 1]` to the max corner.
    pub fn lerp(&self, t: [f32; 3]) -> Point3f {
        Point3f::new(
            self.min.x + t[0] * (self.max.x - self.min.x),
            self.min.y + t[1] * (self.max.y - self.min.y),
            self.min.z + t[2] * (self.max.z - self.min.z),
        )
    }

    pub fn contains(&self, p: &Point3f) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bounds() {
        let bbox = Aabb::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(bbox.extent(), Vector3f::new(2.0, 3.0, 4.0));
        assert!(bbox.contains(&Point3f::origin()));
        assert!(!bbox.contains(&Point3f::new(0.0, 2.5, 0.0)));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let result = Aabb::new(Point3f::new(1.0, 0.0, 0.0), Point3f::new(0.0, 1.0, 1.0));
        assert!(result.is_err());
    }

    #[test]
    fn test_degenerate_bounds_allowed() {
        // A zero-extent box is valid; min == max satisfies the invariant.
        assert!(Aabb::new(Point3f::origin(), Point3f::origin()).is_ok());
    }

    #[test]
    fn test_lerp_endpoints() {
        let bbox = Aabb::new(Point3f::new(-2.0, 0.0, 1.0), Point3f::new(2.0, 4.0, 5.0)).unwrap();
        assert_eq!(bbox.lerp([0.0, 0.0, 0.0]), bbox.min());
        assert_eq!(bbox.lerp([1.0, 1.0, 1.0]), bbox.max());
        assert_eq!(bbox.lerp([0.5, 0.5, 0.5]), Point3f::new(0.0, 2.0, 3.0));
    }
}
