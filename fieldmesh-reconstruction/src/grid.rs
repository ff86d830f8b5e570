//! Dense scalar volume sampled over a bounding box

use fieldmesh_core::{Aabb, Error, Point3f, Result, Vector3f};
use ndarray::Array3;

/// A `res x res x res` scalar volume anchored to a bounding box.
///
/// Lattice site `[i, j, k]` maps to world space so that index 0 lies on the
/// box's min corner and index `res - 1` on its max corner along each axis.
/// Both sampling strategies fill the same index domain, so iso-surface
/// extraction is agnostic to how the grid was produced.
#[derive(Debug, Clone)]
pub struct ScalarGrid {
    values: Array3<f32>,
    bounds: Aabb,
    resolution: usize,
}

impl ScalarGrid {
    /// Allocate an unfilled grid. Sites start as NaN so an unsampled cell
    /// can never masquerade as a real occupancy value.
    pub(crate) fn new(bounds: Aabb, resolution: usize) -> Result<Self> {
        if resolution < 2 {
            return Err(Error::InvalidData(format!(
                "grid resolution must be at least 2, got {}",
                resolution
            )));
        }
        Ok(Self {
            values: Array3::from_elem((resolution, resolution, resolution), f32::NAN),
            bounds,
            resolution,
        })
    }

    /// Build a fully populated grid by evaluating a function at every
    /// lattice site. Mostly useful for tests and analytic fields; oracle
    /// driven construction goes through the samplers.
    pub fn from_fn<F>(bounds: Aabb, resolution: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(&Point3f) -> f32,
    {
        let mut grid = Self::new(bounds, resolution)?;
        for i in 0..resolution {
            for j in 0..resolution {
                for k in 0..resolution {
                    let p = grid.site_world([i, j, k]);
                    grid.values[[i, j, k]] = f(&p);
                }
            }
        }
        Ok(grid)
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Total number of lattice sites (`resolution^3`).
    pub fn site_count(&self) -> usize {
        self.values.len()
    }

    /// Scalar value at a lattice site. Callers stay in bounds; the backing
    /// array panics on a genuine indexing bug.
    pub fn value(&self, idx: [usize; 3]) -> f32 {
        self.values[idx]
    }

    /// Checked variant of [`ScalarGrid::value`].
    pub fn get(&self, idx: [usize; 3]) -> Option<f32> {
        self.values.get(idx).copied()
    }

    pub(crate) fn set(&mut self, idx: [usize; 3], value: f32) {
        self.values[idx] = value;
    }

    /// World position of a lattice site.
    pub fn site_world(&self, idx: [usize; 3]) -> Point3f {
        let d = (self.resolution - 1) as f32;
        self.bounds
            .lerp([idx[0] as f32 / d, idx[1] as f32 / d, idx[2] as f32 / d])
    }

    /// Distance between adjacent lattice sites along each axis.
    pub fn spacing(&self) -> Vector3f {
        self.bounds.extent() / (self.resolution - 1) as f32
    }

    /// Iterate raw values, in memory order.
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().copied()
    }
}
