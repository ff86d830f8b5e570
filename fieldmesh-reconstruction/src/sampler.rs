//! Spatial sampling strategies for the occupancy oracle
//!
//! The oracle is expensive per call; both strategies issue bounded batches
//! and differ only in which lattice sites they pay for. Dense mode fills
//! the full `res^3` lattice. Octree mode refines adaptively so oracle work
//! scales with surface area instead of volume.

use crate::grid::ScalarGrid;
use crate::octree;
use fieldmesh_core::{Aabb, Error, Point3f, Result, ScalarField};
use itertools::iproduct;
use log::debug;

/// Default upper bound on points per scalar-oracle call.
pub const DEFAULT_BATCH_SIZE: usize = 50_000;

/// Fill a `resolution^3` scalar grid from the oracle, by the chosen strategy.
///
/// Both modes produce the identical grid index contract, so the surface
/// extractor never knows which one ran. An oracle failure at any batch
/// aborts the whole call; no partial grid escapes.
pub fn sample_field<F: ScalarField>(
    field: &F,
    bounds: &Aabb,
    resolution: usize,
    iso_level: f32,
    batch_size: usize,
    use_octree: bool,
) -> Result<ScalarGrid> {
    if use_octree {
        octree::sample_adaptive(field, bounds, resolution, iso_level, batch_size)
    } else {
        sample_dense(field, bounds, resolution, batch_size)
    }
}

/// Evaluate the oracle at every site of the full lattice.
pub fn sample_dense<F: ScalarField>(
    field: &F,
    bounds: &Aabb,
    resolution: usize,
    batch_size: usize,
) -> Result<ScalarGrid> {
    let mut grid = ScalarGrid::new(*bounds, resolution)?;
    let sites: Vec<[usize; 3]> = iproduct!(0..resolution, 0..resolution, 0..resolution)
        .map(|(i, j, k)| [i, j, k])
        .collect();
    let batches = evaluate_sites(field, &mut grid, &sites, batch_size)?;
    debug!(
        "dense sampling: {} lattice sites in {} oracle batches",
        sites.len(),
        batches
    );
    Ok(grid)
}

/// Query the oracle at the given lattice sites, in batches of at most
/// `batch_size` points, writing results into the grid. Returns the number
/// of batches issued.
pub(crate) fn evaluate_sites<F: ScalarField>(
    field: &F,
    grid: &mut ScalarGrid,
    sites: &[[usize; 3]],
    batch_size: usize,
) -> Result<usize> {
    if batch_size == 0 {
        return Err(Error::InvalidData(
            "sample batch size must be at least 1".to_string(),
        ));
    }
    let mut batches = 0;
    for batch in sites.chunks(batch_size) {
        let points: Vec<Point3f> = batch.iter().map(|&idx| grid.site_world(idx)).collect();
        let values = field.query(&points)?;
        if values.len() != points.len() {
            return Err(Error::Oracle(format!(
                "scalar oracle returned {} values for {} points",
                values.len(),
                points.len()
            )));
        }
        for (&idx, &value) in batch.iter().zip(&values) {
            grid.set(idx, value);
        }
        batches += 1;
    }
    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct PlaneField {
        calls: AtomicUsize,
    }

    impl PlaneField {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ScalarField for PlaneField {
        fn query(&self, points: &[Point3f]) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(points.iter().map(|p| p.z).collect())
        }
    }

    struct FailingField;

    impl ScalarField for FailingField {
        fn query(&self, _points: &[Point3f]) -> Result<Vec<f32>> {
            Err(Error::Oracle("device lost".to_string()))
        }
    }

    fn unit_bounds() -> Aabb {
        Aabb::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0)).unwrap()
    }

    #[test]
    fn test_dense_fills_every_site() {
        let field = PlaneField::new();
        let grid = sample_dense(&field, &unit_bounds(), 9, DEFAULT_BATCH_SIZE).unwrap();

        assert_eq!(grid.site_count(), 9 * 9 * 9);
        assert!(grid.values().all(|v| v.is_finite()));
        assert_eq!(grid.value([0, 0, 0]), -1.0);
        assert_eq!(grid.value([0, 0, 8]), 1.0);
        // A batch large enough for the whole lattice means one oracle call.
        assert_eq!(field.calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_batch_size_does_not_change_values() {
        let reference = sample_dense(&PlaneField::new(), &unit_bounds(), 7, DEFAULT_BATCH_SIZE)
            .unwrap();

        // 7^3 = 343 sites; 100 per batch forces a remainder batch of 43.
        let field = PlaneField::new();
        let chunked = sample_dense(&field, &unit_bounds(), 7, 100).unwrap();

        assert_eq!(field.calls.load(Ordering::Relaxed), 4);
        assert!(reference.values().eq(chunked.values()));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(sample_dense(&PlaneField::new(), &unit_bounds(), 4, 0).is_err());
    }

    #[test]
    fn test_oracle_failure_aborts() {
        let result = sample_dense(&FailingField, &unit_bounds(), 4, DEFAULT_BATCH_SIZE);
        assert!(matches!(result, Err(Error::Oracle(_))));
    }
}
