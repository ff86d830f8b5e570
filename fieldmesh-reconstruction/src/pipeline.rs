//! End-to-end reconstruction pipeline
//!
//! Wires the stages together: sample the occupancy oracle over the bounding
//! box, extract the iso-surface, resolve per-vertex attributes in chunks,
//! assemble the final mesh. Every entity lives for exactly one call; a
//! failure at any stage aborts the call with the stage name attached and no
//! partial mesh is ever returned.

use crate::assemble::assemble_mesh;
use crate::attributes::{self, resolve_attributes};
use crate::marching_cubes::extract_surface;
use crate::sampler::{self, sample_field};
use fieldmesh_core::{Aabb, AttributeField, Calibration, Result, ScalarField, TriangleMesh};
use log::debug;

/// Tunables for one reconstruction call.
#[derive(Debug, Clone)]
pub struct ReconstructionConfig {
    /// Volume to reconstruct within.
    pub bounds: Aabb,
    /// Lattice side length; the sampled volume holds `resolution^3` sites.
    pub resolution: usize,
    /// Occupancy level of the extracted surface.
    pub iso_level: f32,
    /// Refine adaptively instead of sampling the full lattice.
    pub use_octree: bool,
    /// Upper bound on points per scalar-oracle call.
    pub batch_size: usize,
    /// Upper bound on vertices per attribute-oracle call.
    pub chunk_size: usize,
    /// Transform from the reconstruction frame into the oracle's camera
    /// frame. Applied forward for attribute lookups, inverted to bring the
    /// assembled mesh back to world space.
    pub calibration: Option<Calibration>,
}

impl ReconstructionConfig {
    pub fn new(bounds: Aabb, resolution: usize) -> Self {
        Self {
            bounds,
            resolution,
            iso_level: 0.5,
            use_octree: true,
            batch_size: sampler::DEFAULT_BATCH_SIZE,
            chunk_size: attributes::DEFAULT_CHUNK_SIZE,
            calibration: None,
        }
    }

    /// Set the iso-level of the extracted surface
    pub fn with_iso_level(mut self, iso_level: f32) -> Self {
        self.iso_level = iso_level;
        self
    }

    /// Enable or disable adaptive octree sampling
    pub fn with_octree(mut self, use_octree: bool) -> Self {
        self.use_octree = use_octree;
        self
    }

    /// Set the scalar-oracle batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the attribute-oracle chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the oracle-space calibration
    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = Some(calibration);
        self
    }
}

/// Reconstruct a colored surface mesh from an occupancy oracle.
///
/// `attribute_oracle` supplies the per-vertex channel, either colors or
/// normals; one flavor is active per reconstruction. A field entirely on
/// one side of the iso-level yields an empty mesh, which is a valid result
/// and costs zero attribute-oracle calls.
pub fn reconstruct<F, A>(
    field: &F,
    attribute_oracle: &A,
    config: &ReconstructionConfig,
) -> Result<TriangleMesh>
where
    F: ScalarField,
    A: AttributeField,
{
    let grid = sample_field(
        field,
        &config.bounds,
        config.resolution,
        config.iso_level,
        config.batch_size,
        config.use_octree,
    )
    .map_err(|e| e.at_stage("sampling"))?;

    let (vertices, faces) =
        extract_surface(&grid, config.iso_level).map_err(|e| e.at_stage("extraction"))?;
    // The grid is never retained past extraction.
    drop(grid);
    debug!(
        "reconstruction surface: {} vertices, {} faces",
        vertices.len(),
        faces.len()
    );

    let attributes = resolve_attributes(
        attribute_oracle,
        &vertices,
        config.chunk_size,
        config.calibration.as_ref(),
    )
    .map_err(|e| e.at_stage("attributes"))?;

    assemble_mesh(
        vertices,
        faces,
        attributes,
        config.calibration.as_ref(),
    )
    .map_err(|e| e.at_stage("assembly"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::FieldNormals;
    use fieldmesh_core::{Error, Point3f, Vector3f};

    struct SphereField {
        radius: f32,
    }

    impl ScalarField for SphereField {
        fn query(&self, points: &[Point3f]) -> Result<Vec<f32>> {
            Ok(points
                .iter()
                .map(|p| 0.5 + (self.radius - p.coords.magnitude()))
                .collect())
        }
    }

    struct FailingField;

    impl ScalarField for FailingField {
        fn query(&self, _points: &[Point3f]) -> Result<Vec<f32>> {
            Err(Error::Oracle("device lost".to_string()))
        }
    }

    struct FlatColor;

    impl AttributeField for FlatColor {
        fn query(&self, points: &[Point3f]) -> Result<Vec<Vector3f>> {
            Ok(vec![Vector3f::new(0.8, 0.2, 0.2); points.len()])
        }
    }

    fn unit_bounds() -> Aabb {
        Aabb::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0)).unwrap()
    }

    #[test]
    fn test_reconstruct_sphere_smoke() {
        let field = SphereField { radius: 0.5 };
        let config = ReconstructionConfig::new(unit_bounds(), 16).with_octree(false);
        let normals = FieldNormals::new(&field, 0.01);

        let mesh = reconstruct(&field, &normals, &config).unwrap();
        assert!(mesh.face_count() > 0);
        assert_eq!(mesh.attributes.len(), mesh.vertex_count());
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_sampling_failure_is_tagged() {
        let config = ReconstructionConfig::new(unit_bounds(), 8);
        let result = reconstruct(&FailingField, &FlatColor, &config);
        match result {
            Err(Error::Stage { stage, source }) => {
                assert_eq!(stage, "sampling");
                assert!(matches!(*source, Error::Oracle(_)));
            }
            other => panic!("expected tagged stage failure, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_volume_yields_empty_mesh() {
        struct Vacuum;
        impl ScalarField for Vacuum {
            fn query(&self, points: &[Point3f]) -> Result<Vec<f32>> {
                Ok(vec![0.0; points.len()])
            }
        }

        let config = ReconstructionConfig::new(unit_bounds(), 8);
        let mesh = reconstruct(&Vacuum, &FlatColor, &config).unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.face_count(), 0);
    }
}
