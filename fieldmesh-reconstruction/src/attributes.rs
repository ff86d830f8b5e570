//! Chunked per-vertex attribute resolution
//!
//! Extracted meshes carry up to hundreds of thousands of vertices, and the
//! attribute oracle is the expensive end of the pipeline. Vertices are
//! resolved one bounded chunk at a time so peak memory per oracle call is
//! fixed regardless of mesh size. Chunks run sequentially, in index order;
//! the bound is a resource policy, not a concurrency scheme.

use fieldmesh_core::{
    AttributeField, Calibration, Error, ImagePlane, Point3f, Result, ScalarField, Vector3f,
};
use log::debug;

/// Default upper bound on vertices per attribute-oracle call.
pub const DEFAULT_CHUNK_SIZE: usize = 50_000;

/// Resolve one attribute per vertex through the oracle.
///
/// Vertices are partitioned into `ceil(N / chunk_size)` contiguous chunks;
/// the final chunk takes the remainder, so trailing vertices can never be
/// dropped. If a calibration is supplied, each chunk is mapped into the
/// oracle's frame first. The output is always aligned 1:1 with the input;
/// an empty input returns an empty output without touching the oracle.
pub fn resolve_attributes<A: AttributeField>(
    oracle: &A,
    vertices: &[Point3f],
    chunk_size: usize,
    calibration: Option<&Calibration>,
) -> Result<Vec<Vector3f>> {
    if chunk_size == 0 {
        return Err(Error::InvalidData(
            "attribute chunk size must be at least 1".to_string(),
        ));
    }

    let mut attributes: Vec<Vector3f> = Vec::with_capacity(vertices.len());
    for (chunk_index, chunk) in vertices.chunks(chunk_size).enumerate() {
        let points: Vec<Point3f> = match calibration {
            Some(calib) => chunk.iter().map(|p| calib.transform_point(p)).collect(),
            None => chunk.to_vec(),
        };
        let values = oracle.query(&points)?;
        if values.len() != chunk.len() {
            return Err(Error::AttributeShapeMismatch {
                chunk: chunk_index,
                expected: chunk.len(),
                actual: values.len(),
            });
        }
        attributes.extend(values);
    }

    debug!(
        "resolved {} vertex attributes in {} chunks",
        attributes.len(),
        vertices.len().div_ceil(chunk_size)
    );
    Ok(attributes)
}

/// Surface normals derived from the occupancy field itself.
///
/// Differentiates the field by central differences around each vertex and
/// remaps the resulting unit vectors from `[-1, 1]` to `[0, 1]` so they can
/// ride in the mesh's color channel. Occupancy increases toward the inside,
/// so the outward normal is the negated gradient.
pub struct FieldNormals<'a, F> {
    field: &'a F,
    step: f32,
}

impl<'a, F: ScalarField> FieldNormals<'a, F> {
    /// `step` is the finite-difference offset, typically around one grid
    /// spacing of the reconstruction that produced the vertices.
    pub fn new(field: &'a F, step: f32) -> Self {
        Self { field, step }
    }
}

impl<F: ScalarField> AttributeField for FieldNormals<'_, F> {
    fn query(&self, points: &[Point3f]) -> Result<Vec<Vector3f>> {
        // All six probes of every point go out as one oracle batch.
        let h = self.step;
        let mut probes = Vec::with_capacity(points.len() * 6);
        for p in points {
            probes.push(Point3f::new(p.x + h, p.y, p.z));
            probes.push(Point3f::new(p.x - h, p.y, p.z));
            probes.push(Point3f::new(p.x, p.y + h, p.z));
            probes.push(Point3f::new(p.x, p.y - h, p.z));
            probes.push(Point3f::new(p.x, p.y, p.z + h));
            probes.push(Point3f::new(p.x, p.y, p.z - h));
        }

        let samples = self.field.query(&probes)?;
        if samples.len() != probes.len() {
            return Err(Error::Oracle(format!(
                "scalar oracle returned {} values for {} points",
                samples.len(),
                probes.len()
            )));
        }

        let normals = points
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let b = i * 6;
                let gradient = Vector3f::new(
                    samples[b] - samples[b + 1],
                    samples[b + 2] - samples[b + 3],
                    samples[b + 4] - samples[b + 5],
                );
                let normal = if gradient.magnitude() > 1e-6 {
                    -gradient.normalize()
                } else {
                    Vector3f::new(0.0, 0.0, 1.0)
                };
                normal * 0.5 + Vector3f::new(0.5, 0.5, 0.5)
            })
            .collect();
        Ok(normals)
    }
}

/// Vertex colors sampled by orthographic projection into a source image.
///
/// Points arrive already calibrated into the camera frame (see
/// [`resolve_attributes`]); this flavor drops the depth component and hands
/// the resulting uv coordinates to the image-indexing collaborator.
pub struct ProjectedColors<'a, I> {
    image: &'a I,
}

impl<'a, I: ImagePlane> ProjectedColors<'a, I> {
    pub fn new(image: &'a I) -> Self {
        Self { image }
    }
}

impl<I: ImagePlane> AttributeField for ProjectedColors<'_, I> {
    fn query(&self, points: &[Point3f]) -> Result<Vec<Vector3f>> {
        let uv: Vec<[f32; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        let colors = self.image.sample(&uv)?;
        if colors.len() != uv.len() {
            return Err(Error::Oracle(format!(
                "image plane returned {} colors for {} coordinates",
                colors.len(),
                uv.len()
            )));
        }
        Ok(colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic attribute oracle echoing each point's coordinates.
    struct EchoField {
        calls: AtomicUsize,
    }

    impl EchoField {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl AttributeField for EchoField {
        fn query(&self, points: &[Point3f]) -> Result<Vec<Vector3f>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(points.iter().map(|p| p.coords).collect())
        }
    }

    /// Misbehaving oracle that always returns one value too few.
    struct TruncatingField;

    impl AttributeField for TruncatingField {
        fn query(&self, points: &[Point3f]) -> Result<Vec<Vector3f>> {
            Ok(points[..points.len() - 1].iter().map(|p| p.coords).collect())
        }
    }

    fn line_of_vertices(n: usize) -> Vec<Point3f> {
        (0..n).map(|i| Point3f::new(i as f32, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_output_aligned_with_input() {
        for (n, chunk_size) in [(0, 1), (1, 1), (9, 3), (10, 3), (10, 50), (100, 7)] {
            let oracle = EchoField::new();
            let vertices = line_of_vertices(n);
            let attributes = resolve_attributes(&oracle, &vertices, chunk_size, None).unwrap();
            assert_eq!(attributes.len(), n);
        }
    }

    #[test]
    fn test_empty_input_means_zero_oracle_calls() {
        let oracle = EchoField::new();
        let attributes = resolve_attributes(&oracle, &[], 10, None).unwrap();
        assert!(attributes.is_empty());
        assert_eq!(oracle.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_chunking_does_not_change_values() {
        let vertices = line_of_vertices(25);

        let whole = resolve_attributes(&EchoField::new(), &vertices, 100, None).unwrap();

        let oracle = EchoField::new();
        // 25 vertices in chunks of 4: six full chunks plus a remainder of 1.
        let chunked = resolve_attributes(&oracle, &vertices, 4, None).unwrap();
        assert_eq!(oracle.calls.load(Ordering::Relaxed), 7);
        assert_eq!(whole, chunked);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let result = resolve_attributes(&EchoField::new(), &line_of_vertices(3), 0, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_shape_mismatch_reports_chunk() {
        let result = resolve_attributes(&TruncatingField, &line_of_vertices(10), 5, None);
        match result {
            Err(Error::AttributeShapeMismatch {
                chunk,
                expected,
                actual,
            }) => {
                assert_eq!(chunk, 0);
                assert_eq!(expected, 5);
                assert_eq!(actual, 4);
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_calibration_applied_before_query() {
        let oracle = EchoField::new();
        let calib = Calibration::translation(Vector3::new(10.0, 0.0, 0.0));
        let vertices = line_of_vertices(3);
        let attributes = resolve_attributes(&oracle, &vertices, 2, Some(&calib)).unwrap();
        assert_eq!(attributes[0].x, 10.0);
        assert_eq!(attributes[2].x, 12.0);
    }

    #[test]
    fn test_field_normals_point_outward() {
        struct RadialField;
        impl ScalarField for RadialField {
            fn query(&self, points: &[Point3f]) -> Result<Vec<f32>> {
                Ok(points
                    .iter()
                    .map(|p| 0.5 + (0.5 - p.coords.magnitude()))
                    .collect())
            }
        }

        let oracle = FieldNormals::new(&RadialField, 0.01);
        let vertex = Point3f::new(0.5, 0.0, 0.0);
        let normals = oracle.query(&[vertex]).unwrap();

        // Outward at +x, remapped from [-1, 1] to [0, 1]: (1, 0, 0) -> (1, 0.5, 0.5).
        assert_relative_eq!(normals[0].x, 1.0, epsilon = 1e-3);
        assert_relative_eq!(normals[0].y, 0.5, epsilon = 1e-3);
        assert_relative_eq!(normals[0].z, 0.5, epsilon = 1e-3);
    }

    #[test]
    fn test_projected_colors_use_uv() {
        struct UvRamp;
        impl ImagePlane for UvRamp {
            fn sample(&self, uv: &[[f32; 2]]) -> Result<Vec<Vector3f>> {
                Ok(uv.iter().map(|c| Vector3f::new(c[0], c[1], 0.0)).collect())
            }
        }

        let oracle = ProjectedColors::new(&UvRamp);
        let colors = oracle
            .query(&[Point3f::new(0.25, -0.5, 7.0), Point3f::new(-1.0, 1.0, 3.0)])
            .unwrap();

        // Depth must not leak into the lookup.
        assert_eq!(colors[0], Vector3f::new(0.25, -0.5, 0.0));
        assert_eq!(colors[1], Vector3f::new(-1.0, 1.0, 0.0));
    }
}
