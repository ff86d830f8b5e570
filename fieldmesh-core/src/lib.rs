//! Core data structures and traits for fieldmesh
//!
//! This crate provides the fundamental types shared by the reconstruction
//! pipeline: points, bounding volumes, triangle meshes with per-vertex
//! attributes, calibration transforms, and the batched point-query traits
//! implemented by field oracles.

pub mod point;
pub mod bbox;
pub mod mesh;
pub mod oracle;
pub mod transform;
pub mod error;

pub use point::*;
pub use bbox::*;
pub use mesh::*;
pub use oracle::*;
pub use transform::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point3, Vector3};
