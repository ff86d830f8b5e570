//! # Fieldmesh Reconstruction
//!
//! Colored surface mesh reconstruction from implicit occupancy fields.
//!
//! Given a batched scalar oracle (a learned occupancy network or an analytic
//! function), this crate samples the oracle over a bounding box (densely or
//! with adaptive octree refinement), extracts the iso-surface with marching
//! cubes, resolves a per-vertex color or normal through a second oracle in
//! bounded chunks, and assembles the final mesh.

pub mod grid;
pub mod sampler;
mod octree;
pub mod marching_cubes;
pub mod attributes;
pub mod assemble;
pub mod pipeline;
pub mod parallel;

// Re-export commonly used items
pub use grid::*;
pub use sampler::*;
pub use marching_cubes::*;
pub use attributes::*;
pub use assemble::*;
pub use pipeline::*;
