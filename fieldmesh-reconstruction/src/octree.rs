//! Adaptive octree refinement of the sampling lattice
//!
//! Subdivides the grid's index cube, paying for oracle evaluations only
//! where corner values straddle the iso-level, so oracle work scales with
//! surface area rather than volume. Nodes live in a flat arena and refer
//! to children by index; traversal is iterative throughout, so deep
//! refinements never risk the call stack.
//!
//! Refinement runs level by level and every level issues its new lattice
//! sites to the oracle as one batched pass, deduplicated against sites
//! already evaluated (children inherit their parents' corners).

use crate::grid::ScalarGrid;
use crate::sampler;
use fieldmesh_core::{Aabb, Result, ScalarField};
use log::{debug, trace};
use ndarray::Array3;

/// Denominator of the baseline lattice: refinement always proceeds until
/// nodes are at most `(resolution - 1) / COARSE_DIVISIONS` cells wide, so a
/// surface missed by the root corners is still caught at coarse scale.
const COARSE_DIVISIONS: usize = 8;

/// One node of the refinement arena, covering the inclusive index cube
/// `lo..=hi` per axis. Children occupy a contiguous arena range.
#[derive(Debug, Clone, Copy)]
struct OctreeNode {
    lo: [usize; 3],
    hi: [usize; 3],
    first_child: u32,
    child_count: u8,
}

impl OctreeNode {
    fn leaf(lo: [usize; 3], hi: [usize; 3]) -> Self {
        Self {
            lo,
            hi,
            first_child: 0,
            child_count: 0,
        }
    }

    fn is_leaf(&self) -> bool {
        self.child_count == 0
    }

    /// Widest per-axis cell extent.
    fn extent(&self) -> usize {
        let e = [
            self.hi[0] - self.lo[0],
            self.hi[1] - self.lo[1],
            self.hi[2] - self.lo[2],
        ];
        e[0].max(e[1]).max(e[2])
    }

    fn splittable(&self) -> bool {
        self.extent() > 1
    }

    /// The 8 corner sites, ordered to match [`trilinear`]'s weight layout
    /// (bit 0 = x, bit 1 = y, bit 2 = z picking `hi` over `lo`).
    fn corners(&self) -> [[usize; 3]; 8] {
        let mut corners = [[0usize; 3]; 8];
        for (ci, corner) in corners.iter_mut().enumerate() {
            *corner = [
                if ci & 1 != 0 { self.hi[0] } else { self.lo[0] },
                if ci & 2 != 0 { self.hi[1] } else { self.lo[1] },
                if ci & 4 != 0 { self.hi[2] } else { self.lo[2] },
            ];
        }
        corners
    }
}

pub(crate) fn sample_adaptive<F: ScalarField>(
    field: &F,
    bounds: &Aabb,
    resolution: usize,
    iso_level: f32,
    batch_size: usize,
) -> Result<ScalarGrid> {
    let mut grid = ScalarGrid::new(*bounds, resolution)?;
    let r = resolution - 1;
    let mut sampled = Array3::from_elem((resolution, resolution, resolution), false);

    let mut nodes = vec![OctreeNode::leaf([0, 0, 0], [r, r, r])];
    let root_corners = queue_corners(&nodes[0], &mut sampled);
    sampler::evaluate_sites(field, &mut grid, &root_corners, batch_size)?;
    let mut evaluated = root_corners.len();

    let coarse = (r / COARSE_DIVISIONS).max(1);

    let mut frontier: Vec<u32> = vec![0];
    let mut level = 0usize;
    while !frontier.is_empty() {
        let mut next: Vec<u32> = Vec::new();
        let mut pending: Vec<[usize; 3]> = Vec::new();
        let mut splits = 0usize;

        for &id in &frontier {
            let node = nodes[id as usize];
            if !node.splittable() {
                continue;
            }
            // Refine while coarser than the baseline lattice, after that
            // only where the surface crosses this node.
            if node.extent() <= coarse && !straddles(&grid, &node, iso_level) {
                continue;
            }

            let first = nodes.len() as u32;
            let children = split(&node);
            nodes[id as usize].first_child = first;
            nodes[id as usize].child_count = children.len() as u8;
            splits += 1;

            for (lo, hi) in children {
                let child = OctreeNode::leaf(lo, hi);
                pending.extend(queue_corners(&child, &mut sampled));
                next.push(nodes.len() as u32);
                nodes.push(child);
            }
        }

        if !pending.is_empty() {
            sampler::evaluate_sites(field, &mut grid, &pending, batch_size)?;
            evaluated += pending.len();
        }
        trace!(
            "refinement level {}: {} nodes split, {} new sites",
            level,
            splits,
            pending.len()
        );
        level += 1;
        frontier = next;
    }

    // Materialize uniform regions: every leaf wider than one cell fills its
    // unsampled sites by trilinear interpolation of the 8 corners. Leaves
    // partition the index cube, so afterwards no site is left unfilled.
    let mut stack: Vec<u32> = vec![0];
    while let Some(id) = stack.pop() {
        let node = nodes[id as usize];
        if node.is_leaf() {
            if node.extent() > 1 {
                fill_uniform(&mut grid, &sampled, &node);
            }
        } else {
            for child in 0..node.child_count as u32 {
                stack.push(node.first_child + child);
            }
        }
    }

    debug!(
        "octree sampling: {} of {} lattice sites evaluated",
        evaluated,
        grid.site_count()
    );
    Ok(grid)
}

/// Mark and collect this node's corner sites not yet seen by the oracle.
fn queue_corners(node: &OctreeNode, sampled: &mut Array3<bool>) -> Vec<[usize; 3]> {
    let mut pending = Vec::new();
    for corner in node.corners() {
        if !sampled[corner] {
            sampled[corner] = true;
            pending.push(corner);
        }
    }
    pending
}

/// Do the node's corner values fall on both sides of the iso-level?
fn straddles(grid: &ScalarGrid, node: &OctreeNode, iso_level: f32) -> bool {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for corner in node.corners() {
        let value = grid.value(corner);
        min = min.min(value);
        max = max.max(value);
    }
    min < iso_level && max >= iso_level
}

/// Split at the per-axis midpoint. Axes of extent 1 are left whole, so
/// non-power-of-two resolutions subdivide without padding; a node yields
/// up to 8 children.
fn split(node: &OctreeNode) -> Vec<([usize; 3], [usize; 3])> {
    let mut segments: [Vec<(usize, usize)>; 3] = Default::default();
    for axis in 0..3 {
        let (lo, hi) = (node.lo[axis], node.hi[axis]);
        segments[axis] = if hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            vec![(lo, mid), (mid, hi)]
        } else {
            vec![(lo, hi)]
        };
    }

    let mut children = Vec::new();
    for &(zl, zh) in &segments[2] {
        for &(yl, yh) in &segments[1] {
            for &(xl, xh) in &segments[0] {
                children.push(([xl, yl, zl], [xh, yh, zh]));
            }
        }
    }
    children
}

/// Fill a uniform leaf's unsampled sites from its corner values. Oracle
/// truth is never overwritten.
fn fill_uniform(grid: &mut ScalarGrid, sampled: &Array3<bool>, node: &OctreeNode) {
    let mut corner_values = [0.0f32; 8];
    for (ci, corner) in node.corners().iter().enumerate() {
        corner_values[ci] = grid.value(*corner);
    }
    let extent = [
        node.hi[0] - node.lo[0],
        node.hi[1] - node.lo[1],
        node.hi[2] - node.lo[2],
    ];

    for i in node.lo[0]..=node.hi[0] {
        let tx = axis_fraction(i - node.lo[0], extent[0]);
        for j in node.lo[1]..=node.hi[1] {
            let ty = axis_fraction(j - node.lo[1], extent[1]);
            for k in node.lo[2]..=node.hi[2] {
                if sampled[[i, j, k]] {
                    continue;
                }
                let tz = axis_fraction(k - node.lo[2], extent[2]);
                grid.set([i, j, k], trilinear(&corner_values, tx, ty, tz));
            }
        }
    }
}

fn axis_fraction(offset: usize, extent: usize) -> f32 {
    if extent == 0 {
        0.0
    } else {
        offset as f32 / extent as f32
    }
}

fn trilinear(corners: &[f32; 8], tx: f32, ty: f32, tz: f32) -> f32 {
    let mut value = 0.0;
    for (ci, &corner) in corners.iter().enumerate() {
        let wx = if ci & 1 != 0 { tx } else { 1.0 - tx };
        let wy = if ci & 2 != 0 { ty } else { 1.0 - ty };
        let wz = if ci & 4 != 0 { tz } else { 1.0 - tz };
        value += corner * wx * wy * wz;
    }
    value
}
