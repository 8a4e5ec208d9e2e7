//! Capacity-bounded quad-tree over the whole sky.
//!
//! The root spans longitude `[-180, 180]` and latitude `[-90, 90]`. A full
//! node splits into four children at the longitude midpoint and at the
//! latitude that halves its solid angle, then pushes its points down.
//! Children are numbered SW, SE, NW, NE and their ids append that digit
//! to the parent id.

mod bounds;
mod node;

pub use bounds::BoundingBox;
pub use node::{Nodes, RegionNode};

use crate::errors::Result;
use crate::extract::GeoPoint;

/// Deepest level any tree may reach. Past this the boxes shrink below
/// f64 resolution and insertion would recurse without separating points.
pub const MAX_TREE_DEPTH: usize = 50;

/// Level-of-detail pixel thresholds shared by every region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lod {
    pub min_pixels: i64,
    /// `-1` disables the upper threshold.
    pub max_pixels: i64,
}

impl Lod {
    pub fn new(min_pixels: i64, max_pixels: i64) -> Self {
        Self {
            min_pixels,
            max_pixels,
        }
    }
}

/// Inserts every point, in order, into a fresh whole-sky tree.
pub fn build_tree<I>(points: I, capacity: usize, max_depth: usize, lod: Lod) -> Result<RegionNode>
where
    I: IntoIterator<Item = GeoPoint>,
{
    let mut root = RegionNode::root(capacity, max_depth, lod);
    for point in points {
        root.insert(point)?;
    }
    log::debug!(
        "built tree: {} points, {} regions",
        root.len(),
        root.region_count()
    );
    Ok(root)
}
