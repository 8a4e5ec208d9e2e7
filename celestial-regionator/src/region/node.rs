use super::{BoundingBox, Lod, MAX_TREE_DEPTH};
use crate::errors::{RegionatorError, Result};
use crate::extract::GeoPoint;

/// One tile of the regionation quad-tree.
///
/// A node is either a leaf holding at most `capacity` points, or subdivided
/// with exactly four children and no points of its own. The only exception
/// is a leaf at `max_depth`, which keeps accepting points past capacity.
#[derive(Debug, Clone)]
pub struct RegionNode {
    id: String,
    bounds: BoundingBox,
    capacity: usize,
    depth: usize,
    max_depth: usize,
    lod: Lod,
    points: Vec<GeoPoint>,
    children: Option<Box<[RegionNode; 4]>>,
    len: usize,
    overflowed: bool,
}

impl RegionNode {
    /// Whole-sky root with id `"0"`.
    pub fn root(capacity: usize, max_depth: usize, lod: Lod) -> Self {
        Self::new("0", BoundingBox::WHOLE_SKY, capacity, 0, max_depth, lod)
    }

    pub fn new(
        id: impl Into<String>,
        bounds: BoundingBox,
        capacity: usize,
        depth: usize,
        max_depth: usize,
        lod: Lod,
    ) -> Self {
        Self {
            id: id.into(),
            bounds,
            capacity,
            depth,
            max_depth: max_depth.min(MAX_TREE_DEPTH),
            lod,
            points: Vec::new(),
            children: None,
            len: 0,
            overflowed: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn lod(&self) -> Lod {
        self.lod
    }

    /// Points held directly by this node.
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// The four children, or an empty slice for a leaf.
    pub fn children(&self) -> &[RegionNode] {
        match &self.children {
            Some(children) => children.as_slice(),
            None => &[],
        }
    }

    pub fn is_subdivided(&self) -> bool {
        self.children.is_some()
    }

    /// Points held by this node and all its descendants.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds a point, subdividing on overflow. Fails only if the point lies
    /// outside this node's bounds.
    pub fn insert(&mut self, point: GeoPoint) -> Result<()> {
        if !self.bounds.contains(point.longitude, point.latitude) {
            return Err(RegionatorError::Logic(format!(
                "point {} at ({}, {}) is outside region {} {:?}",
                point.name, point.longitude, point.latitude, self.id, self.bounds
            )));
        }

        if self.children.is_none() {
            if self.points.len() < self.capacity {
                self.points.push(point);
                self.len += 1;
                return Ok(());
            }
            if self.depth >= self.max_depth {
                if !self.overflowed {
                    log::warn!(
                        "region {} reached depth {}, accepting points beyond capacity {}",
                        self.id,
                        self.depth,
                        self.capacity
                    );
                    self.overflowed = true;
                }
                self.points.push(point);
                self.len += 1;
                return Ok(());
            }
            self.subdivide()?;
        }

        let quadrant = self.bounds.quadrant(point.longitude, point.latitude);
        let children = self.children.as_mut().ok_or_else(|| {
            RegionatorError::Logic(format!("region {} lost its children", self.id))
        })?;
        children[quadrant].insert(point)?;
        self.len += 1;
        Ok(())
    }

    /// Creates the four children and moves every held point into them.
    fn subdivide(&mut self) -> Result<()> {
        let quads = self.bounds.split();
        let children: [RegionNode; 4] = std::array::from_fn(|i| {
            RegionNode::new(
                format!("{}{}", self.id, i),
                quads[i],
                self.capacity,
                self.depth + 1,
                self.max_depth,
                self.lod,
            )
        });
        let mut children = Box::new(children);

        log::trace!("subdividing region {}", self.id);
        for point in std::mem::take(&mut self.points) {
            let quadrant = self.bounds.quadrant(point.longitude, point.latitude);
            children[quadrant].insert(point)?;
        }
        self.children = Some(children);
        Ok(())
    }

    /// Pre-order traversal: a node, then its children 0 to 3.
    pub fn iter(&self) -> Nodes<'_> {
        Nodes { stack: vec![self] }
    }

    /// Number of nodes in this subtree.
    pub fn region_count(&self) -> usize {
        self.iter().count()
    }

    /// Greatest depth of any node in this subtree.
    pub fn max_depth_reached(&self) -> usize {
        self.iter().map(|n| n.depth).max().unwrap_or(self.depth)
    }
}

pub struct Nodes<'a> {
    stack: Vec<&'a RegionNode>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a RegionNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}
