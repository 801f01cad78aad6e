//! Bounding-volume tree storage for a tile's polygons
//!
//! The tree is stored as a flat node array in depth-first order. A node's
//! index field is either a polygon index (leaf) or a negative escape offset
//! used to skip the node's subtree during traversal. Construction of the
//! tree from polygon geometry happens during mesh generation, not here;
//! this module only holds the nodes.

use tilenav_common::PolyBounds;

/// Node of a bounding-volume tree
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct BvNode {
    /// Integer-quantized bounds of the node
    pub bounds: PolyBounds,
    /// Polygon index for leaves, negative escape offset for internal nodes
    pub index: i32,
}

impl BvNode {
    /// Whether the node is a leaf pointing at a polygon
    pub fn is_leaf(&self) -> bool {
        self.index >= 0
    }
}

/// Flat bounding-volume tree over a tile's polygons
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct BvTree {
    nodes: Vec<BvNode>,
}

impl BvTree {
    /// Creates a tree from nodes already in tree order
    pub fn new(nodes: Vec<BvNode>) -> Self {
        Self { nodes }
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The nodes in tree order
    pub fn nodes(&self) -> &[BvNode] {
        &self.nodes
    }
}

impl From<Vec<BvNode>> for BvTree {
    fn from(nodes: Vec<BvNode>) -> Self {
        Self::new(nodes)
    }
}

impl std::ops::Index<usize> for BvTree {
    type Output = BvNode;

    fn index(&self, index: usize) -> &BvNode {
        &self.nodes[index]
    }
}
