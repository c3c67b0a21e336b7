//! Canonical tree representation (SoA) and its builder.
//!
//! This module provides:
//! - [`Tree`]: Immutable SoA tree storage for traversal
//! - [`TreeBuilder`]: Mutable construction during training
//! - [`TreeValidationError`]: Structural validation errors
//!
//! Splits are numeric: a sample goes left if `value < threshold`, right
//! otherwise. `NaN` goes left.

use serde::{Deserialize, Serialize};

use super::leaf::LeafValue;
use super::NodeId;

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeValidationError {
    /// Tree has no nodes.
    EmptyTree,
    /// Parallel arrays have different lengths.
    LengthMismatch { n_nodes: usize, field: &'static str, len: usize },
    /// A child pointer references an out-of-bounds node.
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    /// A node references itself or an earlier node as a child.
    BackEdge { node: NodeId, child: NodeId },
    /// A node is not reachable from the root.
    UnreachableNode { node: NodeId },
}

// ============================================================================
// Tree
// ============================================================================

/// Structure-of-Arrays tree storage.
///
/// Stores tree nodes in flat arrays for cache-friendly traversal.
/// Child indices are local to this tree (0 = root) and always point
/// forward, so traversal terminates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Tree<L: LeafValue> {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f64>,
    left_children: Vec<NodeId>,
    right_children: Vec<NodeId>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<L>,
}

impl<L: LeafValue> Tree<L> {
    /// A tree consisting of a single leaf.
    pub fn leaf(value: L) -> Self {
        Self {
            split_indices: vec![0],
            split_thresholds: vec![0.0],
            left_children: vec![0],
            right_children: vec![0],
            is_leaf: vec![true],
            leaf_values: vec![value],
        }
    }

    /// Number of nodes in the tree.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    /// Number of leaves.
    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&l| l).count()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> f64 {
        self.split_thresholds[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> &L {
        &self.leaf_values[node as usize]
    }

    /// Maximum root-to-leaf depth (a single leaf has depth 0).
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0 as NodeId, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            if self.is_leaf(node) {
                max_depth = max_depth.max(depth);
            } else {
                stack.push((self.left_child(node), depth + 1));
                stack.push((self.right_child(node), depth + 1));
            }
        }
        max_depth
    }

    /// Largest feature index used by any split, `None` for a single leaf.
    pub fn max_split_index(&self) -> Option<u32> {
        (0..self.n_nodes())
            .filter(|&i| !self.is_leaf[i])
            .map(|i| self.split_indices[i])
            .max()
    }

    /// Traverse the tree to find the leaf node for a sample.
    #[inline]
    pub fn traverse_to_leaf(&self, features: &[f64]) -> NodeId {
        let mut node: NodeId = 0;
        while !self.is_leaf(node) {
            let fvalue = features[self.split_index(node) as usize];
            node = if fvalue < self.split_threshold(node) || fvalue.is_nan() {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }
        node
    }

    /// Leaf value reached by a single row.
    #[inline]
    pub fn predict_row(&self, features: &[f64]) -> &L {
        self.leaf_value(self.traverse_to_leaf(features))
    }

    /// Validate basic structural invariants.
    ///
    /// Used after deserialization, where the arrays come from outside.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }
        for (field, len) in [
            ("split_indices", self.split_indices.len()),
            ("split_thresholds", self.split_thresholds.len()),
            ("left_children", self.left_children.len()),
            ("right_children", self.right_children.len()),
            ("leaf_values", self.leaf_values.len()),
        ] {
            if len != n_nodes {
                return Err(TreeValidationError::LengthMismatch { n_nodes, field, len });
            }
        }

        let mut reached = vec![false; n_nodes];
        reached[0] = true;
        for node in 0..n_nodes as NodeId {
            if self.is_leaf(node) || !reached[node as usize] {
                continue;
            }
            for (side, child) in [("left", self.left_child(node)), ("right", self.right_child(node))] {
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds { node, side, child, n_nodes });
                }
                if child <= node {
                    return Err(TreeValidationError::BackEdge { node, child });
                }
                reached[child as usize] = true;
            }
        }

        match reached.iter().position(|&r| !r) {
            Some(node) => Err(TreeValidationError::UnreachableNode { node: node as NodeId }),
            None => Ok(()),
        }
    }
}

// ============================================================================
// TreeBuilder
// ============================================================================

/// Mutable tree used while growing.
///
/// Nodes are allocated in creation order. A freshly allocated node is a leaf
/// with the default value until [`split`](Self::split) or
/// [`set_leaf`](Self::set_leaf) is called on it.
#[derive(Debug, Clone)]
pub struct TreeBuilder<L: LeafValue> {
    tree: Tree<L>,
}

impl<L: LeafValue> Default for TreeBuilder<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: LeafValue> TreeBuilder<L> {
    /// Start a tree with a single root node.
    pub fn new() -> Self {
        Self { tree: Tree::leaf(L::default()) }
    }

    /// The root node.
    #[inline]
    pub fn root(&self) -> NodeId {
        0
    }

    /// Number of allocated nodes.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.tree.n_nodes()
    }

    fn allocate(&mut self) -> NodeId {
        let t = &mut self.tree;
        let id = t.is_leaf.len() as NodeId;
        t.split_indices.push(0);
        t.split_thresholds.push(0.0);
        t.left_children.push(id);
        t.right_children.push(id);
        t.is_leaf.push(true);
        t.leaf_values.push(L::default());
        id
    }

    /// Turn `node` into a split and allocate its two children.
    ///
    /// Returns `(left, right)`.
    pub fn split(&mut self, node: NodeId, feature: u32, threshold: f64) -> (NodeId, NodeId) {
        let left = self.allocate();
        let right = self.allocate();
        let i = node as usize;
        let t = &mut self.tree;
        t.split_indices[i] = feature;
        t.split_thresholds[i] = threshold;
        t.left_children[i] = left;
        t.right_children[i] = right;
        t.is_leaf[i] = false;
        (left, right)
    }

    /// Store a leaf value on `node`.
    pub fn set_leaf(&mut self, node: NodeId, value: L) {
        let i = node as usize;
        debug_assert!(self.tree.is_leaf[i]);
        self.tree.leaf_values[i] = value;
    }

    /// Finish construction.
    pub fn freeze(self) -> Tree<L> {
        self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::leaf::ScalarLeaf;

    /// x0 < 0.5 -> 1.0, else (x1 < 2.0 -> 2.0, else 3.0)
    fn sample_tree() -> Tree<ScalarLeaf> {
        let mut b = TreeBuilder::new();
        let (l, r) = b.split(b.root(), 0, 0.5);
        b.set_leaf(l, ScalarLeaf(1.0));
        let (rl, rr) = b.split(r, 1, 2.0);
        b.set_leaf(rl, ScalarLeaf(2.0));
        b.set_leaf(rr, ScalarLeaf(3.0));
        b.freeze()
    }

    #[test]
    fn traversal_follows_thresholds() {
        let tree = sample_tree();
        assert_eq!(tree.predict_row(&[0.1, 9.0]).0, 1.0);
        assert_eq!(tree.predict_row(&[0.5, 1.0]).0, 2.0);
        assert_eq!(tree.predict_row(&[0.9, 2.0]).0, 3.0);
        assert_eq!(tree.predict_row(&[f64::NAN, 2.0]).0, 1.0);
    }

    #[test]
    fn shape_queries() {
        let tree = sample_tree();
        assert_eq!(tree.n_nodes(), 5);
        assert_eq!(tree.n_leaves(), 3);
        assert_eq!(tree.depth(), 2);
        assert_eq!(Tree::leaf(ScalarLeaf(0.0)).depth(), 0);
        assert_eq!(tree.max_split_index(), Some(1));
        assert_eq!(Tree::leaf(ScalarLeaf(0.0)).max_split_index(), None);
    }

    #[test]
    fn built_trees_validate() {
        assert_eq!(sample_tree().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_back_edges() {
        let mut tree = sample_tree();
        tree.left_children[2] = 0;
        assert!(matches!(tree.validate(), Err(TreeValidationError::BackEdge { node: 2, child: 0 })));
    }

    #[test]
    fn validate_rejects_out_of_bounds() {
        let mut tree = sample_tree();
        tree.right_children[0] = 42;
        assert!(matches!(
            tree.validate(),
            Err(TreeValidationError::ChildOutOfBounds { side: "right", .. })
        ));
    }
}
