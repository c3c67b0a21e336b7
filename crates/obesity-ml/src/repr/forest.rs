//! Canonical forest representation (collection of trees).

use serde::{Deserialize, Serialize};

use super::leaf::{ClassDistribution, LeafValue, ScalarLeaf};
use super::tree::{Tree, TreeValidationError};

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForestValidationError {
    BaseScoreLenMismatch { n_groups: u32, len: usize },
    TreeGroupsLenMismatch { n_trees: usize, len: usize },
    TreeGroupOutOfRange { tree_idx: usize, group: u32, n_groups: u32 },
    InvalidTree { tree_idx: usize, error: TreeValidationError },
}

/// Forest of decision trees.
///
/// Stores multiple trees with their group assignments. Boosted multiclass
/// forests use one group per class; random forests use a single group whose
/// leaves already carry the full class distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Forest<L: LeafValue = ScalarLeaf> {
    trees: Vec<Tree<L>>,
    tree_groups: Vec<u32>,
    n_groups: u32,
    base_score: Vec<f64>,
}

impl<L: LeafValue> Forest<L> {
    /// Create an empty forest with the given number of groups.
    pub fn new(n_groups: u32) -> Self {
        Self {
            trees: Vec::new(),
            tree_groups: Vec::new(),
            n_groups,
            base_score: vec![0.0; n_groups as usize],
        }
    }

    /// Set the base score for all groups.
    pub fn with_base_score(mut self, base_score: Vec<f64>) -> Self {
        debug_assert_eq!(base_score.len(), self.n_groups as usize);
        self.base_score = base_score;
        self
    }

    /// Add a tree to the forest.
    pub fn push_tree(&mut self, tree: Tree<L>, group: u32) {
        debug_assert!(group < self.n_groups, "group out of range");
        self.trees.push(tree);
        self.tree_groups.push(group);
    }

    /// Number of trees.
    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Number of output groups.
    #[inline]
    pub fn n_groups(&self) -> u32 {
        self.n_groups
    }

    /// Base score for each group.
    #[inline]
    pub fn base_score(&self) -> &[f64] {
        &self.base_score
    }

    /// Get a reference to a specific tree.
    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree<L> {
        &self.trees[idx]
    }

    /// Iterate over trees.
    pub fn trees(&self) -> impl Iterator<Item = &Tree<L>> {
        self.trees.iter()
    }

    /// Iterate over trees with their group assignments.
    pub fn trees_with_groups(&self) -> impl Iterator<Item = (&Tree<L>, u32)> {
        self.trees
            .iter()
            .zip(self.tree_groups.iter())
            .map(|(t, &g)| (t, g))
    }

    /// Largest feature index used by any tree.
    pub fn max_split_index(&self) -> Option<u32> {
        self.trees.iter().filter_map(Tree::max_split_index).max()
    }

    /// Validate structural invariants for this forest (trees, group assignments, base score).
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        if self.base_score.len() != self.n_groups as usize {
            return Err(ForestValidationError::BaseScoreLenMismatch {
                n_groups: self.n_groups,
                len: self.base_score.len(),
            });
        }
        if self.tree_groups.len() != self.trees.len() {
            return Err(ForestValidationError::TreeGroupsLenMismatch {
                n_trees: self.trees.len(),
                len: self.tree_groups.len(),
            });
        }

        for (i, &g) in self.tree_groups.iter().enumerate() {
            if g >= self.n_groups {
                return Err(ForestValidationError::TreeGroupOutOfRange {
                    tree_idx: i,
                    group: g,
                    n_groups: self.n_groups,
                });
            }
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|e| ForestValidationError::InvalidTree { tree_idx: i, error: e })?;
        }

        Ok(())
    }
}

/// Prediction for forests with scalar leaves.
impl Forest<ScalarLeaf> {
    /// Raw per-group scores for one row: `base_score + Σ leaf values`.
    pub fn predict_row_into(&self, features: &[f64], output: &mut [f64]) {
        debug_assert_eq!(output.len(), self.n_groups as usize);
        output.copy_from_slice(&self.base_score);
        for (tree, group) in self.trees_with_groups() {
            output[group as usize] += tree.predict_row(features).0;
        }
    }
}

/// Prediction for forests whose leaves hold class distributions.
impl Forest<ClassDistribution> {
    /// Mean of the leaf distributions reached by one row.
    pub fn predict_row_into(&self, features: &[f64], output: &mut [f64]) {
        output.fill(0.0);
        if self.trees.is_empty() {
            return;
        }
        for tree in &self.trees {
            let leaf = tree.predict_row(features);
            for (o, p) in output.iter_mut().zip(leaf.as_slice()) {
                *o += p;
            }
        }
        let inv = 1.0 / self.trees.len() as f64;
        output.iter_mut().for_each(|o| *o *= inv);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::tree::TreeBuilder;

    fn stump<L: LeafValue>(threshold: f64, left: L, right: L) -> Tree<L> {
        let mut b = TreeBuilder::new();
        let (l, r) = b.split(b.root(), 0, threshold);
        b.set_leaf(l, left);
        b.set_leaf(r, right);
        b.freeze()
    }

    #[test]
    fn scalar_forest_sums_per_group() {
        let mut forest = Forest::new(2).with_base_score(vec![0.5, -0.5]);
        forest.push_tree(stump(0.5, ScalarLeaf(1.0), ScalarLeaf(2.0)), 0);
        forest.push_tree(stump(0.5, ScalarLeaf(0.5), ScalarLeaf(1.5)), 0);
        forest.push_tree(stump(0.5, ScalarLeaf(-1.0), ScalarLeaf(1.0)), 1);

        let mut out = [0.0; 2];
        forest.predict_row_into(&[0.3], &mut out);
        assert_eq!(out, [2.0, -1.5]);
        forest.predict_row_into(&[0.7], &mut out);
        assert_eq!(out, [4.0, 0.5]);
    }

    #[test]
    fn distribution_forest_averages() {
        let mut forest = Forest::new(1);
        let d = |a: f64| ClassDistribution(vec![a, 1.0 - a]);
        forest.push_tree(stump(0.5, d(1.0), d(0.0)), 0);
        forest.push_tree(stump(0.8, d(0.5), d(0.0)), 0);

        let mut out = [0.0; 2];
        forest.predict_row_into(&[0.6], &mut out);
        assert_eq!(out, [0.25, 0.75]);
    }

    #[test]
    fn validate_catches_bad_group() {
        let mut forest: Forest<ScalarLeaf> = Forest::new(1);
        forest.trees.push(Tree::leaf(ScalarLeaf(0.0)));
        forest.tree_groups.push(3);
        assert!(matches!(
            forest.validate(),
            Err(ForestValidationError::TreeGroupOutOfRange { group: 3, .. })
        ));
    }
}
