//! Decision-tree growing.
//!
//! Two growers share the same node layout ([`TreeBuilder`]) and split
//! convention (`value < threshold` goes left):
//!
//! - [`CartGrower`]: classification trees minimizing Gini impurity, with
//!   per-node random feature subsets. Leaves hold class distributions.
//!   Used by the random forest.
//! - [`GradientGrower`]: depth-wise regression trees on gradient/hessian
//!   statistics with the second-order gain. Leaves hold Newton steps.
//!   Used by gradient boosting.

use ndarray::{ArrayView1, ArrayView2};
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::repr::{ClassDistribution, NodeId, ScalarLeaf, Tree, TreeBuilder};

/// Threshold between two consecutive distinct sorted values.
///
/// Guaranteed to satisfy `lo < threshold <= hi`, so `lo` goes left and
/// `hi` goes right.
#[inline]
fn midpoint(lo: f64, hi: f64) -> f64 {
    let mid = lo + (hi - lo) / 2.0;
    if mid <= lo {
        hi
    } else {
        mid
    }
}

/// A chosen split for one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitCandidate {
    pub feature: usize,
    pub threshold: f64,
    /// Higher is better.
    pub score: f64,
}

// =============================================================================
// CART (Gini)
// =============================================================================

/// Gini impurity of a class-count vector.
#[inline]
pub fn gini(counts: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|&c| (c / total) * (c / total)).sum::<f64>()
}

/// Structural limits for classification trees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartParams {
    /// Maximum depth. `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    /// Minimum rows required to split a node.
    pub min_samples_split: usize,
    /// Minimum rows in each child.
    pub min_samples_leaf: usize,
    /// Features examined per split.
    pub max_features: usize,
}

/// Grows one Gini classification tree.
pub struct CartGrower<'a> {
    features: ArrayView2<'a, f64>,
    labels: ArrayView1<'a, usize>,
    n_classes: usize,
    params: CartParams,
}

impl<'a> CartGrower<'a> {
    pub fn new(
        features: ArrayView2<'a, f64>,
        labels: ArrayView1<'a, usize>,
        n_classes: usize,
        params: CartParams,
    ) -> Self {
        debug_assert_eq!(features.nrows(), labels.len());
        Self { features, labels, n_classes, params }
    }

    /// Grow a tree on `rows` (may contain duplicates, e.g. a bootstrap sample).
    pub fn grow(&self, rows: Vec<usize>, rng: &mut StdRng) -> Tree<ClassDistribution> {
        let mut builder = TreeBuilder::new();
        let mut stack: Vec<(NodeId, Vec<usize>, usize)> = vec![(builder.root(), rows, 0)];
        let mut scratch: Vec<(f64, usize)> = Vec::new();

        while let Some((node, rows, depth)) = stack.pop() {
            let counts = self.class_counts(&rows);
            let n = rows.len();
            let is_pure = counts.iter().filter(|&&c| c > 0.0).count() <= 1;
            let depth_reached = self.params.max_depth.is_some_and(|d| depth >= d);

            let split = if is_pure || depth_reached || n < self.params.min_samples_split {
                None
            } else {
                self.find_split(&rows, &counts, rng, &mut scratch)
            };

            match split {
                None => builder.set_leaf(node, ClassDistribution::from_counts(&counts)),
                Some(split) => {
                    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                        .into_iter()
                        .partition(|&r| self.features[[r, split.feature]] < split.threshold);
                    let (left, right) = builder.split(node, split.feature as u32, split.threshold);
                    stack.push((right, right_rows, depth + 1));
                    stack.push((left, left_rows, depth + 1));
                }
            }
        }

        builder.freeze()
    }

    fn class_counts(&self, rows: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; self.n_classes];
        for &r in rows {
            counts[self.labels[r]] += 1.0;
        }
        counts
    }

    /// Best Gini split over a random feature subset.
    ///
    /// Features are visited in random order. The first `max_features` are
    /// always examined; the search continues past that only until at least
    /// one valid split has been found.
    fn find_split(
        &self,
        rows: &[usize],
        counts: &[f64],
        rng: &mut StdRng,
        scratch: &mut Vec<(f64, usize)>,
    ) -> Option<SplitCandidate> {
        let n = rows.len();
        let n_f = n as f64;
        let min_leaf = self.params.min_samples_leaf.max(1);

        let mut order: Vec<usize> = (0..self.features.ncols()).collect();
        order.shuffle(rng);

        let mut best: Option<SplitCandidate> = None;
        let mut left = vec![0.0; self.n_classes];
        let mut right = vec![0.0; self.n_classes];

        for (visited, &feature) in order.iter().enumerate() {
            if visited >= self.params.max_features && best.is_some() {
                break;
            }

            scratch.clear();
            scratch.extend(rows.iter().map(|&r| (self.features[[r, feature]], self.labels[r])));
            scratch.sort_by(|a, b| a.0.total_cmp(&b.0));
            if scratch[0].0 == scratch[n - 1].0 {
                continue;
            }

            left.fill(0.0);
            for i in 0..n - 1 {
                left[scratch[i].1] += 1.0;
                let (x, next) = (scratch[i].0, scratch[i + 1].0);
                let n_left = i + 1;
                let distinct = x < next;
                if !distinct || n_left < min_leaf || n - n_left < min_leaf {
                    continue;
                }
                for ((r, &c), &l) in right.iter_mut().zip(counts).zip(&left) {
                    *r = c - l;
                }
                let nl = n_left as f64;
                let nr = n_f - nl;
                let impurity = (nl * gini(&left, nl) + nr * gini(&right, nr)) / n_f;
                let score = -impurity;
                if best.map_or(true, |b| score > b.score) {
                    best = Some(SplitCandidate { feature, threshold: midpoint(x, next), score });
                }
            }
        }

        best
    }
}

// =============================================================================
// Gradient Trees
// =============================================================================

/// Parameters for split gain computation and leaf weight calculation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GainParams {
    /// L2 regularization (lambda).
    pub reg_lambda: f64,
    /// Minimum split gain (gamma).
    pub min_gain: f64,
    /// Minimum sum of hessians per child.
    pub min_child_weight: f64,
    /// Minimum samples per child.
    pub min_samples_leaf: u32,
}

impl Default for GainParams {
    fn default() -> Self {
        Self {
            reg_lambda: 1.0,
            min_gain: 0.0,
            min_child_weight: 1e-3,
            min_samples_leaf: 1,
        }
    }
}

impl GainParams {
    /// Split gain.
    ///
    /// ```text
    /// gain = 0.5 * [G_L²/(H_L + λ) + G_R²/(H_R + λ) - G_P²/(H_P + λ)] - γ
    /// ```
    #[inline]
    pub fn compute_gain(
        &self,
        grad_left: f64,
        hess_left: f64,
        grad_right: f64,
        hess_right: f64,
        grad_parent: f64,
        hess_parent: f64,
    ) -> f64 {
        let lambda = self.reg_lambda;
        let score_left = grad_left * grad_left / (hess_left + lambda);
        let score_right = grad_right * grad_right / (hess_right + lambda);
        let score_parent = grad_parent * grad_parent / (hess_parent + lambda);
        0.5 * (score_left + score_right - score_parent) - self.min_gain
    }

    /// Check if a split satisfies minimum constraints.
    #[inline]
    pub fn is_valid_split(&self, hess_left: f64, hess_right: f64, count_left: u32, count_right: u32) -> bool {
        hess_left >= self.min_child_weight
            && hess_right >= self.min_child_weight
            && count_left >= self.min_samples_leaf
            && count_right >= self.min_samples_leaf
    }

    /// Newton leaf weight `-G / (H + λ)`.
    #[inline]
    pub fn compute_leaf_weight(&self, grad_sum: f64, hess_sum: f64) -> f64 {
        -grad_sum / (hess_sum + self.reg_lambda)
    }
}

/// Row indices sorted by value, per feature. Computed once per fit.
#[derive(Debug, Clone)]
pub struct PresortedFeatures {
    order: Vec<Vec<usize>>,
}

impl PresortedFeatures {
    pub fn new(features: ArrayView2<f64>) -> Self {
        let order = features
            .columns()
            .into_iter()
            .map(|col| {
                let mut idx: Vec<usize> = (0..col.len()).collect();
                idx.sort_by(|&a, &b| col[a].total_cmp(&col[b]));
                idx
            })
            .collect();
        Self { order }
    }

    #[inline]
    pub fn order(&self, feature: usize) -> &[usize] {
        &self.order[feature]
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct NodeStats {
    grad: f64,
    hess: f64,
    count: u32,
}

impl NodeStats {
    #[inline]
    fn add(&mut self, grad: f64, hess: f64) {
        self.grad += grad;
        self.hess += hess;
        self.count += 1;
    }
}

#[derive(Debug, Clone, Copy)]
struct Sweep {
    left: NodeStats,
    last: f64,
}

/// A grown gradient tree plus the leaf each training row landed in.
#[derive(Debug, Clone)]
pub struct GrownTree {
    pub tree: Tree<ScalarLeaf>,
    pub row_leaves: Vec<NodeId>,
}

/// Grows depth-wise regression trees on gradient statistics.
///
/// Every level is evaluated in one sweep over the presorted rows per
/// feature, accumulating left statistics for all frontier nodes at once.
pub struct GradientGrower<'a> {
    features: ArrayView2<'a, f64>,
    presorted: &'a PresortedFeatures,
    gain: &'a GainParams,
    max_depth: usize,
}

impl<'a> GradientGrower<'a> {
    pub fn new(
        features: ArrayView2<'a, f64>,
        presorted: &'a PresortedFeatures,
        gain: &'a GainParams,
        max_depth: usize,
    ) -> Self {
        Self { features, presorted, gain, max_depth }
    }

    /// Grow one tree. Leaf values are scaled by `learning_rate`.
    pub fn grow(&self, grads: ArrayView1<f64>, hess: ArrayView1<f64>, learning_rate: f64) -> GrownTree {
        let n_rows = self.features.nrows();
        let n_features = self.features.ncols();
        let mut builder = TreeBuilder::<ScalarLeaf>::new();
        let mut position: Vec<NodeId> = vec![0; n_rows];

        let mut stats = vec![NodeStats::default()];
        for row in 0..n_rows {
            stats[0].add(grads[row], hess[row]);
        }
        let mut frontier: Vec<NodeId> = vec![builder.root()];

        for _depth in 0..self.max_depth {
            if frontier.is_empty() {
                break;
            }

            // node id -> frontier slot
            let mut slot: Vec<Option<usize>> = vec![None; builder.n_nodes()];
            for (s, &node) in frontier.iter().enumerate() {
                slot[node as usize] = Some(s);
            }

            let mut best: Vec<Option<SplitCandidate>> = vec![None; frontier.len()];
            for feature in 0..n_features {
                let mut sweeps: Vec<Sweep> =
                    vec![Sweep { left: NodeStats::default(), last: f64::NEG_INFINITY }; frontier.len()];
                for &row in self.presorted.order(feature) {
                    let Some(s) = slot[position[row] as usize] else {
                        continue;
                    };
                    let x = self.features[[row, feature]];
                    let sweep = &mut sweeps[s];
                    if sweep.left.count > 0 && x > sweep.last {
                        let parent = stats[frontier[s] as usize];
                        let left = sweep.left;
                        let (g_r, h_r) = (parent.grad - left.grad, parent.hess - left.hess);
                        let c_r = parent.count - left.count;
                        if self.gain.is_valid_split(left.hess, h_r, left.count, c_r) {
                            let score =
                                self.gain.compute_gain(left.grad, left.hess, g_r, h_r, parent.grad, parent.hess);
                            if score > 0.0 && best[s].map_or(true, |b| score > b.score) {
                                best[s] = Some(SplitCandidate {
                                    feature,
                                    threshold: midpoint(sweep.last, x),
                                    score,
                                });
                            }
                        }
                    }
                    sweep.left.add(grads[row], hess[row]);
                    sweep.last = x;
                }
            }

            // Apply splits, collect the next frontier.
            let mut children: Vec<Option<(NodeId, NodeId, SplitCandidate)>> = vec![None; builder.n_nodes()];
            let mut next = Vec::new();
            for (s, &node) in frontier.iter().enumerate() {
                match best[s] {
                    Some(split) => {
                        let (l, r) = builder.split(node, split.feature as u32, split.threshold);
                        children[node as usize] = Some((l, r, split));
                        next.push(l);
                        next.push(r);
                    }
                    None => {
                        let st = stats[node as usize];
                        let w = self.gain.compute_leaf_weight(st.grad, st.hess) * learning_rate;
                        builder.set_leaf(node, ScalarLeaf(w));
                    }
                }
            }

            stats.resize(builder.n_nodes(), NodeStats::default());
            for row in 0..n_rows {
                if let Some((l, r, split)) = children[position[row] as usize] {
                    let x = self.features[[row, split.feature]];
                    let child = if x < split.threshold || x.is_nan() { l } else { r };
                    position[row] = child;
                    stats[child as usize].add(grads[row], hess[row]);
                }
            }
            frontier = next;
        }

        for &node in &frontier {
            let st = stats[node as usize];
            let w = self.gain.compute_leaf_weight(st.grad, st.hess) * learning_rate;
            builder.set_leaf(node, ScalarLeaf(w));
        }

        GrownTree { tree: builder.freeze(), row_leaves: position }
    }
}
