//! Leaf value types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Trait for values stored at tree leaves.
pub trait LeafValue: Clone + Default + Send + Sync + Serialize + DeserializeOwned {
    /// Accumulate another leaf value (for prediction summation).
    fn accumulate(&mut self, other: &Self);

    /// Scale the leaf value by a factor.
    fn scale(&mut self, factor: f64);
}

/// Scalar leaf value (single f64). Used by boosted trees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalarLeaf(pub f64);

impl LeafValue for ScalarLeaf {
    #[inline]
    fn accumulate(&mut self, other: &Self) {
        self.0 += other.0;
    }

    #[inline]
    fn scale(&mut self, factor: f64) {
        self.0 *= factor;
    }
}

impl From<f64> for ScalarLeaf {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<ScalarLeaf> for f64 {
    fn from(leaf: ScalarLeaf) -> Self {
        leaf.0
    }
}

/// Per-class probability vector. Used by random-forest trees.
///
/// An empty distribution acts as zero when accumulated into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDistribution(pub Vec<f64>);

impl ClassDistribution {
    /// Normalized class frequencies from per-class counts.
    pub fn from_counts(counts: &[f64]) -> Self {
        let total: f64 = counts.iter().sum();
        if total <= 0.0 {
            let n = counts.len().max(1) as f64;
            return Self(vec![1.0 / n; counts.len()]);
        }
        Self(counts.iter().map(|c| c / total).collect())
    }

    /// Probabilities in class order.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl LeafValue for ClassDistribution {
    fn accumulate(&mut self, other: &Self) {
        if self.0.is_empty() {
            self.0 = other.0.clone();
            return;
        }
        debug_assert_eq!(self.0.len(), other.0.len());
        for (a, b) in self.0.iter_mut().zip(&other.0) {
            *a += b;
        }
    }

    fn scale(&mut self, factor: f64) {
        self.0.iter_mut().for_each(|v| *v *= factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn scalar_accumulate_and_scale() {
        let mut a = ScalarLeaf(1.5);
        a.accumulate(&ScalarLeaf(2.0));
        a.scale(2.0);
        assert_abs_diff_eq!(a.0, 7.0);
    }

    #[test]
    fn distribution_from_counts() {
        let d = ClassDistribution::from_counts(&[1.0, 3.0, 0.0]);
        assert_eq!(d.as_slice(), &[0.25, 0.75, 0.0]);

        let uniform = ClassDistribution::from_counts(&[0.0, 0.0]);
        assert_eq!(uniform.as_slice(), &[0.5, 0.5]);
    }

    #[test]
    fn distribution_accumulates_into_empty() {
        let mut acc = ClassDistribution::default();
        acc.accumulate(&ClassDistribution(vec![0.2, 0.8]));
        acc.accumulate(&ClassDistribution(vec![0.6, 0.4]));
        acc.scale(0.5);
        assert_abs_diff_eq!(acc.0[0], 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(acc.0[1], 0.6, epsilon = 1e-12);
    }
}
