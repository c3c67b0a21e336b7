//! Multiclass softmax objective.
//!
//! Scores are sample-major `[n_samples, n_classes]`. Gradients are stored
//! class-major `[n_classes, n_samples]` so each class's gradients form a
//! contiguous row, which is what the per-class tree and coordinate updates
//! consume.

use ndarray::{Array2, ArrayView1, ArrayView2};

/// Numerically stable in-place softmax.
#[inline]
pub fn softmax_row_inplace(row: &mut [f64]) {
    let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for v in row.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    if sum > 0.0 {
        row.iter_mut().for_each(|v| *v /= sum);
    }
}

/// Apply softmax to every row of a score matrix.
pub fn softmax_rows(scores: &mut Array2<f64>) {
    for mut row in scores.rows_mut() {
        match row.as_slice_mut() {
            Some(slice) => softmax_row_inplace(slice),
            None => {
                let mut tmp = row.to_vec();
                softmax_row_inplace(&mut tmp);
                row.iter_mut().zip(tmp).for_each(|(r, t)| *r = t);
            }
        }
    }
}

/// Gradient and hessian storage, `[n_classes, n_samples]`.
#[derive(Debug, Clone)]
pub struct Gradients {
    grads: Array2<f64>,
    hess: Array2<f64>,
}

impl Gradients {
    pub fn new(n_samples: usize, n_classes: usize) -> Self {
        Self {
            grads: Array2::zeros((n_classes, n_samples)),
            hess: Array2::zeros((n_classes, n_samples)),
        }
    }

    /// Gradients for one class.
    #[inline]
    pub fn grads(&self, class: usize) -> ArrayView1<'_, f64> {
        self.grads.row(class)
    }

    /// Hessians for one class.
    #[inline]
    pub fn hess(&self, class: usize) -> ArrayView1<'_, f64> {
        self.hess.row(class)
    }
}

/// Softmax cross-entropy for `n_classes` classes.
#[derive(Debug, Clone, Copy)]
pub struct SoftmaxLoss {
    pub n_classes: usize,
}

impl SoftmaxLoss {
    /// Hessian floor keeping Newton steps finite for saturated rows.
    const HESS_MIN: f64 = 1e-6;

    pub fn new(n_classes: usize) -> Self {
        debug_assert!(n_classes >= 2, "n_classes must be >= 2");
        Self { n_classes }
    }

    /// Fill `out` with `p - 1[y = k]` and `p (1 - p)` for every row and class.
    pub fn compute_gradients(&self, scores: ArrayView2<f64>, labels: ArrayView1<usize>, out: &mut Gradients) {
        let k = self.n_classes;
        debug_assert_eq!(scores.ncols(), k);
        let mut probs = vec![0.0; k];

        for (i, (row, &label)) in scores.rows().into_iter().zip(labels).enumerate() {
            probs.iter_mut().zip(row).for_each(|(p, &s)| *p = s);
            softmax_row_inplace(&mut probs);
            for (c, &p) in probs.iter().enumerate() {
                let indicator = if c == label { 1.0 } else { 0.0 };
                out.grads[[c, i]] = p - indicator;
                out.hess[[c, i]] = (p * (1.0 - p)).max(Self::HESS_MIN);
            }
        }
    }

    /// Log class priors, the optimal constant score.
    pub fn compute_base_score(&self, labels: ArrayView1<usize>) -> Vec<f64> {
        let n = labels.len();
        if n == 0 {
            return vec![0.0; self.n_classes];
        }
        let mut counts = vec![0.0f64; self.n_classes];
        for &y in labels {
            counts[y] += 1.0;
        }
        // Unseen classes get a small floor instead of -inf.
        counts
            .iter()
            .map(|&c| (c.max(1e-3) / n as f64).ln())
            .collect()
    }
}

/// Mean cross-entropy of predicted probabilities.
pub fn multiclass_log_loss(proba: ArrayView2<f64>, labels: ArrayView1<usize>) -> f64 {
    const EPS: f64 = 1e-15;
    let n = labels.len();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = proba
        .rows()
        .into_iter()
        .zip(labels)
        .map(|(row, &y)| -row[y].clamp(EPS, 1.0).ln())
        .sum();
    total / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn softmax_sums_to_one() {
        let mut row = [1.0, 2.0, 3.0];
        softmax_row_inplace(&mut row);
        assert_abs_diff_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(row[2] > row[1] && row[1] > row[0]);

        let mut big = [1000.0, 1000.0];
        softmax_row_inplace(&mut big);
        assert_abs_diff_eq!(big[0], 0.5);
    }

    #[test]
    fn gradients_point_towards_label() {
        let obj = SoftmaxLoss::new(3);
        let scores = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let labels = array![0usize, 1];
        let mut g = Gradients::new(2, 3);
        obj.compute_gradients(scores.view(), labels.view(), &mut g);

        assert!(g.grads(0)[0] < 0.0);
        assert!(g.grads(1)[0] > 0.0);
        assert!(g.grads(1)[1] < 0.0);
        let row_sum: f64 = (0..3).map(|c| g.grads(c)[0]).sum();
        assert_abs_diff_eq!(row_sum, 0.0, epsilon = 1e-12);
        assert!(g.hess(2).iter().all(|&h| h > 0.0));
    }

    #[test]
    fn base_score_is_log_prior() {
        let obj = SoftmaxLoss::new(3);
        let base = obj.compute_base_score(array![0usize, 0, 1, 2].view());
        assert_abs_diff_eq!(base[0], 0.5f64.ln(), epsilon = 1e-12);
        assert_abs_diff_eq!(base[1], base[2], epsilon = 1e-12);
    }

    #[test]
    fn log_loss_of_perfect_predictions_is_zero() {
        let proba = array![[1.0, 0.0], [0.0, 1.0]];
        assert_abs_diff_eq!(multiclass_log_loss(proba.view(), array![0usize, 1].view()), 0.0, epsilon = 1e-12);
    }
}
