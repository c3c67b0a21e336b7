//! Classification metrics for held-out evaluation.
//!
//! Precision, recall and F1 are support-weighted averages over classes, so
//! frequent categories count proportionally more. A class that is never
//! predicted has precision 0 (no division by zero).

use serde::{Deserialize, Serialize};

use crate::utils::round_to;

/// Counts of (true class, predicted class) pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    n_classes: usize,
    /// Row-major `[true, predicted]`.
    counts: Vec<usize>,
}

impl ConfusionMatrix {
    pub fn from_labels(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> Self {
        debug_assert_eq!(y_true.len(), y_pred.len());
        let mut counts = vec![0; n_classes * n_classes];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            counts[t * n_classes + p] += 1;
        }
        Self { n_classes, counts }
    }

    #[inline]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    #[inline]
    pub fn get(&self, truth: usize, predicted: usize) -> usize {
        self.counts[truth * self.n_classes + predicted]
    }

    /// Rows whose true class is `class`.
    pub fn support(&self, class: usize) -> usize {
        (0..self.n_classes).map(|p| self.get(class, p)).sum()
    }

    /// Rows predicted as `class`.
    pub fn predicted(&self, class: usize) -> usize {
        (0..self.n_classes).map(|t| self.get(t, class)).sum()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.n_classes).map(|c| self.get(c, c)).sum()
    }
}

/// Held-out scores for one model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationScores {
    pub accuracy: f64,
    pub f1: f64,
    pub precision: f64,
    pub recall: f64,
}

impl ClassificationScores {
    /// Accuracy plus support-weighted precision, recall and F1.
    pub fn evaluate(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> Self {
        let cm = ConfusionMatrix::from_labels(y_true, y_pred, n_classes);
        let total = cm.total();
        if total == 0 {
            return Self::default();
        }

        let (precision, recall, f1) = (0..n_classes).fold((0.0, 0.0, 0.0), |(sp, sr, sf), c| {
            let support = cm.support(c);
            if support == 0 {
                return (sp, sr, sf);
            }
            let tp = cm.get(c, c) as f64;
            let predicted = cm.predicted(c);
            let p = if predicted > 0 { tp / predicted as f64 } else { 0.0 };
            let r = tp / support as f64;
            let f = if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 };
            let w = support as f64;
            (sp + w * p, sr + w * r, sf + w * f)
        });

        let n = total as f64;
        Self {
            accuracy: cm.correct() as f64 / n,
            f1: f1 / n,
            precision: precision / n,
            recall: recall / n,
        }
    }

    /// Round every score to `decimals` places.
    pub fn rounded(self, decimals: i32) -> Self {
        Self {
            accuracy: round_to(self.accuracy, decimals),
            f1: round_to(self.f1, decimals),
            precision: round_to(self.precision, decimals),
            recall: round_to(self.recall, decimals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[test]
    fn confusion_matrix_counts() {
        let cm = ConfusionMatrix::from_labels(&[0, 0, 1, 2], &[0, 1, 1, 1], 3);
        assert_eq!(cm.get(0, 1), 1);
        assert_eq!(cm.support(0), 2);
        assert_eq!(cm.predicted(1), 3);
        assert_eq!(cm.correct(), 2);
        assert_eq!(cm.total(), 4);
    }

    #[test]
    fn perfect_predictions() {
        let y = [0, 1, 2, 2, 1];
        let s = ClassificationScores::evaluate(&y, &y, 3);
        assert_eq!(s, ClassificationScores { accuracy: 1.0, f1: 1.0, precision: 1.0, recall: 1.0 });
    }

    #[test]
    fn weighted_averages() {
        // class 0: support 2, predicted 1 (tp 1) -> p 1.0, r 0.5, f 2/3
        // class 1: support 1, predicted 2 (tp 1) -> p 0.5, r 1.0, f 2/3
        let s = ClassificationScores::evaluate(&[0, 0, 1], &[0, 1, 1], 2);
        assert_abs_diff_eq!(s.accuracy, 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.precision, (2.0 * 1.0 + 0.5) / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.recall, (2.0 * 0.5 + 1.0) / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.f1, 2.0 / 3.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case(&[0, 1], &[1, 1])]
    #[case(&[0, 0, 0], &[2, 2, 2])]
    fn never_predicted_class_has_zero_precision(#[case] truth: &[usize], #[case] pred: &[usize]) {
        let s = ClassificationScores::evaluate(truth, pred, 3);
        assert!(s.precision.is_finite());
        assert!((0.0..=1.0).contains(&s.f1));
        assert!(s.accuracy < 1.0);
    }

    #[test]
    fn empty_input_scores_zero() {
        assert_eq!(ClassificationScores::evaluate(&[], &[], 2), ClassificationScores::default());
    }

    #[test]
    fn rounding_to_four_places() {
        let s = ClassificationScores { accuracy: 0.123456, f1: 0.98766, precision: 0.5, recall: 1.0 / 3.0 };
        let r = s.rounded(4);
        assert_abs_diff_eq!(r.accuracy, 0.1235);
        assert_abs_diff_eq!(r.f1, 0.9877);
        assert_abs_diff_eq!(r.recall, 0.3333);
    }
}
