//! Zero-mean, unit-variance feature scaling.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Standardizes each feature column: `(x - mean) / std`.
///
/// Statistics are computed once by [`StandardScaler::fit`] and are immutable
/// afterwards; [`transform`](StandardScaler::transform) only reads them.
/// Columns with zero variance are scaled by 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
    n_samples_seen: usize,
}

impl StandardScaler {
    /// Fit on a sample-major matrix `[n_samples, n_features]`.
    ///
    /// Uses the population standard deviation.
    pub fn fit(features: ArrayView2<f64>) -> Self {
        let n_features = features.ncols();
        let n_samples = features.nrows();

        if n_samples == 0 {
            return Self {
                mean: Array1::zeros(n_features),
                scale: Array1::ones(n_features),
                n_samples_seen: 0,
            };
        }

        let mean = features.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(n_features));
        let scale = features
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > f64::EPSILON { s } else { 1.0 });

        Self { mean, scale, n_samples_seen: n_samples }
    }

    /// Per-feature means.
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Per-feature scale (standard deviation, or 1 for constant columns).
    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }

    /// Number of rows the scaler was fit on.
    pub fn n_samples_seen(&self) -> usize {
        self.n_samples_seen
    }

    /// Number of features.
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Standardize a matrix with the fitted statistics.
    ///
    /// # Panics
    ///
    /// Debug builds assert that the column count matches the fit.
    pub fn transform(&self, features: ArrayView2<f64>) -> Array2<f64> {
        debug_assert_eq!(features.ncols(), self.n_features());
        let mut out = features.to_owned();
        out -= &self.mean;
        out /= &self.scale;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn fit_transform_standardizes() {
        let x = array![[1.0, 10.0], [2.0, 10.0], [3.0, 10.0]];
        let scaler = StandardScaler::fit(x.view());
        let z = scaler.transform(x.view());

        assert_abs_diff_eq!(scaler.mean()[0], 2.0);
        assert_abs_diff_eq!(scaler.scale()[0], (2.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        // constant column: scale falls back to 1
        assert_abs_diff_eq!(scaler.scale()[1], 1.0);

        let col0 = z.column(0);
        assert_abs_diff_eq!(col0.sum(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(col0.mapv(|v| v * v).mean().unwrap(), 1.0, epsilon = 1e-12);
        assert!(z.column(1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn transform_does_not_touch_state() {
        let train = array![[0.0], [2.0], [4.0]];
        let test = array![[100.0], [-50.0]];
        let scaler = StandardScaler::fit(train.view());
        let before = scaler.clone();

        let _ = scaler.transform(test.view());
        let _ = scaler.transform(test.view());

        assert_eq!(scaler, before);
        assert_eq!(scaler.n_samples_seen(), 3);
    }
}
