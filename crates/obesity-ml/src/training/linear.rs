//! Multinomial logistic regression.
//!
//! Minimizes `C * Σ softmax_loss + 0.5 * ||W||²` by cyclic coordinate
//! descent, one class and one weight at a time:
//!
//! ```text
//! grad = Σ(g × x) + λ × w
//! hess = Σ(h × x²) + λ
//! w   -= grad / hess
//! ```
//!
//! with `λ = 1 / C`. Hessians use the `1/2` upper bound of the softmax
//! curvature, which makes every coordinate step a descent step. The bias is
//! unregularized. Fitting stops when no parameter moves by more than `tol`
//! within a full sweep, or after `max_iter` sweeps.

use bon::Builder;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::classifier::{check_training_data, map_rows, Classifier, Estimator};
use super::config::ConfigError;
use super::logger::{TrainingLogger, Verbosity};
use super::objective::{softmax_row_inplace, Gradients, SoftmaxLoss};
use super::TrainError;

/// Upper bound on the diagonal softmax hessian.
const HESS_BOUND: f64 = 0.5;

// =============================================================================
// LogisticConfig
// =============================================================================

/// Logistic regression hyperparameters.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct LogisticConfig {
    /// Inverse regularization strength. Default: 1.0.
    #[builder(default = 1.0)]
    pub c: f64,

    /// Maximum coordinate descent sweeps. Default: 1000.
    #[builder(default = 1000)]
    pub max_iter: usize,

    /// Convergence tolerance on the largest weight change. Default: 1e-4.
    #[builder(default = 1e-4)]
    pub tol: f64,

    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

impl<S: logistic_config_builder::IsComplete> LogisticConfigBuilder<S> {
    /// Build and validate the configuration.
    pub fn build(self) -> Result<LogisticConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self { c: 1.0, max_iter: 1000, tol: 1e-4, verbosity: Verbosity::Silent }
    }
}

impl LogisticConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !self.c.is_finite() || self.c <= 0.0 {
            return Err(ConfigError::InvalidRegularization { field: "c", value: self.c });
        }
        if self.max_iter == 0 {
            return Err(ConfigError::InvalidCount { field: "max_iter" });
        }
        if self.tol.is_nan() || self.tol <= 0.0 {
            return Err(ConfigError::InvalidRegularization { field: "tol", value: self.tol });
        }
        Ok(())
    }
}

// =============================================================================
// LogisticModel
// =============================================================================

/// A fitted multinomial logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    /// `[n_features, n_classes]`.
    weights: Array2<f64>,
    bias: Array1<f64>,
    n_iter: usize,
    converged: bool,
}

impl LogisticModel {
    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    pub fn bias(&self) -> ArrayView1<'_, f64> {
        self.bias.view()
    }

    /// Sweeps run during fitting.
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    pub fn converged(&self) -> bool {
        self.converged
    }
}

impl Classifier for LogisticModel {
    fn n_classes(&self) -> usize {
        self.bias.len()
    }

    fn n_features(&self) -> usize {
        self.weights.nrows()
    }

    fn predict_proba(&self, features: ArrayView2<f64>) -> Array2<f64> {
        map_rows(features, self.n_classes(), |row, out| {
            for (k, o) in out.iter_mut().enumerate() {
                *o = self.bias[k] + row.iter().zip(self.weights.column(k)).map(|(x, w)| x * w).sum::<f64>();
            }
            softmax_row_inplace(out);
        })
    }
}

impl Estimator for LogisticConfig {
    type Model = LogisticModel;
    const NAME: &'static str = "logistic_regression";

    fn fit(
        &self,
        features: ArrayView2<f64>,
        labels: ArrayView1<usize>,
        n_classes: usize,
    ) -> Result<LogisticModel, TrainError> {
        self.validate()?;
        check_training_data(Self::NAME, features, labels, n_classes)?;

        let n_rows = features.nrows();
        let n_features = features.ncols();
        let lambda = 1.0 / self.c;

        // Feature-major copy so each coordinate reads one contiguous row.
        let columns = features.t().as_standard_layout().into_owned();
        let sq_norms: Vec<f64> = columns.axis_iter(Axis(0)).map(|col| col.dot(&col)).collect();

        let mut weights = Array2::<f64>::zeros((n_features, n_classes));
        let mut bias = Array1::<f64>::zeros(n_classes);
        let mut scores = Array2::<f64>::zeros((n_rows, n_classes));
        let loss = SoftmaxLoss::new(n_classes);
        let mut gradients = Gradients::new(n_rows, n_classes);

        let mut logger = TrainingLogger::new(self.verbosity, Self::NAME);
        logger.start_training(self.max_iter);

        let mut n_iter = 0;
        let mut converged = false;
        let mut grad = vec![0.0; n_rows];

        while n_iter < self.max_iter {
            n_iter += 1;
            loss.compute_gradients(scores.view(), labels, &mut gradients);
            let mut max_delta = 0.0f64;

            for k in 0..n_classes {
                grad.iter_mut().zip(gradients.grads(k)).for_each(|(d, &g)| *d = g);

                // Bias
                let delta = -grad.iter().sum::<f64>() / (HESS_BOUND * n_rows as f64);
                bias[k] += delta;
                max_delta = max_delta.max(delta.abs());
                grad.iter_mut().for_each(|g| *g += HESS_BOUND * delta);
                scores.column_mut(k).iter_mut().for_each(|s| *s += delta);

                for j in 0..n_features {
                    let x = columns.row(j);
                    let w = weights[[j, k]];
                    let grad_l2 = grad.iter().zip(x).map(|(g, x)| g * x).sum::<f64>() + lambda * w;
                    let hess_l2 = HESS_BOUND * sq_norms[j] + lambda;
                    if hess_l2 < 1e-10 {
                        continue;
                    }
                    let delta = -grad_l2 / hess_l2;
                    if delta.abs() <= 1e-12 {
                        continue;
                    }
                    weights[[j, k]] += delta;
                    max_delta = max_delta.max(delta.abs());
                    for (i, &xi) in x.iter().enumerate() {
                        grad[i] += HESS_BOUND * delta * xi;
                        scores[[i, k]] += delta * xi;
                    }
                }
            }

            logger.log_round(n_iter, "max_delta", max_delta);
            if max_delta < self.tol {
                converged = true;
                break;
            }
        }

        if !converged {
            logger.log_warning(&format!(
                "did not converge after {} iterations, consider raising max_iter",
                self.max_iter
            ));
        }
        logger.finish_training(n_iter);

        Ok(LogisticModel { weights, bias, n_iter, converged })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::data::blobs;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn learns_separable_blobs() {
        let (x, y) = blobs(150, 3, 4, 3);
        let model = LogisticConfig::default().fit(x.view(), y.view(), 3).unwrap();
        assert_eq!(model.n_features(), 4);

        let pred = model.predict(x.view());
        let acc = pred.iter().zip(&y).filter(|(p, t)| p == t).count() as f64 / y.len() as f64;
        assert!(acc > 0.9, "train accuracy {acc}");
        for row in model.predict_proba(x.view()).rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn stronger_regularization_shrinks_weights() {
        let (x, y) = blobs(90, 3, 3, 5);
        let loose = LogisticConfig::builder().c(10.0).build().unwrap();
        let tight = LogisticConfig::builder().c(0.01).build().unwrap();
        let norm = |m: &LogisticModel| m.weights().iter().map(|w| w * w).sum::<f64>();
        let loose = loose.fit(x.view(), y.view(), 3).unwrap();
        let tight = tight.fit(x.view(), y.view(), 3).unwrap();
        assert!(norm(&tight) < norm(&loose));
    }

    #[test]
    fn zero_weights_predict_priors() {
        // A constant feature carries no signal, only the bias moves.
        let x = array![[0.0], [0.0], [0.0], [0.0]];
        let y = array![0usize, 0, 0, 1];
        let model = LogisticConfig::default().fit(x.view(), y.view(), 2).unwrap();
        let p = model.predict_proba(x.view());
        assert_abs_diff_eq!(p[[0, 0]], 0.75, epsilon = 1e-3);
    }

    #[test]
    fn non_convergence_is_reported_not_fatal() {
        let (x, y) = blobs(60, 2, 2, 1);
        let config = LogisticConfig::builder().max_iter(1).tol(1e-12).build().unwrap();
        let model = config.fit(x.view(), y.view(), 2).unwrap();
        assert_eq!(model.n_iter(), 1);
        assert!(!model.converged());
    }

    #[test]
    fn rejects_non_positive_c() {
        assert!(matches!(
            LogisticConfig::builder().c(0.0).build(),
            Err(ConfigError::InvalidRegularization { field: "c", .. })
        ));
    }
}
