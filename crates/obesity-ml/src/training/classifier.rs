//! Capability traits shared by every classifier.
//!
//! An [`Estimator`] is an unfitted configuration; [`Estimator::fit`] turns it
//! into a fitted [`Classifier`]. All matrices are sample-major
//! `[n_samples, n_features]`, probabilities are `[n_samples, n_classes]`.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use super::TrainError;
use crate::utils::argmax;

/// A fitted probabilistic classifier.
pub trait Classifier {
    /// Number of classes the model predicts over.
    fn n_classes(&self) -> usize;

    /// Number of input features expected.
    fn n_features(&self) -> usize;

    /// Class probabilities, one row per sample. Each row sums to 1.
    fn predict_proba(&self, features: ArrayView2<f64>) -> Array2<f64>;

    /// Most probable class per sample. Ties resolve to the lower class index.
    fn predict(&self, features: ArrayView2<f64>) -> Array1<usize> {
        self.predict_proba(features)
            .rows()
            .into_iter()
            .map(|row| argmax(row.iter().copied()))
            .collect()
    }
}

/// An unfitted model configuration.
pub trait Estimator {
    type Model: Classifier;

    /// Short model name used in logs and errors.
    const NAME: &'static str;

    /// Fit on labelled data. Labels must lie in `0..n_classes`.
    fn fit(
        &self,
        features: ArrayView2<f64>,
        labels: ArrayView1<usize>,
        n_classes: usize,
    ) -> Result<Self::Model, TrainError>;
}

/// Evaluate `f(row, out_row)` for every sample, producing `[n_samples, n_outputs]`.
///
/// Rows are handed to `f` as contiguous slices regardless of the input layout.
pub(crate) fn map_rows(
    features: ArrayView2<f64>,
    n_outputs: usize,
    mut f: impl FnMut(&[f64], &mut [f64]),
) -> Array2<f64> {
    let mut out = Array2::zeros((features.nrows(), n_outputs));
    let mut buf = Vec::with_capacity(features.ncols());
    for (row, mut out_row) in features.rows().into_iter().zip(out.rows_mut()) {
        let row = match row.to_slice() {
            Some(slice) => slice,
            None => {
                buf.clear();
                buf.extend(row.iter().copied());
                &buf
            }
        };
        match out_row.as_slice_mut() {
            Some(dst) => f(row, dst),
            None => {
                let mut tmp = vec![0.0; n_outputs];
                f(row, &mut tmp);
                out_row.iter_mut().zip(tmp).for_each(|(o, t)| *o = t);
            }
        }
    }
    out
}

/// Shared input checks for every `fit`.
///
/// # Errors
///
/// - [`TrainError::ShapeMismatch`] if features and labels disagree on rows
/// - [`TrainError::FitFailure`] for out-of-range labels
/// - [`TrainError::DegenerateFold`] if fewer than two classes are present
pub(crate) fn check_training_data(
    model: &'static str,
    features: ArrayView2<f64>,
    labels: ArrayView1<usize>,
    n_classes: usize,
) -> Result<(), TrainError> {
    if features.nrows() != labels.len() {
        return Err(TrainError::ShapeMismatch { expected: features.nrows(), actual: labels.len() });
    }
    if let Some(&bad) = labels.iter().find(|&&y| y >= n_classes) {
        return Err(TrainError::FitFailure {
            model,
            reason: format!("label {bad} outside 0..{n_classes}"),
        });
    }
    let mut seen = vec![false; n_classes];
    labels.iter().for_each(|&y| seen[y] = true);
    let present = seen.iter().filter(|&&s| s).count();
    if present < 2 {
        return Err(TrainError::DegenerateFold { n_classes: present });
    }
    if features.iter().any(|v| !v.is_finite()) {
        return Err(TrainError::FitFailure { model, reason: "non-finite feature value".into() });
    }
    Ok(())
}
