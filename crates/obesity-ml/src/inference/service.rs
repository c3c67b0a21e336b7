//! The inference service: owns a loaded serving bundle and answers
//! prediction requests.
//!
//! The service is constructed once (typically at process start) and shared
//! by reference or `Arc`. The bundle is read-only after load, so concurrent
//! predictions need no locking.

use std::collections::BTreeMap;
use std::path::Path;

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use super::assembly::{AssemblyMode, FeatureAssembler};
use super::input::PatientInput;
use super::PredictError;
use crate::data::clean::bmi;
use crate::persist::{load_bundle, ServingBundle};
use crate::training::Classifier;
use crate::utils::{argmax, round_to};

/// One prediction, ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted obesity category.
    pub class_label: String,
    /// Highest class probability as a percentage, 1 decimal.
    pub confidence: f64,
    /// BMI, 1 decimal.
    pub bmi: f64,
    /// Every class probability as a percentage, 1 decimal.
    pub all_probs: BTreeMap<String, f64>,
}

/// Prediction front end over a [`ServingBundle`].
#[derive(Debug, Clone)]
pub struct InferenceService {
    bundle: ServingBundle,
    mode: AssemblyMode,
}

impl InferenceService {
    /// Load the serving bundle from disk.
    ///
    /// # Errors
    ///
    /// [`PredictError::MissingModel`] if no bundle exists at `path`, i.e. no
    /// training run has happened yet.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PredictError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PredictError::MissingModel(path.to_path_buf()));
        }
        let bundle = load_bundle(path)?;
        tracing::info!(
            path = %path.display(),
            features = bundle.meta.num_features,
            classes = bundle.meta.num_classes,
            "loaded serving bundle"
        );
        Ok(Self::from_bundle(bundle))
    }

    pub fn from_bundle(bundle: ServingBundle) -> Self {
        Self { bundle, mode: AssemblyMode::default() }
    }

    /// Use a different policy for feature columns without a value.
    pub fn with_mode(mut self, mode: AssemblyMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn bundle(&self) -> &ServingBundle {
        &self.bundle
    }

    pub fn class_names(&self) -> &[String] {
        self.bundle.transform.class_names()
    }

    fn assembler(&self) -> FeatureAssembler<'_> {
        FeatureAssembler::new(&self.bundle.transform, self.mode)
    }

    /// Predict the obesity category for one person.
    pub fn predict(&self, input: &PatientInput) -> Result<Prediction, PredictError> {
        input.validate()?;
        let row = self.assembler().assemble(input)?;
        let n_features = row.len();
        let raw = Array2::from_shape_vec((1, n_features), row)
            .map_err(|e| PredictError::Prediction(e.to_string()))?;
        let proba = self.predict_proba(raw)?;
        self.summarize(input, proba.row(0))
    }

    /// Predict for many inputs at once.
    ///
    /// Each input is validated on its own; one bad input only fails its own
    /// slot. Valid rows are scored together.
    pub fn predict_batch(&self, inputs: &[PatientInput]) -> Vec<Result<Prediction, PredictError>> {
        let assembler = self.assembler();
        let rows: Vec<Result<Vec<f64>, PredictError>> = inputs
            .iter()
            .map(|input| {
                input.validate()?;
                assembler.assemble(input)
            })
            .collect();

        let n_features = self.bundle.transform.n_features();
        let valid: Vec<f64> = rows.iter().filter_map(|r| r.as_ref().ok()).flatten().copied().collect();
        let n_valid = valid.len() / n_features.max(1);
        let scored = Array2::from_shape_vec((n_valid, n_features), valid)
            .map_err(|e| PredictError::Prediction(e.to_string()))
            .and_then(|raw| self.predict_proba(raw));

        let mut next = 0;
        rows.into_iter()
            .zip(inputs)
            .map(|(row, input)| {
                row?;
                let proba = scored.as_ref().map_err(|e| PredictError::Prediction(e.to_string()))?;
                let result = self.summarize(input, proba.row(next));
                next += 1;
                result
            })
            .collect()
    }

    /// Scale raw rows and run the ensemble.
    fn predict_proba(&self, raw: Array2<f64>) -> Result<Array2<f64>, PredictError> {
        let expected = self.bundle.ensemble.n_features();
        if raw.ncols() != expected {
            return Err(PredictError::Prediction(format!(
                "feature row has {} values, model expects {expected}",
                raw.ncols()
            )));
        }
        let scaled = self.bundle.transform.scaler.transform(raw.view());
        let proba = self.bundle.ensemble.predict_proba(scaled.view());
        if proba.iter().any(|p| !p.is_finite()) {
            return Err(PredictError::Prediction("model produced non-finite probabilities".into()));
        }
        Ok(proba)
    }

    fn summarize(&self, input: &PatientInput, proba: ArrayView1<f64>) -> Result<Prediction, PredictError> {
        let best = argmax(proba.iter().copied());
        let class_label = self
            .bundle
            .transform
            .target_encoder
            .decode(best)
            .ok_or_else(|| PredictError::Prediction(format!("class index {best} has no label")))?
            .to_string();

        let all_probs = self
            .class_names()
            .iter()
            .zip(proba.iter())
            .map(|(name, &p)| (name.clone(), round_to(p * 100.0, 1)))
            .collect();

        Ok(Prediction {
            class_label,
            confidence: round_to(proba[best] * 100.0, 1),
            bmi: round_to(bmi(input.weight_kg, input.height_m()), 1),
            all_probs,
        })
    }
}
