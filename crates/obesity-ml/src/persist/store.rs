//! Named artifact layout on disk.
//!
//! ```text
//! <model_dir>/random_forest.bin
//! <model_dir>/logistic_regression.bin
//! <model_dir>/gradient_boosting.bin
//! <model_dir>/ensemble_model.bin
//! <model_dir>/preprocessor.bin
//! <model_dir>/obesity_model.bin          serving bundle
//! <output_dir>/model_stats.json
//! <output_dir>/preprocessing_report.json
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::bundle::ServingBundle;
use super::codec::{read_artifact, write_artifact, write_report};
use super::PersistError;
use crate::data::{PreprocessingReport, TransformBundle};
use crate::training::{ModelStats, TrainedModels};

pub const RANDOM_FOREST_FILE: &str = "random_forest.bin";
pub const LOGISTIC_FILE: &str = "logistic_regression.bin";
pub const BOOSTING_FILE: &str = "gradient_boosting.bin";
pub const ENSEMBLE_FILE: &str = "ensemble_model.bin";
pub const PREPROCESSOR_FILE: &str = "preprocessor.bin";
pub const SERVING_BUNDLE_FILE: &str = "obesity_model.bin";
pub const MODEL_STATS_FILE: &str = "model_stats.json";
pub const PREPROCESSING_REPORT_FILE: &str = "preprocessing_report.json";

/// Writes and reads the artifacts of one training run.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    model_dir: PathBuf,
    output_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(model_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self { model_dir: model_dir.into(), output_dir: output_dir.into() }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the serving bundle.
    pub fn bundle_path(&self) -> PathBuf {
        self.model_dir.join(SERVING_BUNDLE_FILE)
    }

    pub fn stats_path(&self) -> PathBuf {
        self.output_dir.join(MODEL_STATS_FILE)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(PREPROCESSING_REPORT_FILE)
    }

    /// Persist every model, the transform bundle, the serving bundle and
    /// the evaluation stats. Returns the written paths in write order.
    pub fn save_training(
        &self,
        models: &TrainedModels,
        transform: &TransformBundle,
    ) -> Result<Vec<PathBuf>, PersistError> {
        let bundle = ServingBundle::new(models.ensemble.clone(), transform.clone(), models.stats.clone());
        let written = vec![
            self.save_model(RANDOM_FOREST_FILE, &models.random_forest)?,
            self.save_model(LOGISTIC_FILE, &models.logistic)?,
            self.save_model(BOOSTING_FILE, &models.boosting)?,
            self.save_model(ENSEMBLE_FILE, &models.ensemble)?,
            self.save_model(PREPROCESSOR_FILE, transform)?,
            self.save_model(SERVING_BUNDLE_FILE, &bundle)?,
            self.save_stats(&models.stats)?,
        ];
        Ok(written)
    }

    fn save_model<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, PersistError> {
        let path = self.model_dir.join(name);
        write_artifact(&path, value)?;
        tracing::info!(path = %path.display(), "saved artifact");
        Ok(path)
    }

    pub fn save_stats(&self, stats: &ModelStats) -> Result<PathBuf, PersistError> {
        let path = self.stats_path();
        write_report(&path, stats)?;
        tracing::info!(path = %path.display(), "saved evaluation stats");
        Ok(path)
    }

    pub fn save_report(&self, report: &PreprocessingReport) -> Result<PathBuf, PersistError> {
        let path = self.report_path();
        write_report(&path, report)?;
        tracing::info!(path = %path.display(), "saved preprocessing report");
        Ok(path)
    }

    /// Load and validate the serving bundle.
    pub fn load_bundle(&self) -> Result<ServingBundle, PersistError> {
        load_bundle(&self.bundle_path())
    }

    pub fn load_transform(&self) -> Result<TransformBundle, PersistError> {
        read_artifact(&self.model_dir.join(PREPROCESSOR_FILE))
    }
}

/// Load and validate a serving bundle from an explicit path.
pub fn load_bundle(path: &Path) -> Result<ServingBundle, PersistError> {
    let bundle: ServingBundle = read_artifact(path)?;
    bundle.validate()?;
    Ok(bundle)
}
