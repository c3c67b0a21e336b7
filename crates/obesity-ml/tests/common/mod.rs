//! Shared fixtures: a synthetic dataset on disk and a fast training setup.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use obesity_ml::testing::data::{synthetic_table, to_csv};
use obesity_ml::{BoostingConfig, ForestConfig, PipelineConfig, TrainingConfig, Verbosity};

/// Write a synthetic dataset with `n_rows` rows into `dir`.
pub fn write_dataset(dir: &Path, n_rows: usize, seed: u64) -> PathBuf {
    let path = dir.join("ObesityDataSet.csv");
    std::fs::write(&path, to_csv(&synthetic_table(n_rows, seed))).unwrap();
    path
}

/// Small models so that a full run finishes in well under a second.
pub fn quick_training() -> TrainingConfig {
    TrainingConfig::builder()
        .forest(ForestConfig::builder().n_trees(12).build().unwrap())
        .boosting(BoostingConfig::builder().n_rounds(15).build().unwrap())
        .build()
        .unwrap()
}

/// Pipeline configuration rooted in `dir`.
pub fn pipeline_config(dir: &Path) -> PipelineConfig {
    PipelineConfig::builder()
        .data_path(write_dataset(dir, 350, 7))
        .model_dir(dir.join("models"))
        .output_dir(dir.join("outputs"))
        .n_threads(2)
        .verbosity(Verbosity::Silent)
        .training(quick_training())
        .build()
        .unwrap()
}
