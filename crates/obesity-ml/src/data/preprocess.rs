//! End-to-end preprocessing of the raw table.
//!
//! [`Preprocessor::prepare`] runs the full cleaning pipeline and returns the
//! scaled train/test partitions together with the [`TransformBundle`] needed
//! to reproduce the same transformation at inference time.
//!
//! # Steps
//!
//! 1. Impute missing values, drop rows without a label
//! 2. Cap numeric outliers at the IQR fences
//! 3. Derive `BMI`
//! 4. Label-encode categorical columns and the target (full dataset)
//! 5. Stratified train/test split
//! 6. Fit the scaler on the training partition only, transform both

use std::collections::BTreeMap;
use std::path::Path;

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use super::clean::{add_bmi, cap_outliers, impute_missing};
use super::encoder::LabelEncoder;
use super::scaler::StandardScaler;
use super::schema::{ColumnKind, TARGET_COLUMN};
use super::split::stratified_split;
use super::table::{Column, ColumnValues, RawTable};
use super::DatasetError;

// =============================================================================
// TransformBundle
// =============================================================================

/// Everything needed to turn raw feature values into model inputs.
///
/// The encoders and the feature order are part of the model contract: they
/// must be reused verbatim at inference, never recreated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformBundle {
    /// Scaler fit on the training partition.
    pub scaler: StandardScaler,
    /// One fitted encoder per categorical feature column.
    pub feature_encoders: BTreeMap<String, LabelEncoder>,
    /// Encoder for the target labels.
    pub target_encoder: LabelEncoder,
    /// Feature column names in model input order.
    pub feature_columns: Vec<String>,
}

impl TransformBundle {
    /// Encoder for a categorical feature column.
    pub fn encoder(&self, column: &str) -> Option<&LabelEncoder> {
        self.feature_encoders.get(column)
    }

    /// Class names in code order.
    pub fn class_names(&self) -> &[String] {
        self.target_encoder.classes()
    }

    /// Number of model input features.
    pub fn n_features(&self) -> usize {
        self.feature_columns.len()
    }
}

// =============================================================================
// PreprocessingReport
// =============================================================================

/// Observability record written after preprocessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingReport {
    pub train_samples: usize,
    pub test_samples: usize,
    pub num_features: usize,
    pub feature_cols: Vec<String>,
    pub class_names: Vec<String>,
    /// Capped values per numeric column (only columns with at least one).
    pub outliers_capped: BTreeMap<String, usize>,
    /// Imputed cells per column (only columns with at least one).
    pub imputed: BTreeMap<String, usize>,
    /// Rows removed because the label was missing.
    pub rows_dropped: usize,
}

// =============================================================================
// PreparedData
// =============================================================================

/// Output of [`Preprocessor::prepare`].
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// Scaled training features `[n_train, n_features]`.
    pub train_features: Array2<f64>,
    /// Training labels (target codes).
    pub train_labels: Array1<usize>,
    /// Scaled test features `[n_test, n_features]`.
    pub test_features: Array2<f64>,
    /// Test labels (target codes).
    pub test_labels: Array1<usize>,
    /// Fitted transformation state.
    pub bundle: TransformBundle,
    /// Summary for observability.
    pub report: PreprocessingReport,
}

// =============================================================================
// Preprocessor
// =============================================================================

/// Preprocessing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preprocessor {
    /// Fraction of rows held out for evaluation.
    pub test_fraction: f64,
    /// Seed for the stratified shuffle.
    pub seed: u64,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self { test_fraction: 0.2, seed: 42 }
    }
}

impl Preprocessor {
    /// Create a preprocessor with the given split parameters.
    pub fn new(test_fraction: f64, seed: u64) -> Self {
        Self { test_fraction, seed }
    }

    /// Load a CSV file and prepare it.
    ///
    /// Fails with [`DatasetError::NotFound`] if the file does not exist.
    pub fn prepare_path(&self, path: impl AsRef<Path>) -> Result<PreparedData, DatasetError> {
        let table = RawTable::from_csv_path(path)?;
        self.prepare(table)
    }

    /// Run the full preprocessing pipeline on a raw table.
    pub fn prepare(&self, mut table: RawTable) -> Result<PreparedData, DatasetError> {
        if table.n_rows() == 0 {
            return Err(DatasetError::Empty);
        }
        log_class_distribution(&table)?;

        let imputation = impute_missing(&mut table);
        if table.n_rows() == 0 {
            return Err(DatasetError::Empty);
        }

        let fences = cap_outliers(&mut table);
        add_bmi(&mut table)?;

        let (features, labels, feature_encoders, target_encoder, feature_columns) =
            encode_table(&table)?;

        let (train_idx, test_idx) = stratified_split(&labels, self.test_fraction, self.seed)?;

        let train_raw = features.select(Axis(0), &train_idx);
        let test_raw = features.select(Axis(0), &test_idx);
        let train_labels: Array1<usize> = train_idx.iter().map(|&i| labels[i]).collect();
        let test_labels: Array1<usize> = test_idx.iter().map(|&i| labels[i]).collect();

        // Split before fit: the scaler never sees the test partition.
        let scaler = StandardScaler::fit(train_raw.view());
        let train_features = scaler.transform(train_raw.view());
        let test_features = scaler.transform(test_raw.view());

        tracing::info!(
            train = train_features.nrows(),
            test = test_features.nrows(),
            features = train_features.ncols(),
            "scaled and split (scaler fit on train only)"
        );

        let report = PreprocessingReport {
            train_samples: train_features.nrows(),
            test_samples: test_features.nrows(),
            num_features: feature_columns.len(),
            feature_cols: feature_columns.clone(),
            class_names: target_encoder.classes().to_vec(),
            outliers_capped: fences
                .iter()
                .filter(|(_, f)| f.n_capped > 0)
                .map(|(name, f)| (name.clone(), f.n_capped))
                .collect(),
            imputed: imputation.filled,
            rows_dropped: imputation.rows_dropped,
        };

        let bundle = TransformBundle {
            scaler,
            feature_encoders,
            target_encoder,
            feature_columns,
        };

        Ok(PreparedData {
            train_features,
            train_labels,
            test_features,
            test_labels,
            bundle,
            report,
        })
    }
}

type Encoded = (
    Array2<f64>,
    Vec<usize>,
    BTreeMap<String, LabelEncoder>,
    LabelEncoder,
    Vec<String>,
);

/// Label-encode categorical columns and the target, and assemble the feature matrix.
///
/// Encoders are fit on the full cleaned table so that every category is
/// known before the split.
fn encode_table(table: &RawTable) -> Result<Encoded, DatasetError> {
    let n_rows = table.n_rows();

    let target_values = text_values(table.target()?)?;
    let target_encoder = LabelEncoder::fit(target_values.iter().copied());
    let labels: Vec<usize> = target_values
        .iter()
        .map(|v| target_encoder.encode(v).unwrap_or_default())
        .collect();
    tracing::info!(classes = ?target_encoder.classes(), "target encoded");

    let feature_columns: Vec<&Column> = table
        .columns()
        .iter()
        .filter(|c| c.kind != ColumnKind::Target)
        .collect();
    let mut features = Array2::<f64>::zeros((n_rows, feature_columns.len()));
    let mut feature_encoders = BTreeMap::new();

    for (j, column) in feature_columns.iter().enumerate() {
        let mut out = features.column_mut(j);
        match &column.values {
            ColumnValues::Numeric(values) => {
                out.iter_mut().zip(values).for_each(|(o, &v)| *o = v);
            }
            ColumnValues::Text(_) => {
                let values = text_values(column)?;
                let encoder = LabelEncoder::fit(values.iter().copied());
                for (o, v) in out.iter_mut().zip(&values) {
                    *o = encoder.encode(v).unwrap_or_default() as f64;
                }
                tracing::info!(column = %column.name, classes = ?encoder.classes(), "encoded");
                feature_encoders.insert(column.name.clone(), encoder);
            }
        }
    }

    let names = feature_columns.iter().map(|c| c.name.clone()).collect();
    Ok((features, labels, feature_encoders, target_encoder, names))
}

/// All values of a text column; fails if any cell is still missing.
fn text_values(column: &Column) -> Result<Vec<&str>, DatasetError> {
    let values = column
        .as_text()
        .ok_or_else(|| DatasetError::MissingColumn(column.name.clone()))?;
    values
        .iter()
        .map(|v| v.as_deref().ok_or_else(|| DatasetError::EmptyColumn(column.name.clone())))
        .collect()
}

fn log_class_distribution(table: &RawTable) -> Result<(), DatasetError> {
    let target = table.target()?;
    let Some(values) = target.as_text() else {
        return Err(DatasetError::MissingColumn(TARGET_COLUMN.to_string()));
    };
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in values.iter().flatten() {
        *counts.entry(v.as_str()).or_default() += 1;
    }
    let total = table.n_rows() as f64;
    for (label, count) in counts {
        tracing::info!(label, count, pct = 100.0 * count as f64 / total, "class distribution");
    }
    Ok(())
}
