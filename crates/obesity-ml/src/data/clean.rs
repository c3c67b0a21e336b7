//! Data cleaning: imputation, outlier capping, and BMI derivation.
//!
//! These steps correct anomalies in place. Nothing here is an error
//! except structurally missing columns; counts are returned for reporting.

use std::collections::BTreeMap;

use super::schema::{ColumnKind, BMI_COLUMN, HEIGHT_COLUMN, WEIGHT_COLUMN};
use super::table::{Column, ColumnValues, RawTable};
use super::DatasetError;
use crate::utils::{nan_mean, quantile};

/// IQR multiplier for the outlier fences.
pub const IQR_FENCE: f64 = 1.5;

// =============================================================================
// Imputation
// =============================================================================

/// What [`impute_missing`] changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImputationSummary {
    /// Number of filled cells per column (only columns with at least one fill).
    pub filled: BTreeMap<String, usize>,
    /// Rows removed because the target label was missing.
    pub rows_dropped: usize,
}

/// Fill missing values and drop unlabeled rows.
///
/// - Numeric columns are filled with the column mean.
/// - Categorical columns are filled with the column mode (ties resolve to the
///   lexicographically smallest value).
/// - Rows with a missing target are removed; labels are never imputed.
///
/// Passthrough columns are left untouched.
pub fn impute_missing(table: &mut RawTable) -> ImputationSummary {
    let mut summary = ImputationSummary::default();

    for column in table.columns_mut() {
        let filled = match (column.kind, &mut column.values) {
            (ColumnKind::Numeric, ColumnValues::Numeric(values)) => {
                let mean = nan_mean(values.iter().copied());
                fill_numeric(values, mean).inspect(|n| {
                    tracing::info!(column = %column.name, mean, filled = n, "imputed with mean");
                })
            }
            (ColumnKind::Categorical, ColumnValues::Text(values)) => mode(values).and_then(|m| {
                fill_text(values, &m).inspect(|n| {
                    tracing::info!(column = %column.name, mode = %m, filled = n, "imputed with mode");
                })
            }),
            _ => None,
        };
        if let Some(n) = filled {
            summary.filled.insert(column.name.clone(), n);
        }
    }

    let keep: Option<Vec<bool>> = table.target().ok().map(|target| match &target.values {
        ColumnValues::Text(v) => v.iter().map(Option::is_some).collect(),
        ColumnValues::Numeric(v) => v.iter().map(|x| !x.is_nan()).collect(),
    });
    if let Some(keep) = keep {
        let dropped = keep.iter().filter(|&&k| !k).count();
        if dropped > 0 {
            table.retain_rows(&keep);
            tracing::info!(rows = dropped, "dropped rows with missing target");
        }
        summary.rows_dropped = dropped;
    }

    summary
}

fn fill_numeric(values: &mut [f64], fill: f64) -> Option<usize> {
    if fill.is_nan() {
        return None;
    }
    let mut n = 0;
    for v in values.iter_mut().filter(|v| v.is_nan()) {
        *v = fill;
        n += 1;
    }
    (n > 0).then_some(n)
}

fn fill_text(values: &mut [Option<String>], fill: &str) -> Option<usize> {
    let mut n = 0;
    for v in values.iter_mut().filter(|v| v.is_none()) {
        *v = Some(fill.to_string());
        n += 1;
    }
    (n > 0).then_some(n)
}

/// Most frequent non-missing value. Ties resolve to the smallest value.
pub fn mode(values: &[Option<String>]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in values.iter().flatten() {
        *counts.entry(v.as_str()).or_default() += 1;
    }
    // BTreeMap iterates in sorted order, so the first maximum is the smallest key.
    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(v, _)| v.to_string())
}

// =============================================================================
// Outlier Capping
// =============================================================================

/// IQR fences and capping result for one numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierFence {
    pub lower: f64,
    pub upper: f64,
    /// Number of values that fell outside `[lower, upper]` and were clipped.
    pub n_capped: usize,
}

impl OutlierFence {
    /// Compute fences `[Q1 - 1.5·IQR, Q3 + 1.5·IQR]` for a set of values.
    pub fn from_values(values: &[f64], scratch: &mut Vec<f64>) -> Self {
        let q1 = quantile(values, 0.25, scratch);
        let q3 = quantile(values, 0.75, scratch);
        let iqr = q3 - q1;
        Self {
            lower: q1 - IQR_FENCE * iqr,
            upper: q3 + IQR_FENCE * iqr,
            n_capped: 0,
        }
    }

    /// Clip values into the fence, recording how many were changed.
    pub fn apply(&mut self, values: &mut [f64]) {
        for v in values.iter_mut() {
            if *v < self.lower || *v > self.upper {
                *v = v.clamp(self.lower, self.upper);
                self.n_capped += 1;
            }
        }
    }
}

/// Clip every numeric column into its IQR fences.
///
/// Fences are computed once per column on the full cleaned data, before any
/// value is changed. Returns the fence for every numeric column, in column order.
pub fn cap_outliers(table: &mut RawTable) -> Vec<(String, OutlierFence)> {
    let mut scratch = Vec::new();
    let mut fences = Vec::new();

    for column in table.columns_mut() {
        if column.kind != ColumnKind::Numeric {
            continue;
        }
        let Some(values) = column.as_numeric_mut() else {
            continue;
        };

        let mut fence = OutlierFence::from_values(values, &mut scratch);
        fence.apply(values);

        if fence.n_capped > 0 {
            tracing::info!(
                column = %column.name,
                capped = fence.n_capped,
                lower = fence.lower,
                upper = fence.upper,
                "outliers capped"
            );
        } else {
            tracing::debug!(column = %column.name, "no outliers found");
        }
        fences.push((column.name.clone(), fence));
    }

    fences
}

// =============================================================================
// Feature Engineering
// =============================================================================

/// Body Mass Index from weight in kilograms and height in metres.
#[inline]
pub fn bmi(weight_kg: f64, height_m: f64) -> f64 {
    weight_kg / (height_m * height_m)
}

/// Derive the `BMI` column from `Weight` and `Height`.
///
/// Appends the column, or overwrites it in place if the file already had one.
pub fn add_bmi(table: &mut RawTable) -> Result<(), DatasetError> {
    let numeric = |name: &str| -> Result<Vec<f64>, DatasetError> {
        table
            .require(name)?
            .as_numeric()
            .map(<[f64]>::to_vec)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
    };
    let heights = numeric(HEIGHT_COLUMN)?;
    let weights = numeric(WEIGHT_COLUMN)?;

    let values: Vec<f64> = weights
        .iter()
        .zip(&heights)
        .map(|(&w, &h)| bmi(w, h))
        .collect();

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    tracing::info!(min, max, mean = nan_mean(values.iter().copied()), "BMI column added");

    if let Some(existing) = table.columns_mut().iter_mut().find(|c| c.name == BMI_COLUMN) {
        existing.values = ColumnValues::Numeric(values);
        Ok(())
    } else {
        table.push_column(Column::numeric(BMI_COLUMN, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::TARGET_COLUMN;
    use approx::assert_abs_diff_eq;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    fn table() -> RawTable {
        RawTable::from_columns(vec![
            Column::text("Gender", vec![s("Male"), None, s("Female"), s("Male")]),
            Column::numeric("Age", vec![20.0, f64::NAN, 30.0, 40.0]),
            Column::numeric("Height", vec![1.6, 1.7, 1.8, 1.9]),
            Column::numeric("Weight", vec![60.0, 70.0, 80.0, 90.0]),
            Column::numeric("id", vec![f64::NAN, 2.0, 3.0, 4.0]),
            Column::text(TARGET_COLUMN, vec![s("A"), s("B"), None, s("A")]),
        ])
        .unwrap()
    }

    #[test]
    fn imputes_mean_and_mode_then_drops_unlabeled() {
        let mut t = table();
        let summary = impute_missing(&mut t);

        assert_eq!(summary.rows_dropped, 1);
        assert_eq!(summary.filled.get("Age"), Some(&1));
        assert_eq!(summary.filled.get("Gender"), Some(&1));
        assert!(!summary.filled.contains_key("id"));

        assert_eq!(t.n_rows(), 3);
        let age = t.column("Age").unwrap().as_numeric().unwrap();
        assert_abs_diff_eq!(age[1], 30.0);
        let gender = t.column("Gender").unwrap().as_text().unwrap();
        assert_eq!(gender[1].as_deref(), Some("Male"));
        // passthrough columns keep their NaN
        assert!(t.column("id").unwrap().as_numeric().unwrap()[0].is_nan());
    }

    #[test]
    fn mode_ties_pick_smallest() {
        let values = vec![s("b"), s("a"), s("b"), s("a"), None];
        assert_eq!(mode(&values).as_deref(), Some("a"));
        assert_eq!(mode(&[None, None]), None);
    }

    #[test]
    fn capping_clips_to_fences() {
        let mut t = RawTable::from_columns(vec![Column::numeric(
            "Age",
            vec![10.0, 11.0, 12.0, 13.0, 14.0, 100.0],
        )])
        .unwrap();
        let fences = cap_outliers(&mut t);
        assert_eq!(fences.len(), 1);
        let fence = fences[0].1;
        assert_eq!(fence.n_capped, 1);

        let age = t.column("Age").unwrap().as_numeric().unwrap();
        assert!(age.iter().all(|&v| v >= fence.lower && v <= fence.upper));
        assert_abs_diff_eq!(age[5], fence.upper);
    }

    #[test]
    fn bmi_column_appended() {
        let mut t = table();
        add_bmi(&mut t).unwrap();
        let bmi_col = t.column(BMI_COLUMN).unwrap().as_numeric().unwrap();
        assert_abs_diff_eq!(bmi_col[0], 60.0 / (1.6 * 1.6), epsilon = 1e-12);
        assert_eq!(t.columns().last().unwrap().name, BMI_COLUMN);
    }

    #[test]
    fn bmi_requires_height() {
        let mut t = RawTable::from_columns(vec![Column::numeric("Weight", vec![1.0])]).unwrap();
        assert!(matches!(add_bmi(&mut t), Err(DatasetError::MissingColumn(c)) if c == "Height"));
    }
}
