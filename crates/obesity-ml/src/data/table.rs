//! Raw tabular data loaded from CSV.
//!
//! A [`RawTable`] is column-major: each [`Column`] holds either numbers
//! (`NaN` = missing) or optional strings. Column kinds come from
//! [`ColumnKind::of`], so the same file always loads the same way.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use super::schema::{is_missing_token, ColumnKind, TARGET_COLUMN};
use super::DatasetError;

// =============================================================================
// Column
// =============================================================================

/// Values of one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// Numeric values; `NaN` marks a missing cell.
    Numeric(Vec<f64>),
    /// Text values; `None` marks a missing cell.
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    /// Number of cells.
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    /// Returns true if the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of missing cells.
    pub fn n_missing(&self) -> usize {
        match self {
            Self::Numeric(v) => v.iter().filter(|x| x.is_nan()).count(),
            Self::Text(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }

    fn retain_mask(&mut self, keep: &[bool]) {
        fn retain<T>(values: &mut Vec<T>, keep: &[bool]) {
            let mut idx = 0;
            values.retain(|_| {
                let k = keep[idx];
                idx += 1;
                k
            });
        }
        match self {
            Self::Numeric(v) => retain(v, keep),
            Self::Text(v) => retain(v, keep),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: ColumnValues,
}

impl Column {
    /// Create a numeric column. The kind is derived from the name.
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        let name = name.into();
        Self { kind: ColumnKind::of(&name), name, values: ColumnValues::Numeric(values) }
    }

    /// Create a text column. The kind is derived from the name.
    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        let name = name.into();
        Self { kind: ColumnKind::of(&name), name, values: ColumnValues::Text(values) }
    }

    /// Numeric values, if this is a numeric column.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match &self.values {
            ColumnValues::Numeric(v) => Some(v),
            ColumnValues::Text(_) => None,
        }
    }

    /// Mutable numeric values, if this is a numeric column.
    pub fn as_numeric_mut(&mut self) -> Option<&mut Vec<f64>> {
        match &mut self.values {
            ColumnValues::Numeric(v) => Some(v),
            ColumnValues::Text(_) => None,
        }
    }

    /// Text values, if this is a text column.
    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match &self.values {
            ColumnValues::Text(v) => Some(v),
            ColumnValues::Numeric(_) => None,
        }
    }

    /// Mutable text values, if this is a text column.
    pub fn as_text_mut(&mut self) -> Option<&mut Vec<Option<String>>> {
        match &mut self.values {
            ColumnValues::Text(v) => Some(v),
            ColumnValues::Numeric(_) => None,
        }
    }
}

// =============================================================================
// RawTable
// =============================================================================

/// Column-major raw dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<Column>,
    n_rows: usize,
}

impl RawTable {
    /// Build a table from columns of equal length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, DatasetError> {
        let n_rows = columns.first().map_or(0, |c| c.values.len());
        if let Some(bad) = columns.iter().find(|c| c.values.len() != n_rows) {
            return Err(DatasetError::RaggedColumn {
                column: bad.name.clone(),
                expected: n_rows,
                actual: bad.values.len(),
            });
        }
        Ok(Self { columns, n_rows })
    }

    /// Load a CSV file with a header row.
    ///
    /// Fails with [`DatasetError::NotFound`] if the path does not exist.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DatasetError::NotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let table = Self::from_csv_reader(file)?;
        tracing::info!(
            path = %path.display(),
            rows = table.n_rows(),
            columns = table.n_columns(),
            "dataset loaded"
        );
        Ok(table)
    }

    /// Load CSV data with a header row from any reader.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let kinds: Vec<ColumnKind> = headers.iter().map(|h| ColumnKind::of(h)).collect();

        let mut numeric: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];
        let mut text: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

        for (row, record) in reader.records().enumerate() {
            let record = record?;
            for (col, kind) in kinds.iter().enumerate() {
                let raw = record.get(col).unwrap_or("");
                let missing = is_missing_token(raw);
                if kind.is_textual() {
                    text[col].push((!missing).then(|| raw.to_string()));
                } else if missing {
                    numeric[col].push(f64::NAN);
                } else {
                    let value = raw.parse::<f64>().map_err(|_| DatasetError::InvalidNumber {
                        column: headers[col].clone(),
                        row,
                        value: raw.to_string(),
                    })?;
                    numeric[col].push(value);
                }
            }
        }

        let columns = headers
            .into_iter()
            .zip(kinds)
            .zip(numeric.into_iter().zip(text))
            .map(|((name, kind), (num, txt))| Column {
                name,
                kind,
                values: if kind.is_textual() {
                    ColumnValues::Text(txt)
                } else {
                    ColumnValues::Numeric(num)
                },
            })
            .collect();

        Self::from_columns(columns)
    }

    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// All columns in file order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Mutable access to all columns.
    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    /// Column names in file order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column by name, failing with [`DatasetError::MissingColumn`].
    pub fn require(&self, name: &str) -> Result<&Column, DatasetError> {
        self.column(name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
    }

    /// The target column.
    pub fn target(&self) -> Result<&Column, DatasetError> {
        self.require(TARGET_COLUMN)
    }

    /// Append a column. Its length must match the table.
    pub fn push_column(&mut self, column: Column) -> Result<(), DatasetError> {
        if !self.columns.is_empty() && column.values.len() != self.n_rows {
            return Err(DatasetError::RaggedColumn {
                expected: self.n_rows,
                actual: column.values.len(),
                column: column.name,
            });
        }
        self.n_rows = column.values.len();
        self.columns.push(column);
        Ok(())
    }

    /// Keep only the rows where `keep[row]` is true.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.n_rows);
        for column in &mut self.columns {
            column.values.retain_mask(keep);
        }
        self.n_rows = keep.iter().filter(|&&k| k).count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Gender,Age,Height,Weight,NObeyesdad
Female,21,1.62,64,Normal_Weight
Male,,1.80,NA,Overweight_Level_I
,23,1.50,90,
";

    #[test]
    fn loads_typed_columns() {
        let table = RawTable::from_csv_reader(CSV.as_bytes()).unwrap();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.n_columns(), 5);

        let gender = table.column("Gender").unwrap();
        assert_eq!(gender.kind, ColumnKind::Categorical);
        assert_eq!(gender.as_text().unwrap()[2], None);

        let age = table.column("Age").unwrap().as_numeric().unwrap();
        assert_eq!(age[0], 21.0);
        assert!(age[1].is_nan());

        let target = table.target().unwrap();
        assert_eq!(target.values.n_missing(), 1);
    }

    #[test]
    fn rejects_bad_numbers() {
        let csv = "Age,NObeyesdad\nabc,Normal_Weight\n";
        let err = RawTable::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidNumber { row: 0, .. }));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = RawTable::from_csv_path("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, DatasetError::NotFound(_)));
    }

    #[test]
    fn retain_rows_filters_every_column() {
        let mut table = RawTable::from_csv_reader(CSV.as_bytes()).unwrap();
        table.retain_rows(&[true, false, true]);
        assert_eq!(table.n_rows(), 2);
        let weight = table.column("Weight").unwrap().as_numeric().unwrap();
        assert_eq!(weight, &[64.0, 90.0]);
    }
}
