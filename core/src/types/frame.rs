use crate::error::{MrseqError, Result};
use serde::{Deserialize, Serialize};

/// Identity of the series a feature row was computed from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowIdentity {
    pub fname: Option<String>,
    pub series_description: Option<String>,
}

/// Fixed-schema numeric feature table
///
/// Every row has exactly one value per column. Rows keep the identity of
/// their source series so labels can be joined back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureFrame {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
    identities: Vec<RowIdentity>,
}

impl FeatureFrame {
    /// Creates an empty frame with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            identities: Vec::new(),
        }
    }

    /// Appends a row
    ///
    /// # Errors
    ///
    /// Returns an error if the row width differs from the column count
    pub fn push_row(&mut self, values: Vec<f64>, identity: RowIdentity) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(MrseqError::InvalidValue(format!(
                "row has {} values, frame has {} columns",
                values.len(),
                self.columns.len()
            )));
        }
        self.rows.push(values);
        self.identities.push(identity);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn identities(&self) -> &[RowIdentity] {
        &self.identities
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| MrseqError::MissingColumn(name.to_string()))
    }

    /// All values of a column
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r[idx]).collect())
    }

    /// Single cell lookup
    pub fn get(&self, row: usize, column: &str) -> Result<f64> {
        let idx = self.column_index(column)?;
        self.rows
            .get(row)
            .map(|r| r[idx])
            .ok_or_else(|| MrseqError::InvalidValue(format!("row {} out of range", row)))
    }

    /// Feature matrix restricted to the named columns, in the given order
    pub fn select(&self, names: &[&str]) -> Result<Vec<Vec<f64>>> {
        let indices = names
            .iter()
            .map(|n| self.column_index(n))
            .collect::<Result<Vec<_>>>()?;
        Ok(self
            .rows
            .iter()
            .map(|r| indices.iter().map(|&i| r[i]).collect())
            .collect())
    }

    /// New frame holding the given rows, in the given order
    pub fn subset(&self, indices: &[usize]) -> FeatureFrame {
        FeatureFrame {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            identities: indices.iter().map(|&i| self.identities[i].clone()).collect(),
        }
    }

    /// Returns whether any cell is NaN
    pub fn has_nulls(&self) -> bool {
        self.rows.iter().flatten().any(|v| v.is_nan())
    }
}
