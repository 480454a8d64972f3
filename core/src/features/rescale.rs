use crate::error::{MrseqError, Result};
use crate::types::FieldValue;
use serde::{Deserialize, Serialize};

/// Observed range of a continuous column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnRange {
    pub min: f64,
    pub max: f64,
}

impl ColumnRange {
    /// Range of the present finite values, `None` if there are none
    pub fn fit(values: &[Option<f64>]) -> Option<Self> {
        values.iter().flatten().filter(|v| v.is_finite()).fold(None, |acc, &v| {
            Some(match acc {
                None => ColumnRange { min: v, max: v },
                Some(r) => ColumnRange {
                    min: r.min.min(v),
                    max: r.max.max(v),
                },
            })
        })
    }

    /// Maps a value into the range; a zero-width range divides by 1
    pub fn scale(&self, value: f64) -> f64 {
        let width = self.max - self.min;
        let width = if width == 0.0 { 1.0 } else { width };
        (value - self.min) / width
    }
}

/// Min-max scaler over named continuous columns
///
/// Fit once and reuse to keep inference consistent with training; refitting
/// on every batch makes the output depend on batch composition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    ranges: Vec<(String, Option<ColumnRange>)>,
    clip: bool,
}

impl MinMaxScaler {
    /// Fits ranges for each `(name, values)` column
    pub fn fit(columns: &[(String, Vec<Option<f64>>)], clip: bool) -> Self {
        Self {
            ranges: columns
                .iter()
                .map(|(name, values)| (name.clone(), ColumnRange::fit(values)))
                .collect(),
            clip,
        }
    }

    /// Fitted range of a column (`None` inside if the column was all missing)
    pub fn range(&self, name: &str) -> Option<Option<ColumnRange>> {
        self.ranges
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| *r)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.ranges.iter().map(|(n, _)| n.as_str())
    }

    /// Rescales a column; missing or non-finite values and unfitted columns
    /// become 0
    ///
    /// # Errors
    ///
    /// Returns [`MrseqError::MissingColumn`] if the scaler was not fit on
    /// `name`.
    pub fn transform_column(&self, name: &str, values: &[Option<f64>]) -> Result<Vec<f64>> {
        let range = self
            .range(name)
            .ok_or_else(|| MrseqError::MissingColumn(name.to_string()))?;

        Ok(values
            .iter()
            .map(|v| match (v, range) {
                (Some(x), Some(r)) if x.is_finite() => {
                    let scaled = r.scale(*x);
                    if self.clip {
                        scaled.clamp(0.0, 1.0)
                    } else {
                        scaled
                    }
                }
                _ => 0.0,
            })
            .collect())
    }
}

/// Reads a continuous column as optional floats
///
/// # Errors
///
/// Returns [`MrseqError::InvalidValue`] for lists, non-numeric text and
/// non-finite numbers.
pub fn continuous_values(name: &str, values: &[&FieldValue]) -> Result<Vec<Option<f64>>> {
    values
        .iter()
        .map(|v| {
            if v.is_null() {
                return Ok(None);
            }
            v.to_f64().map(Some).ok_or_else(|| {
                MrseqError::InvalidValue(format!("{} is not numeric: {}", name, v))
            })
        })
        .collect()
}
