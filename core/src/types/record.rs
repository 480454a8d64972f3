use super::FieldValue;
use crate::error::{MrseqError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static NULL: FieldValue = FieldValue::Null;

/// One row per DICOM series: a flattened header dictionary
///
/// Keys missing from the map read as [`FieldValue::Null`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl SeriesRecord {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a field
    ///
    /// # Example
    ///
    /// ```
    /// use mrseq_core::{FieldValue, SeriesRecord};
    ///
    /// let record = SeriesRecord::new()
    ///     .with("SeriesDescription", "AX T1 POST")
    ///     .with("EchoTime", 12.0);
    ///
    /// assert_eq!(record.get("EchoTime"), &FieldValue::Number(12.0));
    /// assert!(record.get("InversionTime").is_null());
    /// ```
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a field, replacing any previous value
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.insert(name.to_string(), value.into());
    }

    /// Returns the value of a field, or `Null` if absent
    pub fn get(&self, name: &str) -> &FieldValue {
        self.fields.get(name).unwrap_or(&NULL)
    }

    /// Returns whether the record carries the key at all (even as null)
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns the text of a required string field
    ///
    /// # Errors
    ///
    /// Returns [`MrseqError::MissingText`] if the field is absent, null or
    /// not a string.
    pub fn require_text(&self, name: &str) -> Result<&str> {
        self.get(name)
            .as_text()
            .ok_or_else(|| MrseqError::MissingText(name.to_string()))
    }

    /// Iterates over field names present in this record
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    /// Returns a copy holding only the named fields
    pub fn project(&self, names: &[String]) -> SeriesRecord {
        let fields = names
            .iter()
            .map(|n| (n.clone(), self.get(n).clone()))
            .collect();
        SeriesRecord { fields }
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for SeriesRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A batch of series records
///
/// The columns of a batch are the union of its records' keys, in first-seen
/// order. A column that no record carries does not exist in the batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesBatch {
    records: Vec<SeriesRecord>,
}

impl SeriesBatch {
    /// Creates a batch from records
    pub fn new(records: Vec<SeriesRecord>) -> Self {
        Self { records }
    }

    /// Parses a batch from a JSON array of header objects
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn records(&self) -> &[SeriesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SeriesRecord> {
        self.records.iter()
    }

    /// Column names of the batch (union of record keys, first-seen order)
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for record in &self.records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.to_string());
                }
            }
        }
        columns
    }

    /// Returns whether any record carries the column
    pub fn has_column(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.contains(name))
    }

    /// Returns all values of a column, one per record
    ///
    /// # Errors
    ///
    /// Returns [`MrseqError::MissingColumn`] if no record carries the column.
    pub fn column(&self, name: &str) -> Result<Vec<&FieldValue>> {
        if !self.records.is_empty() && !self.has_column(name) {
            return Err(MrseqError::MissingColumn(name.to_string()));
        }
        Ok(self.records.iter().map(|r| r.get(name)).collect())
    }

    /// Projects every record onto the given columns
    ///
    /// # Errors
    ///
    /// Returns [`MrseqError::MissingColumn`] for the first requested column
    /// that the batch does not have. An empty batch projects to an empty
    /// batch.
    pub fn project(&self, names: &[String]) -> Result<SeriesBatch> {
        if !self.records.is_empty() {
            if let Some(missing) = names.iter().find(|n| !self.has_column(n)) {
                return Err(MrseqError::MissingColumn(missing.clone()));
            }
        }
        Ok(SeriesBatch {
            records: self.records.iter().map(|r| r.project(names)).collect(),
        })
    }

    /// Returns a new batch holding the records for which `keep` is true
    pub fn filter<F>(&self, mut keep: F) -> SeriesBatch
    where
        F: FnMut(&SeriesRecord) -> bool,
    {
        SeriesBatch {
            records: self.records.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}

impl From<Vec<SeriesRecord>> for SeriesBatch {
    fn from(records: Vec<SeriesRecord>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a SeriesBatch {
    type Item = &'a SeriesRecord;
    type IntoIter = std::slice::Iter<'a, SeriesRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> SeriesBatch {
        SeriesBatch::new(vec![
            SeriesRecord::new().with("a", 1.0).with("b", "x"),
            SeriesRecord::new().with("c", FieldValue::Null).with("a", 2.0),
        ])
    }

    #[test]
    fn test_columns_union() {
        assert_eq!(batch().columns(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_column_missing() {
        let err = batch().column("zzz").unwrap_err();
        assert!(matches!(err, MrseqError::MissingColumn(ref c) if c == "zzz"));
    }

    #[test]
    fn test_column_absent_key_reads_null() {
        let batch = batch();
        let values = batch.column("b").unwrap();
        assert_eq!(values[0], &FieldValue::from("x"));
        assert!(values[1].is_null());
    }

    #[test]
    fn test_project() {
        let projected = batch().project(&["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(projected.columns(), vec!["a", "b"]);
        assert!(projected.records()[1].contains("b"));
        assert!(projected.records()[1].get("b").is_null());

        assert!(batch().project(&["missing".to_string()]).is_err());
    }

    #[test]
    fn test_require_text() {
        let record = SeriesRecord::new().with("d", "T1").with("n", 1.0);
        assert_eq!(record.require_text("d").unwrap(), "T1");
        assert!(matches!(
            record.require_text("n"),
            Err(MrseqError::MissingText(_))
        ));
        assert!(record.require_text("absent").is_err());
    }

    #[test]
    fn test_from_json() {
        let batch = SeriesBatch::from_json(
            r#"[{"fname": "/data/s1/1.dcm", "EchoTime": 12, "ScanOptions": ["FS", "SAT2"]}]"#,
        )
        .unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.records()[0].get("EchoTime"), &FieldValue::Number(12.0));
    }
}
