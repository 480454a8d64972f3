use super::vocabulary::{dummy_column, NONE_CODE};
use crate::types::{CodeSplitting, FieldValue};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// Codes carried by one multi-valued field
///
/// A missing value is replaced by the `"NONE"` placeholder before
/// splitting. Lists contribute one code per element; scalar strings are
/// split according to `splitting`.
pub fn codes_of(value: &FieldValue, splitting: CodeSplitting) -> Vec<String> {
    match value {
        v if v.is_null() => split_text(NONE_CODE, splitting),
        FieldValue::Text(s) => split_text(s, splitting),
        FieldValue::List(items) => items
            .iter()
            .map(|item| match item {
                v if v.is_null() => NONE_CODE.to_string(),
                other => other.to_string().trim().to_string(),
            })
            .collect(),
        other => vec![other.to_string()],
    }
}

fn split_text(s: &str, splitting: CodeSplitting) -> Vec<String> {
    match splitting {
        CodeSplitting::Characters => s.chars().map(|c| c.to_string()).collect(),
        CodeSplitting::Whole => vec![s.to_string()],
    }
}

/// All distinct codes present in a column
pub fn observed_codes(values: &[&FieldValue], splitting: CodeSplitting) -> BTreeSet<String> {
    values
        .iter()
        .flat_map(|v| codes_of(v, splitting))
        .collect()
}

/// One-hot expansion of a multi-valued column against a fixed vocabulary
///
/// The indicator columns are decided up front from the feature vocabulary
/// (every feature named `{prefix}_...`), never from the codes a batch
/// happens to contain.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiLabelBinarizer {
    prefix: String,
    columns: Vec<String>,
    splitting: CodeSplitting,
}

impl MultiLabelBinarizer {
    /// Builds the binarizer for `prefix` from a feature vocabulary
    pub fn from_vocabulary(prefix: &str, features: &[String], splitting: CodeSplitting) -> Self {
        let stem = format!("{}_", prefix);
        Self {
            prefix: prefix.to_string(),
            columns: features
                .iter()
                .filter(|f| f.starts_with(&stem))
                .cloned()
                .collect(),
            splitting,
        }
    }

    /// Indicator column names, in vocabulary order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Expands a column into indicator columns
    ///
    /// Returns one `Vec<f64>` per vocabulary column. Codes without a
    /// vocabulary column are dropped; the dropped column names are returned
    /// alongside.
    pub fn transform(
        &self,
        values: &[&FieldValue],
    ) -> (BTreeMap<String, Vec<f64>>, BTreeSet<String>) {
        let mut indicators: BTreeMap<String, Vec<f64>> = self
            .columns
            .iter()
            .map(|c| (c.clone(), vec![0.0; values.len()]))
            .collect();
        let mut dropped = BTreeSet::new();

        for (row, value) in values.iter().enumerate() {
            for code in codes_of(value, self.splitting) {
                let name = dummy_column(&self.prefix, &code);
                match indicators.get_mut(&name) {
                    Some(column) => column[row] = 1.0,
                    None => {
                        dropped.insert(name);
                    }
                }
            }
        }

        if !dropped.is_empty() {
            debug!(
                "Dropping {} out-of-vocabulary '{}' codes: {:?}",
                dropped.len(),
                self.prefix,
                dropped
            );
        }

        (indicators, dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> Vec<String> {
        ["seq_E", "seq_S", "seq_SE", "seq_IR", "var_N", "opt__"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_codes_of_list_and_text() {
        let list = FieldValue::from(vec!["SE", "IR"]);
        assert_eq!(codes_of(&list, CodeSplitting::Characters), vec!["SE", "IR"]);

        let text = FieldValue::from("SE");
        assert_eq!(codes_of(&text, CodeSplitting::Characters), vec!["S", "E"]);
        assert_eq!(codes_of(&text, CodeSplitting::Whole), vec!["SE"]);
    }

    #[test]
    fn test_codes_of_null_is_none_placeholder() {
        assert_eq!(
            codes_of(&FieldValue::Null, CodeSplitting::Characters),
            vec!["N", "O", "N", "E"]
        );
        assert_eq!(codes_of(&FieldValue::Null, CodeSplitting::Whole), vec!["NONE"]);
    }

    #[test]
    fn test_observed_codes() {
        let a = FieldValue::from(vec!["SE", "IR"]);
        let b = FieldValue::from(vec!["GR"]);
        let codes = observed_codes(&[&a, &b], CodeSplitting::Characters);
        assert_eq!(codes.into_iter().collect::<Vec<_>>(), vec!["GR", "IR", "SE"]);
    }

    #[test]
    fn test_from_vocabulary_picks_prefix() {
        let mlb = MultiLabelBinarizer::from_vocabulary("seq", &features(), CodeSplitting::Characters);
        assert_eq!(mlb.columns(), &["seq_E", "seq_S", "seq_SE", "seq_IR"]);
    }

    #[test]
    fn test_transform_against_vocabulary() {
        let mlb = MultiLabelBinarizer::from_vocabulary("seq", &features(), CodeSplitting::Characters);
        let a = FieldValue::from(vec!["SE", "IR"]);
        let b = FieldValue::from("SE");
        let c = FieldValue::from(vec!["GR"]);
        let (cols, dropped) = mlb.transform(&[&a, &b, &c]);

        assert_eq!(cols.len(), 4);
        assert_eq!(cols["seq_SE"], vec![1.0, 0.0, 0.0]);
        assert_eq!(cols["seq_IR"], vec![1.0, 0.0, 0.0]);
        assert_eq!(cols["seq_S"], vec![0.0, 1.0, 0.0]);
        assert_eq!(cols["seq_E"], vec![0.0, 1.0, 0.0]);
        assert!(dropped.contains("seq_GR"));
    }

    #[test]
    fn test_missing_value_uses_placeholder() {
        let mlb = MultiLabelBinarizer::from_vocabulary("var", &features(), CodeSplitting::Characters);
        let (cols, dropped) = mlb.transform(&[&FieldValue::Null]);
        assert_eq!(cols["var_N"], vec![1.0]);
        assert!(dropped.contains("var_O"));
        assert!(dropped.contains("var_E"));
    }

    #[test]
    fn test_underscore_code() {
        let mlb = MultiLabelBinarizer::from_vocabulary("opt", &features(), CodeSplitting::Characters);
        let (cols, _) = mlb.transform(&[&FieldValue::from("FS_")]);
        assert_eq!(cols["opt__"], vec![1.0]);
    }
}
