use serde::{Deserialize, Serialize};
use std::fmt;

/// A single flattened DICOM header value
///
/// Mirrors what a header-to-table extractor emits: missing values, numbers,
/// strings and multi-valued elements. A `Number(NaN)` is treated as null.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Number(f64),
    Text(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Returns whether this value counts as missing
    pub fn is_null(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Returns the string if this is a `Text` value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns whether this is a `Text` value
    pub fn is_text(&self) -> bool {
        matches!(self, FieldValue::Text(_))
    }

    /// Converts a scalar value to f64
    ///
    /// Numbers convert directly, text is parsed after trimming (DICOM DS/IS
    /// strings). Returns `None` for nulls, lists, unparsable text and
    /// non-finite results such as `"NaN"` or `"inf"`.
    pub fn to_f64(&self) -> Option<f64> {
        let n = match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_null() {
        assert!(FieldValue::Null.is_null());
        assert!(FieldValue::Number(f64::NAN).is_null());
        assert!(!FieldValue::Number(0.0).is_null());
        assert!(!FieldValue::from("").is_null());
        assert!(!FieldValue::List(vec![]).is_null());
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(FieldValue::Number(2.5).to_f64(), Some(2.5));
        assert_eq!(FieldValue::from(" 3.0 ").to_f64(), Some(3.0));
        assert_eq!(FieldValue::from("abc").to_f64(), None);
        assert_eq!(FieldValue::Null.to_f64(), None);
        assert_eq!(FieldValue::from(vec![1.0, 2.0]).to_f64(), None);
    }

    #[test]
    fn test_to_f64_rejects_non_finite() {
        for text in ["NaN", "inf", "-infinity", " Infinity "] {
            assert_eq!(FieldValue::from(text).to_f64(), None, "{}", text);
        }
        assert_eq!(FieldValue::Number(f64::INFINITY).to_f64(), None);
        assert_eq!(FieldValue::Number(f64::NEG_INFINITY).to_f64(), None);
        assert!(!FieldValue::Number(f64::INFINITY).is_null());
    }

    #[test]
    fn test_deserialize_json_shapes() {
        let values: Vec<FieldValue> =
            serde_json::from_str(r#"[null, 1.5, "SE", ["SE", "IR"], [1, 0, 0]]"#).unwrap();
        assert_eq!(values[0], FieldValue::Null);
        assert_eq!(values[1], FieldValue::Number(1.5));
        assert_eq!(values[2], FieldValue::from("SE"));
        assert_eq!(values[3], FieldValue::from(vec!["SE", "IR"]));
        assert_eq!(values[4], FieldValue::from(vec![1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::from(vec!["SE", "IR"]).to_string(), "[SE, IR]");
        assert_eq!(FieldValue::Null.to_string(), "null");
    }
}
