use super::FieldValue;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Pixel spacing in millimeters (row, column)
///
/// Only the row component feeds the feature matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSpacing {
    pub row: f64,
    pub col: f64,
}

impl PixelSpacing {
    /// Creates a new PixelSpacing
    pub fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }

    /// Parses pixel spacing from string
    ///
    /// Accepts formats like:
    /// - "0.5\\0.5"
    /// - "0.5 0.5"
    /// - "[0.5, 0.5]"
    /// - Exponential notation: "1.5e-1 1.5e-1"
    ///
    /// A single number is accepted and used for both components.
    ///
    /// # Errors
    ///
    /// Returns an error if no number can be found in the string
    pub fn parse(s: &str) -> Result<Self, String> {
        static REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REGEX.get_or_init(|| {
            Regex::new(r"[-+]?\d*\.?\d+(?:[eE][-+]?\d+)?").expect("Failed to compile regex")
        });

        let mut numbers = re.find_iter(s).map(|m| m.as_str());
        let row_str = numbers
            .next()
            .ok_or_else(|| format!("Failed to parse PixelSpacing from '{}'", s))?;

        let row: f64 = row_str
            .parse()
            .map_err(|e| format!("Failed to parse row value: {}", e))?;

        let col: f64 = match numbers.next() {
            Some(col_str) => col_str
                .parse()
                .map_err(|e| format!("Failed to parse col value: {}", e))?,
            None => row,
        };

        Ok(PixelSpacing { row, col })
    }

    /// Reads pixel spacing from a header field
    ///
    /// Lists use their first two elements (one element is used for both),
    /// numbers are used for both components, strings go through
    /// [`PixelSpacing::parse`]. Null yields `None`.
    ///
    /// # Errors
    ///
    /// Returns an error for empty lists and non-numeric components
    pub fn from_field(value: &FieldValue) -> Result<Option<Self>, String> {
        if value.is_null() {
            return Ok(None);
        }
        match value {
            FieldValue::List(items) => {
                let component = |i: usize| {
                    items[i]
                        .to_f64()
                        .ok_or_else(|| format!("Non-numeric PixelSpacing component '{}'", items[i]))
                };
                let row = match items.first() {
                    Some(_) => component(0)?,
                    None => return Err("PixelSpacing is an empty list".to_string()),
                };
                let col = if items.len() > 1 { component(1)? } else { row };
                Ok(Some(PixelSpacing { row, col }))
            }
            FieldValue::Number(n) => Ok(Some(PixelSpacing::new(*n, *n))),
            FieldValue::Text(s) => Self::parse(s).map(Some),
            FieldValue::Null => Ok(None),
        }
    }
}

impl fmt::Display for PixelSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} mm", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backslash_separator() {
        let ps = PixelSpacing::parse("0.4688\\0.4688").unwrap();
        assert_eq!(ps.row, 0.4688);
        assert_eq!(ps.col, 0.4688);
    }

    #[test]
    fn test_parse_array_format() {
        let ps = PixelSpacing::parse("[0.9, 0.8]").unwrap();
        assert_eq!(ps.row, 0.9);
        assert_eq!(ps.col, 0.8);
    }

    #[test]
    fn test_parse_exponential_notation() {
        let ps = PixelSpacing::parse("1.5e-1\\1.5e-1").unwrap();
        assert_eq!(ps.row, 0.15);
    }

    #[test]
    fn test_parse_single_value() {
        let ps = PixelSpacing::parse("1.2").unwrap();
        assert_eq!(ps, PixelSpacing::new(1.2, 1.2));
    }

    #[test]
    fn test_from_field() {
        let list = FieldValue::from(vec![0.5, 0.6]);
        assert_eq!(
            PixelSpacing::from_field(&list).unwrap(),
            Some(PixelSpacing::new(0.5, 0.6))
        );
        let text = FieldValue::from("0.7\\0.7");
        assert_eq!(PixelSpacing::from_field(&text).unwrap().unwrap().row, 0.7);
        assert_eq!(
            PixelSpacing::from_field(&FieldValue::Number(1.0)).unwrap(),
            Some(PixelSpacing::new(1.0, 1.0))
        );
        assert_eq!(PixelSpacing::from_field(&FieldValue::Null).unwrap(), None);
    }

    #[test]
    fn test_from_field_invalid() {
        assert!(PixelSpacing::from_field(&FieldValue::List(vec![])).is_err());
        assert!(PixelSpacing::from_field(&FieldValue::from(vec!["a", "b"])).is_err());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(PixelSpacing::parse("invalid").is_err());
        assert!(PixelSpacing::parse("").is_err());
    }
}
