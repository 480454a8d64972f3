use crate::types::FieldValue;
use serde::{Deserialize, Serialize};

/// How a column is recoded to {0, 1}
///
/// The policy is chosen from the fitting batch:
/// - any null present: `Presence` (1 = value present, 0 = null)
/// - no nulls: `Reference(first value)` (0 = equals the first row's value,
///   1 = differs)
///
/// The meaning of "1" therefore depends on whether the fitting batch had
/// nulls. This asymmetry is kept as-is because trained models depend on it,
/// but it is probably an accident of encoding flag-like and categorical
/// columns with one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", content = "value", rename_all = "kebab-case")]
pub enum BinaryPolicy {
    Presence,
    Reference(FieldValue),
}

impl BinaryPolicy {
    /// Chooses the policy for a column
    ///
    /// An empty column falls back to `Presence`.
    pub fn fit(values: &[&FieldValue]) -> Self {
        if values.iter().any(|v| v.is_null()) {
            return BinaryPolicy::Presence;
        }
        match values.first() {
            Some(first) => BinaryPolicy::Reference((*first).clone()),
            None => BinaryPolicy::Presence,
        }
    }

    /// Encodes one value
    ///
    /// Under `Reference`, a null never equals the reference and encodes as 1.
    pub fn encode(&self, value: &FieldValue) -> f64 {
        let hit = match self {
            BinaryPolicy::Presence => !value.is_null(),
            BinaryPolicy::Reference(reference) => value.is_null() || value != reference,
        };
        if hit {
            1.0
        } else {
            0.0
        }
    }

    /// Encodes a whole column
    pub fn encode_column(&self, values: &[&FieldValue]) -> Vec<f64> {
        values.iter().map(|v| self.encode(v)).collect()
    }
}

/// Fits a policy on a column and encodes it in one step
///
/// # Example
///
/// ```
/// use mrseq_core::{features::make_binary_column, FieldValue};
///
/// let a = FieldValue::from("A");
/// let b = FieldValue::from("B");
/// let null = FieldValue::Null;
///
/// assert_eq!(make_binary_column(&[&null, &a, &a]), vec![0.0, 1.0, 1.0]);
/// assert_eq!(make_binary_column(&[&a, &b, &a]), vec![0.0, 1.0, 0.0]);
/// ```
pub fn make_binary_column(values: &[&FieldValue]) -> Vec<f64> {
    BinaryPolicy::fit(values).encode_column(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_when_nulls() {
        let a = FieldValue::from("A");
        let null = FieldValue::Null;
        let values = [&null, &a, &a];
        assert_eq!(BinaryPolicy::fit(&values), BinaryPolicy::Presence);
        assert_eq!(make_binary_column(&values), vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_nan_counts_as_null() {
        let nan = FieldValue::Number(f64::NAN);
        let b = FieldValue::Number(1000.0);
        assert_eq!(make_binary_column(&[&b, &nan]), vec![1.0, 0.0]);
    }

    #[test]
    fn test_reference_when_no_nulls() {
        let a = FieldValue::from("A");
        let b = FieldValue::from("B");
        let values = [&a, &b, &a];
        assert_eq!(BinaryPolicy::fit(&values), BinaryPolicy::Reference(a.clone()));
        assert_eq!(make_binary_column(&values), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_reference_first_row_is_always_zero() {
        let x = FieldValue::from("3D");
        let y = FieldValue::from("2D");
        assert_eq!(make_binary_column(&[&x, &y, &y]), vec![0.0, 1.0, 1.0]);
        assert_eq!(make_binary_column(&[&y, &x, &x]), vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_reference_applied_to_null() {
        let policy = BinaryPolicy::Reference(FieldValue::from("N"));
        assert_eq!(policy.encode(&FieldValue::Null), 1.0);
        assert_eq!(policy.encode(&FieldValue::from("N")), 0.0);
    }

    #[test]
    fn test_empty_column() {
        assert_eq!(BinaryPolicy::fit(&[]), BinaryPolicy::Presence);
        assert!(make_binary_column(&[]).is_empty());
    }

    #[test]
    fn test_policy_serde() {
        let policy = BinaryPolicy::Reference(FieldValue::Number(0.0));
        let json = serde_json::to_string(&policy).unwrap();
        assert_eq!(json, r#"{"policy":"reference","value":0.0}"#);
        let back: BinaryPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, policy);

        let presence: BinaryPolicy = serde_json::from_str(r#"{"policy":"presence"}"#).unwrap();
        assert_eq!(presence, BinaryPolicy::Presence);
    }
}
