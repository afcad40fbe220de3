//! Outcome model
//!
//! An outcome is an ordered, fixed-length tuple holding one discrete value per
//! issue. Outcomes are immutable and hash/compare by value so they can key the
//! utility cache and the opponent's offer history.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single discrete issue value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// An ordered tuple of per-issue values.
///
/// # Example
/// ```
/// use negotiation_core_rs::{Outcome, Value};
///
/// let outcome = Outcome::from_ints(&[2, 0]);
/// assert_eq!(outcome.len(), 2);
/// assert_eq!(outcome.get(0), Some(&Value::Int(2)));
/// assert_eq!(outcome.get(5), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outcome(Vec<Value>);

impl Outcome {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Convenience constructor for integer-valued domains.
    pub fn from_ints(values: &[i64]) -> Self {
        Self(values.iter().copied().map(Value::Int).collect())
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Value of one issue; `None` when the offer is missing that dimension.
    pub fn get(&self, issue: usize) -> Option<&Value> {
        self.0.get(issue)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Value>> for Outcome {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_outcome_equality_is_by_value() {
        let a = Outcome::from_ints(&[1, 2]);
        let b = Outcome::new(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_outcome_display() {
        let o = Outcome::new(vec![Value::Int(3), Value::from("fast")]);
        assert_eq!(o.to_string(), "(3, fast)");
    }

    #[test]
    fn test_value_serde_untagged() {
        let o = Outcome::new(vec![Value::Int(3), Value::from("fast")]);
        let json = serde_json::to_string(&o).unwrap();
        assert_eq!(json, r#"[3,"fast"]"#);
        let back: Outcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, o);
    }
}
