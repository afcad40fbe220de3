//! Self-utility evaluation
//!
//! The utility function is an external collaborator: pure and side-effect
//! free, but allowed to fail. Every value it returns passes through
//! [`evaluate`], which turns non-finite or out-of-range results into
//! [`UtilityError`]s instead of letting them leak into thresholds.

use super::outcome::{Outcome, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Slack allowed around `[0, 1]` before a value counts as out of range.
const RANGE_EPSILON: f64 = 1e-9;

/// Errors raised while computing a self-utility
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UtilityError {
    #[error("Utility evaluation failed for {outcome}: {message}")]
    Evaluation { outcome: String, message: String },

    #[error("Utility for {outcome} is not finite")]
    NonFinite { outcome: String },

    #[error("Utility {value} for {outcome} is outside [0, 1]")]
    OutOfRange { outcome: String, value: f64 },
}

/// Self-utility over outcomes.
///
/// Implemented for any `Fn(&Outcome) -> f64` closure, so infallible utility
/// functions can be passed directly.
pub trait UtilityFunction {
    /// Raw utility of an outcome, expected in `[0, 1]`.
    fn utility(&self, outcome: &Outcome) -> Result<f64, UtilityError>;

    /// Walk-away value, if the function carries one.
    fn reserved_value(&self) -> Option<f64> {
        None
    }
}

impl<F> UtilityFunction for F
where
    F: Fn(&Outcome) -> f64,
{
    fn utility(&self, outcome: &Outcome) -> Result<f64, UtilityError> {
        Ok(self(outcome))
    }
}

/// Evaluate and validate a utility.
///
/// Values within `1e-9` of the unit interval are clamped into it.
pub fn evaluate<U: UtilityFunction + ?Sized>(utility: &U, outcome: &Outcome) -> Result<f64, UtilityError> {
    let value = utility.utility(outcome)?;
    if !value.is_finite() {
        return Err(UtilityError::NonFinite {
            outcome: outcome.to_string(),
        });
    }
    if !(-RANGE_EPSILON..=1.0 + RANGE_EPSILON).contains(&value) {
        return Err(UtilityError::OutOfRange {
            outcome: outcome.to_string(),
            value,
        });
    }
    Ok(value.clamp(0.0, 1.0))
}

/// Linear additive utility: `Σ wᵢ · scoreᵢ(valueᵢ) / Σ wᵢ`.
///
/// Scores are expected in `[0, 1]`; values missing from an issue's score
/// table contribute 0.
///
/// # Example
/// ```
/// use negotiation_core_rs::{LinearAdditiveUtility, Outcome, UtilityFunction};
///
/// let ufun = LinearAdditiveUtility::from_int_scores(
///     vec![0.75, 0.25],
///     vec![vec![0.0, 0.5, 1.0], vec![1.0, 0.0]],
/// );
/// let u = ufun.utility(&Outcome::from_ints(&[2, 0])).unwrap();
/// assert!((u - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearAdditiveUtility {
    weights: Vec<f64>,
    scores: Vec<BTreeMap<Value, f64>>,
    #[serde(default)]
    reserved_value: Option<f64>,
}

impl LinearAdditiveUtility {
    pub fn new(weights: Vec<f64>, scores: Vec<BTreeMap<Value, f64>>) -> Self {
        Self {
            weights,
            scores,
            reserved_value: None,
        }
    }

    /// Build from per-issue score lists where issue `i`'s value `Int(k)` scores
    /// `scores[i][k]`.
    pub fn from_int_scores(weights: Vec<f64>, scores: Vec<Vec<f64>>) -> Self {
        let tables = scores
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .enumerate()
                    .map(|(k, s)| (Value::Int(k as i64), s))
                    .collect()
            })
            .collect();
        Self::new(weights, tables)
    }

    pub fn with_reserved_value(mut self, reserved_value: f64) -> Self {
        self.reserved_value = Some(reserved_value);
        self
    }
}

impl UtilityFunction for LinearAdditiveUtility {
    fn utility(&self, outcome: &Outcome) -> Result<f64, UtilityError> {
        let total_weight: f64 = self.weights.iter().sum();
        if total_weight <= 0.0 {
            return Err(UtilityError::Evaluation {
                outcome: outcome.to_string(),
                message: "issue weights sum to zero".to_string(),
            });
        }
        let mut sum = 0.0;
        for (i, (weight, table)) in self.weights.iter().zip(&self.scores).enumerate() {
            if let Some(score) = outcome.get(i).and_then(|v| table.get(v)) {
                sum += weight * score;
            }
        }
        Ok(sum / total_weight)
    }

    fn reserved_value(&self) -> Option<f64> {
        self.reserved_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_utility_is_validated() {
        let ok = |_: &Outcome| 0.4;
        let nan = |_: &Outcome| f64::NAN;
        let big = |_: &Outcome| 1.5;
        let tiny_over = |_: &Outcome| 1.0 + 1e-12;
        let o = Outcome::from_ints(&[0]);

        assert_eq!(evaluate(&ok, &o), Ok(0.4));
        assert!(matches!(evaluate(&nan, &o), Err(UtilityError::NonFinite { .. })));
        assert!(matches!(evaluate(&big, &o), Err(UtilityError::OutOfRange { .. })));
        assert_eq!(evaluate(&tiny_over, &o), Ok(1.0));
    }

    #[test]
    fn test_linear_additive_weighting() {
        let ufun = LinearAdditiveUtility::from_int_scores(
            vec![3.0, 1.0],
            vec![vec![0.0, 1.0], vec![0.0, 1.0]],
        );
        let u = ufun.utility(&Outcome::from_ints(&[1, 0])).unwrap();
        assert!((u - 0.75).abs() < 1e-12);

        // Missing second dimension contributes nothing
        let u = ufun.utility(&Outcome::from_ints(&[1])).unwrap();
        assert!((u - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_zero_weights_is_an_error() {
        let ufun = LinearAdditiveUtility::from_int_scores(vec![0.0], vec![vec![1.0]]);
        assert!(ufun.utility(&Outcome::from_ints(&[0])).is_err());
    }
}
