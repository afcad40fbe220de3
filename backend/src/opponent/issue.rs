//! Per-issue frequency estimator
//!
//! Tracks how often the opponent picks each value of one issue and derives
//! (a) an issue weight from how concentrated those choices are and (b) a
//! utility for every observed value.

use crate::models::Value;
use std::collections::BTreeMap;

/// Frequency statistics for one issue.
///
/// # Critical Invariants
///
/// - `weight ∈ [0, 1]`
/// - every value utility `∈ [0, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct IssueEstimator {
    /// Size of the issue's value set as declared at construction
    num_values: usize,
    observations: u32,
    max_count: u32,
    counts: BTreeMap<Value, u32>,
    utilities: BTreeMap<Value, f64>,
    weight: f64,
}

impl IssueEstimator {
    pub fn new(num_values: usize) -> Self {
        Self {
            num_values: num_values.max(1),
            observations: 0,
            max_count: 0,
            counts: BTreeMap::new(),
            utilities: BTreeMap::new(),
            weight: 0.0,
        }
    }

    /// Record one observed value and recompute weight and value utilities.
    pub fn update(&mut self, value: &Value) {
        self.observations += 1;
        let count = self.counts.entry(value.clone()).or_insert(0);
        *count += 1;
        self.max_count = self.max_count.max(*count);

        self.weight = self.concentration();
        self.recompute_utilities();
    }

    /// `(max_count − n/k) / (n − n/k)`, clamped to `[0, 1]`.
    ///
    /// `k` grows past the declared size if the opponent uses values we never
    /// enumerated.
    fn concentration(&self) -> f64 {
        let n = self.observations as f64;
        let k = self.num_values.max(self.counts.len()) as f64;
        let equal_share = n / k;
        let denom = n - equal_share;
        if denom > 0.0 {
            ((self.max_count as f64 - equal_share) / denom).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn recompute_utilities(&mut self) {
        let max = self.max_count as f64;
        let weight = self.weight;
        for (value, &count) in &self.counts {
            let utility = if self.max_count == 0 {
                0.0
            } else if weight < 1.0 {
                // Smoothed power law between 0 and 1
                let exponent = 1.0 - weight;
                let modified = (count as f64 + 1.0).powf(exponent) - 1.0;
                let modified_max = (max + 1.0).powf(exponent) - 1.0;
                if modified_max > 0.0 {
                    modified / modified_max
                } else {
                    0.0
                }
            } else if count == self.max_count {
                1.0
            } else {
                0.0
            };
            self.utilities.insert(value.clone(), utility.clamp(0.0, 1.0));
        }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Estimated opponent utility of a value; 0 for values never offered.
    pub fn value_utility(&self, value: &Value) -> f64 {
        self.utilities.get(value).copied().unwrap_or(0.0)
    }

    pub fn count(&self, value: &Value) -> u32 {
        self.counts.get(value).copied().unwrap_or(0)
    }

    pub fn observations(&self) -> u32 {
        self.observations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_value_concentrates_weight() {
        let mut est = IssueEstimator::new(4);
        for _ in 0..6 {
            est.update(&Value::Int(2));
        }
        assert!((est.weight() - 1.0).abs() < 1e-12);
        assert_eq!(est.value_utility(&Value::Int(2)), 1.0);
        assert_eq!(est.value_utility(&Value::Int(0)), 0.0);
    }

    #[test]
    fn test_uniform_choices_give_zero_weight() {
        let mut est = IssueEstimator::new(4);
        for v in 0..4 {
            est.update(&Value::Int(v));
        }
        assert_eq!(est.weight(), 0.0);
        // With zero weight every observed value gets the same utility
        assert!((est.value_utility(&Value::Int(0)) - 1.0).abs() < 1e-12);
        assert!((est.value_utility(&Value::Int(3)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_more_frequent_value_scores_higher() {
        let mut est = IssueEstimator::new(3);
        for _ in 0..4 {
            est.update(&Value::Int(0));
        }
        est.update(&Value::Int(1));

        let w = est.weight();
        assert!(w > 0.0 && w < 1.0);
        assert!(est.value_utility(&Value::Int(0)) > est.value_utility(&Value::Int(1)));
        assert!(est.value_utility(&Value::Int(1)) > 0.0);
    }

    #[test]
    fn test_single_valued_issue_has_no_signal() {
        let mut est = IssueEstimator::new(1);
        est.update(&Value::Int(0));
        est.update(&Value::Int(0));
        assert_eq!(est.weight(), 0.0);
    }
}
