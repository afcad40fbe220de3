//! Outcome space materialization
//!
//! Domains are cartesian products of discrete issues. Small domains are
//! enumerated in full; above `max_cardinality` a seeded sample of distinct
//! outcomes keeps per-round search cost bounded regardless of domain size.

use super::outcome::{Outcome, Value};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One negotiable issue and its discrete value set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub name: String,
    pub values: Vec<Value>,
}

impl Issue {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Issue whose values are the integers `0..count`.
    pub fn with_int_values(name: impl Into<String>, count: i64) -> Self {
        Self::new(name, (0..count).map(Value::Int).collect())
    }
}

/// Cartesian product of issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSpace {
    pub issues: Vec<Issue>,
}

impl OutcomeSpace {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// Number of outcomes, saturating at `u128::MAX`. Zero if any issue is empty
    /// or there are no issues.
    pub fn cardinality(&self) -> u128 {
        if self.issues.is_empty() {
            return 0;
        }
        self.issues
            .iter()
            .fold(1u128, |acc, issue| acc.saturating_mul(issue.values.len() as u128))
    }

    /// Enumerate every outcome when the space fits `max_cardinality`, otherwise
    /// sample up to `max_cardinality` distinct outcomes.
    ///
    /// Enumeration order is mixed-radix with the last issue varying fastest.
    pub fn enumerate_or_sample(&self, max_cardinality: usize, rng: &mut RngManager) -> Vec<Outcome> {
        let total = self.cardinality();
        if total == 0 || max_cardinality == 0 {
            return Vec::new();
        }
        if total <= max_cardinality as u128 {
            self.enumerate(total as usize)
        } else {
            self.sample(max_cardinality, rng)
        }
    }

    fn enumerate(&self, total: usize) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(total);
        let mut digits = vec![0usize; self.issues.len()];
        for _ in 0..total {
            outcomes.push(self.outcome_at(&digits));
            // Increment mixed-radix counter
            for pos in (0..digits.len()).rev() {
                digits[pos] += 1;
                if digits[pos] < self.issues[pos].values.len() {
                    break;
                }
                digits[pos] = 0;
            }
        }
        outcomes
    }

    fn sample(&self, count: usize, rng: &mut RngManager) -> Vec<Outcome> {
        let mut seen = HashSet::with_capacity(count);
        let mut outcomes = Vec::with_capacity(count);
        let max_attempts = count.saturating_mul(20);
        let mut attempts = 0;
        while outcomes.len() < count && attempts < max_attempts {
            attempts += 1;
            let digits: Vec<usize> = self
                .issues
                .iter()
                .map(|issue| rng.pick_index(issue.values.len()))
                .collect();
            let outcome = self.outcome_at(&digits);
            if seen.insert(outcome.clone()) {
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    fn outcome_at(&self, digits: &[usize]) -> Outcome {
        Outcome::new(
            self.issues
                .iter()
                .zip(digits)
                .map(|(issue, &d)| issue.values[d].clone())
                .collect(),
        )
    }
}

/// Count of distinct values observed per issue across a set of outcomes.
///
/// Used to size the opponent model's uniform-frequency baseline when only an
/// outcome list (not a full domain description) is available.
pub fn values_per_issue(outcomes: &[Outcome]) -> Vec<usize> {
    let n_issues = outcomes.iter().map(Outcome::len).max().unwrap_or(0);
    (0..n_issues)
        .map(|i| {
            outcomes
                .iter()
                .filter_map(|o| o.get(i))
                .collect::<HashSet<_>>()
                .len()
        })
        .collect()
}
