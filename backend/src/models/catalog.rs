//! Outcome catalog
//!
//! The catalog materializes the outcome space once per negotiation with every
//! self-utility pre-computed, sorted by descending utility. It is read-only
//! during bidding; the orchestrator may append an externally supplied outcome
//! that was never enumerated (append-on-miss).
//!
//! # Critical Invariants
//!
//! 1. The catalog is never empty once built
//! 2. Each outcome's utility is computed exactly once
//! 3. `sorted` is ordered by descending utility, ties kept in input order

use super::outcome::Outcome;
use super::utility::{evaluate, UtilityError, UtilityFunction};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while building a catalog
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Outcome space is empty")]
    EmptyOutcomeSpace,

    #[error("Utility could not be computed for any of {attempted} outcomes")]
    NoValidOutcomes { attempted: usize },
}

/// Outcomes sorted by descending self-utility plus the utility cache.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeCatalog {
    sorted: Vec<Outcome>,
    utilities: HashMap<Outcome, f64>,
}

impl OutcomeCatalog {
    /// Evaluate and sort `outcomes`.
    ///
    /// Outcomes whose utility cannot be computed are dropped (and reported via
    /// `tracing`); duplicates are collapsed. Fails only if nothing survives.
    pub fn build<U: UtilityFunction + ?Sized>(
        outcomes: Vec<Outcome>,
        utility: &U,
    ) -> Result<Self, CatalogError> {
        if outcomes.is_empty() {
            return Err(CatalogError::EmptyOutcomeSpace);
        }
        let attempted = outcomes.len();
        let mut utilities = HashMap::with_capacity(attempted);
        let mut kept = Vec::with_capacity(attempted);
        for outcome in outcomes {
            if utilities.contains_key(&outcome) {
                continue;
            }
            match evaluate(utility, &outcome) {
                Ok(u) => {
                    utilities.insert(outcome.clone(), u);
                    kept.push(outcome);
                }
                Err(e) => tracing::warn!(error = %e, "dropping outcome from catalog"),
            }
        }
        if kept.is_empty() {
            return Err(CatalogError::NoValidOutcomes { attempted });
        }
        // Stable sort keeps enumeration order among equal utilities
        kept.sort_by(|a, b| utilities[b].total_cmp(&utilities[a]));
        Ok(Self {
            sorted: kept,
            utilities,
        })
    }

    /// Outcomes in descending utility order.
    pub fn sorted(&self) -> &[Outcome] {
        &self.sorted
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Cached utility, `None` for outcomes never evaluated.
    pub fn utility(&self, outcome: &Outcome) -> Option<f64> {
        self.utilities.get(outcome).copied()
    }

    pub fn contains(&self, outcome: &Outcome) -> bool {
        self.utilities.contains_key(outcome)
    }

    /// Highest-utility outcome.
    pub fn best(&self) -> &Outcome {
        // Non-empty by construction
        &self.sorted[0]
    }

    pub fn max_utility(&self) -> f64 {
        self.utilities[self.best()]
    }

    pub fn min_utility(&self) -> f64 {
        self.sorted
            .last()
            .map(|o| self.utilities[o])
            .unwrap_or(0.0)
    }

    /// Lowest-utility outcome whose utility is at least `floor`, scanning
    /// from the bottom of the sorted list.
    pub fn lowest_at_or_above(&self, floor: f64) -> Option<&Outcome> {
        self.sorted
            .iter()
            .rev()
            .find(|o| self.utilities[*o] >= floor)
    }

    /// Return the cached utility, evaluating and caching on a miss.
    ///
    /// Appended outcomes are inserted at their sorted position.
    pub fn ensure<U: UtilityFunction + ?Sized>(
        &mut self,
        outcome: &Outcome,
        utility: &U,
    ) -> Result<f64, UtilityError> {
        if let Some(u) = self.utility(outcome) {
            return Ok(u);
        }
        let u = evaluate(utility, outcome)?;
        let pos = self
            .sorted
            .partition_point(|o| self.utilities[o] >= u);
        self.sorted.insert(pos, outcome.clone());
        self.utilities.insert(outcome.clone(), u);
        Ok(u)
    }
}
