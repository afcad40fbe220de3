//! Pareto expert: joint-gain search above the aspiration
//!
//! Takes every outcome (up to a cap) at or above a slow-conceding target and
//! picks the one maximizing a weighted sum of own and predicted opponent
//! utility. The opponent weight grows with time.

use super::search::{choose, outcomes_at_or_above, target_utility};
use crate::models::{Outcome, OutcomeCatalog, RoundState};
use crate::opponent::OpponentModel;
use crate::rng::RngManager;

const MAX_CANDIDATES: usize = 200;
const ALPHA_TIME_GAIN: f64 = 0.10;

#[derive(Debug, Clone, PartialEq)]
pub struct ParetoExpert {
    e: f64,
    alpha: f64,
    rng: RngManager,
}

impl ParetoExpert {
    pub fn new(e: f64, alpha: f64, rng: RngManager) -> Self {
        Self { e, alpha, rng }
    }

    /// Opponent weight at time `t`.
    pub fn alpha_at(&self, t: f64) -> f64 {
        (self.alpha + ALPHA_TIME_GAIN * t).clamp(0.0, 1.0)
    }

    pub fn propose(
        &mut self,
        catalog: &OutcomeCatalog,
        opponent: &OpponentModel,
        state: &RoundState<'_>,
    ) -> Outcome {
        let target = target_utility(state.time, self.e, state.min_util(), state.max_util());
        let mut candidates = outcomes_at_or_above(catalog, target, MAX_CANDIDATES);
        if candidates.is_empty() {
            candidates.push(catalog.best());
        }
        choose(&candidates, catalog, opponent, self.alpha_at(state.time), &mut self.rng)
    }

    pub fn should_accept(&self, offer: &Outcome, catalog: &OutcomeCatalog, state: &RoundState<'_>) -> bool {
        let Some(u) = catalog.utility(offer) else {
            return false;
        };
        u >= target_utility(state.time, self.e, state.min_util(), state.max_util()) && u >= state.min_util()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experts::fixtures::{catalog_grid, round_state};

    #[test]
    fn test_prefers_joint_gain_among_equals() {
        // Own utility depends only on issue 0; opponent always offers [_, 4]
        let catalog = catalog_grid();
        let mut opponent = OpponentModel::new(&[5, 5]);
        for i in 0..6 {
            opponent.update(&Outcome::from_ints(&[i % 2, 4]), 0.05 * i as f64);
        }
        let state = round_state(&catalog, 0.0, 0.5);
        let mut expert = ParetoExpert::new(0.10, 0.30, RngManager::new(3));

        let offer = expert.propose(&catalog, &opponent, &state);
        assert_eq!(offer, Outcome::from_ints(&[4, 4]));
    }

    #[test]
    fn test_alpha_grows_with_time() {
        let expert = ParetoExpert::new(0.10, 0.30, RngManager::new(3));
        assert!((expert.alpha_at(0.0) - 0.30).abs() < 1e-12);
        assert!((expert.alpha_at(1.0) - 0.40).abs() < 1e-12);
    }
}
