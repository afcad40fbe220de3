//! Boulware expert: hold firm, concede late
//!
//! Concedes along `target_utility` with a small exponent so the aspiration
//! stays near the maximum for most of the session. Against a stalemated
//! opponent past 40% of the session the exponent is raised (up to 2.5×,
//! capped at 0.30) to break the deadlock.

use super::search::{candidate_search, choose, target_utility};
use crate::models::{Outcome, OutcomeCatalog, RoundState};
use crate::opponent::OpponentModel;
use crate::rng::RngManager;

const STALEMATE_ESCALATION: f64 = 2.5;
const STALEMATE_MAX_EXPONENT: f64 = 0.30;
const STALEMATE_MIN_TIME: f64 = 0.4;
const WINDOW_TOLERANCE: f64 = 0.04;
const WIDEN_LIMIT: usize = 10;
const OPPONENT_WEIGHT: f64 = 0.25;

#[derive(Debug, Clone, PartialEq)]
pub struct BoulwareExpert {
    e: f64,
    rng: RngManager,
}

impl BoulwareExpert {
    pub fn new(e: f64, rng: RngManager) -> Self {
        Self { e, rng }
    }

    pub fn exponent(&self) -> f64 {
        self.e
    }

    /// Aspiration at time `t` without stalemate escalation.
    pub fn target(&self, t: f64, min_util: f64, max_util: f64) -> f64 {
        target_utility(t, self.e, min_util, max_util)
    }

    fn effective_exponent(&self, opponent: &OpponentModel, t: f64) -> f64 {
        if opponent.is_stalemate() && t > STALEMATE_MIN_TIME {
            (self.e * STALEMATE_ESCALATION).min(STALEMATE_MAX_EXPONENT)
        } else {
            self.e
        }
    }

    pub fn propose(
        &mut self,
        catalog: &OutcomeCatalog,
        opponent: &OpponentModel,
        state: &RoundState<'_>,
    ) -> Outcome {
        let e = self.effective_exponent(opponent, state.time);
        let target = target_utility(state.time, e, state.min_util(), state.max_util());
        let candidates = candidate_search(catalog, target, WINDOW_TOLERANCE, WIDEN_LIMIT);
        choose(&candidates, catalog, opponent, OPPONENT_WEIGHT, &mut self.rng)
    }

    pub fn should_accept(&self, offer: &Outcome, catalog: &OutcomeCatalog, state: &RoundState<'_>) -> bool {
        let Some(u) = catalog.utility(offer) else {
            return false;
        };
        u >= self.target(state.time, state.min_util(), state.max_util()) && u >= state.min_util()
    }
}
