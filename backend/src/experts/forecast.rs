//! Forecast expert: adapt the concession curve to the opponent
//!
//! The concession exponent is scaled by the opponent's style: faster against
//! stalemates and late against hardheaded opponents, slower against
//! conceders. The regression forecast of the opponent's deadline position
//! keeps the aspiration off the floor when the opponent is expected to come
//! down to us anyway.

use super::search::{candidate_search, choose, target_utility};
use crate::models::{Outcome, OutcomeCatalog, RoundState};
use crate::opponent::{OpponentModel, MIN_STYLE_OBSERVATIONS};
use crate::rng::RngManager;

const FORECAST_MIN_OFFERS: usize = 6;
const FORECAST_CONCEDING: f64 = 0.5;
const FLOOR_MARGIN: f64 = 0.05;
const WINDOW_TOLERANCE: f64 = 0.05;
const WIDEN_LIMIT: usize = 10;
const LATE_TIME: f64 = 0.90;
const NEAR_BEST_RATIO: f64 = 0.98;

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastExpert {
    base_e: f64,
    rng: RngManager,
}

impl ForecastExpert {
    pub fn new(base_e: f64, rng: RngManager) -> Self {
        Self { base_e, rng }
    }

    /// Concession exponent after style adjustment.
    pub fn adaptive_exponent(&self, opponent: &OpponentModel, t: f64) -> f64 {
        if opponent.num_offers() < MIN_STYLE_OBSERVATIONS {
            return self.base_e;
        }
        let features = opponent.style_features();
        let factor = if features.is_stalemate && t > 0.4 {
            2.5
        } else if features.is_hardheaded {
            if t > 0.8 {
                2.5
            } else if t > 0.6 {
                1.5
            } else {
                1.1
            }
        } else if features.is_tft_style {
            1.3
        } else if features.is_conceder {
            0.5
        } else if features.concession_rate > 0.1 {
            0.6
        } else if features.concession_rate < -0.05 {
            1.2
        } else {
            0.9
        };
        self.base_e * factor
    }

    fn target(&self, opponent: &OpponentModel, state: &RoundState<'_>) -> f64 {
        let e = self.adaptive_exponent(opponent, state.time);
        target_utility(state.time, e, state.min_util(), state.max_util())
    }

    pub fn propose(
        &mut self,
        catalog: &OutcomeCatalog,
        opponent: &OpponentModel,
        state: &RoundState<'_>,
    ) -> Outcome {
        let mut target = self.target(opponent, state);
        if opponent.num_offers() >= FORECAST_MIN_OFFERS
            && opponent.predict_future_concession(state.time) < FORECAST_CONCEDING
        {
            target = target.max((state.min_util() + FLOOR_MARGIN).min(state.max_util()));
        }
        let candidates = candidate_search(catalog, target, WINDOW_TOLERANCE, WIDEN_LIMIT);
        let alpha = (0.20 + 0.20 * state.time).min(0.4);
        choose(&candidates, catalog, opponent, alpha, &mut self.rng)
    }

    pub fn should_accept(
        &self,
        offer: &Outcome,
        catalog: &OutcomeCatalog,
        opponent: &OpponentModel,
        state: &RoundState<'_>,
    ) -> bool {
        let Some(u) = catalog.utility(offer) else {
            return false;
        };
        if u < state.reservation() {
            return false;
        }
        if opponent.num_offers() >= FORECAST_MIN_OFFERS
            && state.time > LATE_TIME
            && u >= state.best_received_util * NEAR_BEST_RATIO
        {
            return true;
        }
        u >= self.target(opponent, state)
    }
}
