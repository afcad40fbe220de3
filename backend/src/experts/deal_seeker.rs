//! Deal-seeker expert: close the gap before the deadline
//!
//! Only meaningful late in the session. The aspiration falls from 85% of the
//! range to the floor between `start` and the deadline. The opponent's own
//! offers that clear it are echoed back first; otherwise the most
//! opponent-friendly outcome near the aspiration is proposed.

use super::search::{choose, outcomes_at_or_above, outcomes_in_window, utility_of};
use crate::models::{Outcome, OutcomeCatalog, RoundState};
use crate::opponent::OpponentModel;
use crate::rng::RngManager;

const INITIAL_CONCESSION: f64 = 0.15;
const WINDOW_TOLERANCE: f64 = 0.08;
const WIDEN_LIMIT: usize = 30;
const OPPONENT_WEIGHT: f64 = 0.45;

#[derive(Debug, Clone, PartialEq)]
pub struct DealSeekerExpert {
    start: f64,
    rng: RngManager,
}

impl DealSeekerExpert {
    pub fn new(start: f64, rng: RngManager) -> Self {
        Self { start, rng }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn target(&self, t: f64, min_util: f64, max_util: f64) -> f64 {
        let span = 1.0 - self.start;
        let t_late = if span > 0.0 {
            ((t - self.start) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let concession = INITIAL_CONCESSION + (1.0 - INITIAL_CONCESSION) * t_late;
        (max_util - (max_util - min_util) * concession).max(min_util)
    }

    pub fn propose(
        &mut self,
        catalog: &OutcomeCatalog,
        opponent: &OpponentModel,
        state: &RoundState<'_>,
    ) -> Outcome {
        let target = self.target(state.time, state.min_util(), state.max_util());

        // Highest-utility opponent offer that clears the target
        let mut echo: Option<(&Outcome, f64)> = None;
        for offer in opponent.unique_offers() {
            let Some(u) = catalog.utility(offer) else {
                continue;
            };
            if u >= target && echo.map_or(true, |(_, best)| u > best) {
                echo = Some((offer, u));
            }
        }
        if let Some((offer, _)) = echo {
            return offer.clone();
        }

        let mut candidates = outcomes_in_window(catalog, target, WINDOW_TOLERANCE);
        if candidates.is_empty() {
            candidates = outcomes_at_or_above(catalog, state.min_util(), WIDEN_LIMIT);
        }
        if candidates.is_empty() {
            candidates.push(catalog.best());
        }
        choose(&candidates, catalog, opponent, OPPONENT_WEIGHT, &mut self.rng)
    }

    pub fn should_accept(&self, offer: &Outcome, catalog: &OutcomeCatalog, state: &RoundState<'_>) -> bool {
        catalog.contains(offer) && utility_of(catalog, offer) >= state.min_util()
    }
}
