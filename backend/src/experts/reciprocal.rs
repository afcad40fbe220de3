//! Reciprocal expert: concede in proportion to the opponent
//!
//! Measures how far the opponent's estimated utility of its own offers has
//! fallen since its opening and mirrors that concession slightly faster,
//! plus a small time-based concession to show good faith. Built for
//! opponents that only move when we move.

use super::search::{
    choose, outcomes_at_or_above, outcomes_in_window, utility_of, MIN_OFFERS_FOR_OPPONENT_SCORING,
};
use crate::models::{Outcome, OutcomeCatalog, RoundState};
use crate::opponent::style::mean;
use crate::opponent::OpponentModel;
use crate::rng::RngManager;

const BASE_CONCESSION: f64 = 0.04;
const TIME_CONCESSION: f64 = 0.08;
const MAX_CONCESSION: f64 = 0.45;
const STALEMATE_DISCOUNT: f64 = 0.88;
const WINDOW_TOLERANCE: f64 = 0.05;
const WIDEN_LIMIT: usize = 10;
const OPPONENT_WEIGHT: f64 = 0.35;
const CONCESSION_SAMPLE: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ReciprocalExpert {
    /// Multiplier applied to the opponent's concession fraction
    match_factor: f64,
    rng: RngManager,
    num_proposed: usize,
}

impl ReciprocalExpert {
    pub fn new(match_factor: f64, rng: RngManager) -> Self {
        Self {
            match_factor,
            rng,
            num_proposed: 0,
        }
    }

    pub fn num_proposed(&self) -> usize {
        self.num_proposed
    }

    /// Aspiration given the opponent's concession so far.
    pub fn target(&self, opponent: &OpponentModel, state: &RoundState<'_>) -> f64 {
        let (min_util, max_util) = (state.min_util(), state.max_util());
        let concession = (BASE_CONCESSION
            + TIME_CONCESSION * state.time
            + opponent_concession_fraction(opponent) * self.match_factor)
            .min(MAX_CONCESSION);
        let mut target = (max_util - (max_util - min_util) * concession).max(min_util);
        if opponent.is_stalemate() {
            target = (target * STALEMATE_DISCOUNT).max(min_util);
        }
        target
    }

    pub fn propose(
        &mut self,
        catalog: &OutcomeCatalog,
        opponent: &OpponentModel,
        state: &RoundState<'_>,
    ) -> Outcome {
        self.num_proposed += 1;
        let target = self.target(opponent, state);
        let mut candidates = outcomes_in_window(catalog, target, WINDOW_TOLERANCE);
        if candidates.is_empty() {
            candidates = outcomes_at_or_above(catalog, target, WIDEN_LIMIT);
        }
        if candidates.is_empty() {
            // Nothing clears the target: offer the cheapest outcome above the floor
            let closest = catalog
                .lowest_at_or_above(state.min_util())
                .unwrap_or_else(|| catalog.best());
            candidates.push(closest);
        }

        if opponent.num_offers() >= MIN_OFFERS_FOR_OPPONENT_SCORING && candidates.len() > 1 {
            // Echo an opponent offer when one clears the target
            if let Some(echo) = candidates
                .iter()
                .find(|o| opponent.has_offered(o) && utility_of(catalog, o) >= target)
            {
                return (*echo).clone();
            }
        }
        choose(&candidates, catalog, opponent, OPPONENT_WEIGHT, &mut self.rng)
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
        let (min_util, max_util) = (state.min_util(), state.max_util());
        if u < min_util {
            return false;
        }
        let target = if opponent.offer_utilities().len() >= CONCESSION_SAMPLE {
            let concession = BASE_CONCESSION + opponent_concession_fraction(opponent) * self.match_factor;
            (max_util - (max_util - min_util) * concession).max(min_util)
        } else {
            max_util - (max_util - min_util) * (BASE_CONCESSION + TIME_CONCESSION * state.time)
        };
        u >= target
    }
}

/// Relative drop of the opponent's self-estimate from its first three
/// offers to its latest three; 0 until three offers exist.
pub fn opponent_concession_fraction(opponent: &OpponentModel) -> f64 {
    let utilities = opponent.offer_utilities();
    if utilities.len() < CONCESSION_SAMPLE {
        return 0.0;
    }
    let start = mean(&utilities[..CONCESSION_SAMPLE]);
    let current = mean(&utilities[utilities.len() - CONCESSION_SAMPLE..]);
    if start > 0.01 {
        ((start - current) / start).max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experts::fixtures::{catalog_0_to_10, catalog_grid, round_state};

    #[test]
    fn test_no_concession_without_history() {
        let opponent = OpponentModel::new(&[11]);
        assert_eq!(opponent_concession_fraction(&opponent), 0.0);

        let catalog = catalog_0_to_10();
        let state = round_state(&catalog, 0.0, 0.4);
        let expert = ReciprocalExpert::new(1.1, RngManager::new(1));
        // 1.0 - 0.6 * 0.04
        assert!((expert.target(&opponent, &state) - 0.976).abs() < 1e-9);
    }

    #[test]
    fn test_stalemate_discounts_target() {
        let catalog = catalog_0_to_10();
        let state = round_state(&catalog, 0.0, 0.4);
        let expert = ReciprocalExpert::new(1.1, RngManager::new(1));
        let mut opponent = OpponentModel::new(&[11]);
        for i in 0..3 {
            opponent.update(&Outcome::from_ints(&[2]), 0.01 * i as f64);
        }
        assert!(opponent.is_stalemate());
        // Repeating the same offer is no concession: 0.976 · 0.88
        assert!((expert.target(&opponent, &state) - 0.976 * 0.88).abs() < 1e-9);
    }

    #[test]
    fn test_proposals_stay_above_floor() {
        let catalog = catalog_0_to_10();
        let opponent = OpponentModel::new(&[11]);
        let mut expert = ReciprocalExpert::new(1.1, RngManager::new(9));
        for i in 0..=10 {
            let state = round_state(&catalog, i as f64 / 10.0, 0.4);
            let offer = expert.propose(&catalog, &opponent, &state);
            assert!(catalog.utility(&offer).unwrap() >= 0.4);
        }
        assert_eq!(expert.num_proposed(), 11);
    }

    #[test]
    fn test_lone_window_hit_below_target_is_kept() {
        let catalog = catalog_0_to_10();
        let opponent = OpponentModel::new(&[11]);
        let mut expert = ReciprocalExpert::new(1.1, RngManager::new(3));
        let state = round_state(&catalog, 1.0, 0.4);

        // 1.0 - 0.6 * 0.12; the window only holds 0.9
        let target = expert.target(&opponent, &state);
        assert!((target - 0.928).abs() < 1e-9);

        let offer = expert.propose(&catalog, &opponent, &state);
        assert_eq!(offer, Outcome::from_ints(&[9]));
        assert!((catalog.utility(&offer).unwrap() - target).abs() <= WINDOW_TOLERANCE);
    }

    #[test]
    fn test_floor_outcome_when_nothing_clears_target() {
        let catalog = catalog_0_to_10();
        let opponent = OpponentModel::new(&[11]);
        let mut expert = ReciprocalExpert::new(1.1, RngManager::new(3));
        // max_util above the catalog: nothing reaches the target
        let mut state = round_state(&catalog, 0.0, 0.4);
        state.bounds.max_util = 2.0;

        assert_eq!(expert.propose(&catalog, &opponent, &state), Outcome::from_ints(&[4]));
    }

    #[test]
    fn test_echoes_opponent_offer_that_clears_target() {
        let catalog = catalog_grid();
        let state = round_state(&catalog, 0.0, 0.4);
        // No concession matching: target stays at 1.0 - 0.6 * 0.04
        let mut expert = ReciprocalExpert::new(0.0, RngManager::new(5));
        let mut opponent = OpponentModel::new(&[5, 5]);
        for (i, offer) in [[4, 0], [0, 1], [1, 1], [0, 1], [1, 1]].iter().enumerate() {
            opponent.update(&Outcome::from_ints(offer), 0.01 * i as f64);
        }
        assert!(!opponent.is_stalemate());

        let echoed = Outcome::from_ints(&[4, 0]);
        let favourite = Outcome::from_ints(&[4, 1]);
        // Opponent scoring alone would pick (4, 1)
        assert!(opponent.get_predicted_utility(&favourite) > opponent.get_predicted_utility(&echoed));

        assert_eq!(expert.propose(&catalog, &opponent, &state), echoed);
    }

    #[test]
    fn test_rejects_below_floor() {
        let catalog = catalog_0_to_10();
        let opponent = OpponentModel::new(&[11]);
        let expert = ReciprocalExpert::new(1.1, RngManager::new(1));
        let state = round_state(&catalog, 0.99, 0.4);
        assert!(!expert.should_accept(&Outcome::from_ints(&[3]), &catalog, &opponent, &state));
        assert!(expert.should_accept(&Outcome::from_ints(&[10]), &catalog, &opponent, &state));
    }
}
