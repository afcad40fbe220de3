//! Meta-controller: per-round expert selection
//!
//! Owns the expert pool and picks one active expert per round. Selection
//! runs in priority order:
//!
//! 1. Forced deal seeker near the deadline
//! 2. Forced reciprocal expert under a confirmed stalemate
//! 3. Forced reciprocal expert against tit-for-tat / many-unique opponents
//! 4. Cooldown gate after a recent switch (early and mid session only)
//! 5. Scored selection with hysteresis
//!
//! Scores are `(phase_prior + style_adjustment + 0.5 · ema) · weight`.
//! Rewards update a running average, an EMA and a multiplicative bandit
//! weight floored at a positive constant so no expert starves.

pub mod priors;

pub use priors::NUM_EXPERTS;

use crate::core::time::Phase;
use crate::experts::{Expert, ExpertKind, ExpertParams};
use crate::opponent::{OpponentModel, MIN_STYLE_OBSERVATIONS};
use priors::{phase_prior, style_adjustment};
use serde::{Deserialize, Serialize};

/// Time from which the deal seeker is forced.
pub const DEADLINE_FORCE_TIME: f64 = 0.93;

/// Reciprocal overrides stop applying from here on.
pub const PANIC_TIME: f64 = 0.90;

/// Rounds that must elapse before a stalemate override is trusted.
pub const STALEMATE_MIN_ROUNDS: usize = 8;

/// Cooldown is ignored after this time.
pub const COOLDOWN_OFF_TIME: f64 = 0.70;

/// Minimum score advantage needed to switch expert.
pub const SWITCH_MARGIN: f64 = 0.10;

/// Past this time any better-scoring expert takes over.
pub const FREE_SWITCH_TIME: f64 = 0.60;

const EMA_ALPHA: f64 = 0.3;
const EMA_INITIAL: f64 = 0.5;
const EMA_SCORE_WEIGHT: f64 = 0.5;
const WEIGHT_FLOOR: f64 = 0.1;
const WEIGHT_RATE: f64 = 0.1;
const NEUTRAL_REWARD: f64 = 0.5;
const INITIAL_WEIGHTS: [f64; NUM_EXPERTS] = [2.0, 1.0, 2.0, 1.0, 1.0];

/// Why the active expert was chosen this round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionReason {
    /// Deadline override
    ForcedDeadline,
    /// Stalemate override
    ForcedStalemate,
    /// Tit-for-tat or many-unique-offers opponent detected
    ForcedReciprocal,
    /// A recent switch is still cooling down
    Cooldown { remaining: usize },
    /// Incumbent scored best
    BestScore { score: f64 },
    /// A better candidate existed but did not clear the switch margin
    KeptIncumbent {
        candidate: ExpertKind,
        incumbent_score: f64,
        candidate_score: f64,
    },
    /// Switched to a better-scoring expert
    Switched {
        previous: ExpertKind,
        previous_score: f64,
        candidate_score: f64,
    },
}

/// Selection outcome for one round.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub expert: ExpertKind,
    pub reason: SelectionReason,
}

/// Diagnostic snapshot of the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerStatus {
    pub weights: Vec<f64>,
    pub ema: Vec<f64>,
    pub visits: Vec<u32>,
    pub reward_counts: Vec<u32>,
    pub active: ExpertKind,
    pub cooldown: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetaController {
    experts: Vec<Expert>,
    weights: [f64; NUM_EXPERTS],
    reward_sums: [f64; NUM_EXPERTS],
    reward_counts: [u32; NUM_EXPERTS],
    visits: [u32; NUM_EXPERTS],
    ema: [f64; NUM_EXPERTS],
    active: ExpertKind,
    cooldown: usize,
    switch_cooldown: usize,
}

impl MetaController {
    /// Build the controller and its expert pool.
    ///
    /// `switch_cooldown` is the number of rounds an expert is kept after a
    /// scored switch.
    pub fn new(params: &ExpertParams, switch_cooldown: usize, seed: u64) -> Self {
        Self {
            experts: Expert::pool(params, seed),
            weights: INITIAL_WEIGHTS,
            reward_sums: [0.0; NUM_EXPERTS],
            reward_counts: [0; NUM_EXPERTS],
            visits: [0; NUM_EXPERTS],
            ema: [EMA_INITIAL; NUM_EXPERTS],
            active: ExpertKind::Boulware,
            cooldown: 0,
            switch_cooldown,
        }
    }

    /// Select the active expert for this round.
    ///
    /// `round` is the number of opponent offers observed so far.
    pub fn select(&mut self, opponent: &OpponentModel, t: f64, round: usize) -> Selection {
        let selection = self.select_inner(opponent, t, round);
        self.active = selection.expert;
        self.visits[selection.expert.index()] += 1;
        tracing::debug!(
            expert = %selection.expert,
            reason = ?selection.reason,
            t,
            round,
            "expert selected"
        );
        selection
    }

    fn select_inner(&mut self, opponent: &OpponentModel, t: f64, round: usize) -> Selection {
        if t >= DEADLINE_FORCE_TIME {
            return Selection {
                expert: ExpertKind::DealSeeker,
                reason: SelectionReason::ForcedDeadline,
            };
        }

        if opponent.is_stalemate() && t < PANIC_TIME && round > STALEMATE_MIN_ROUNDS {
            self.cooldown = 0;
            return Selection {
                expert: ExpertKind::Reciprocal,
                reason: SelectionReason::ForcedStalemate,
            };
        }

        if opponent.num_offers() >= MIN_STYLE_OBSERVATIONS
            && (opponent.is_tft_style() || opponent.is_micro_style())
            && t < PANIC_TIME
        {
            self.cooldown = 0;
            return Selection {
                expert: ExpertKind::Reciprocal,
                reason: SelectionReason::ForcedReciprocal,
            };
        }

        if t > COOLDOWN_OFF_TIME {
            self.cooldown = 0;
        }
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return Selection {
                expert: self.active,
                reason: SelectionReason::Cooldown {
                    remaining: self.cooldown,
                },
            };
        }

        let scores = self.scores(opponent, t);
        let best = first_max(&scores);
        let incumbent = self.active;
        let incumbent_score = scores[incumbent.index()];
        let candidate = ExpertKind::ALL[best];
        let candidate_score = scores[best];

        if candidate == incumbent {
            return Selection {
                expert: incumbent,
                reason: SelectionReason::BestScore {
                    score: incumbent_score,
                },
            };
        }
        if candidate_score - incumbent_score > SWITCH_MARGIN || t > FREE_SWITCH_TIME {
            self.cooldown = self.switch_cooldown;
            Selection {
                expert: candidate,
                reason: SelectionReason::Switched {
                    previous: incumbent,
                    previous_score: incumbent_score,
                    candidate_score,
                },
            }
        } else {
            Selection {
                expert: incumbent,
                reason: SelectionReason::KeptIncumbent {
                    candidate,
                    incumbent_score,
                    candidate_score,
                },
            }
        }
    }

    /// Selection score of every expert, in pool order.
    pub fn scores(&self, opponent: &OpponentModel, t: f64) -> [f64; NUM_EXPERTS] {
        let prior = phase_prior(Phase::of(t));
        let adjustment = style_adjustment(&opponent.style_features(), t);
        let mut scores = [0.0; NUM_EXPERTS];
        for i in 0..NUM_EXPERTS {
            scores[i] = (prior[i] + adjustment[i] + self.ema[i] * EMA_SCORE_WEIGHT) * self.weights[i];
        }
        scores
    }

    /// Feed back the self-utility achieved by `expert`'s latest action.
    pub fn update_reward(&mut self, expert: ExpertKind, reward: f64) {
        if !reward.is_finite() {
            tracing::warn!(%expert, reward, "ignoring non-finite reward");
            return;
        }
        let reward = reward.clamp(0.0, 1.0);
        let i = expert.index();
        self.reward_sums[i] += reward;
        self.reward_counts[i] += 1;
        self.ema[i] = EMA_ALPHA * reward + (1.0 - EMA_ALPHA) * self.ema[i];

        let average = self.reward_sums[i] / f64::from(self.reward_counts[i]);
        self.weights[i] = (self.weights[i] * (1.0 + WEIGHT_RATE * (average - NEUTRAL_REWARD))).max(WEIGHT_FLOOR);
    }

    pub fn active(&self) -> ExpertKind {
        self.active
    }

    pub fn expert(&self, kind: ExpertKind) -> &Expert {
        &self.experts[kind.index()]
    }

    pub fn expert_mut(&mut self, kind: ExpertKind) -> &mut Expert {
        &mut self.experts[kind.index()]
    }

    pub fn weight(&self, kind: ExpertKind) -> f64 {
        self.weights[kind.index()]
    }

    pub fn ema(&self, kind: ExpertKind) -> f64 {
        self.ema[kind.index()]
    }

    pub fn average_reward(&self, kind: ExpertKind) -> Option<f64> {
        let i = kind.index();
        (self.reward_counts[i] > 0).then(|| self.reward_sums[i] / f64::from(self.reward_counts[i]))
    }

    pub fn status(&self) -> ControllerStatus {
        ControllerStatus {
            weights: self.weights.to_vec(),
            ema: self.ema.to_vec(),
            visits: self.visits.to_vec(),
            reward_counts: self.reward_counts.to_vec(),
            active: self.active,
            cooldown: self.cooldown,
        }
    }
}

/// Index of the first maximal score.
fn first_max(scores: &[f64; NUM_EXPERTS]) -> usize {
    let mut best = 0;
    for i in 1..NUM_EXPERTS {
        if scores[i] > scores[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Outcome;

    fn controller() -> MetaController {
        MetaController::new(&ExpertParams::default(), 2, 42)
    }

    #[test]
    fn test_opens_with_boulware() {
        let mut meta = controller();
        let opponent = OpponentModel::new(&[5, 3]);
        let s = meta.select(&opponent, 0.0, 0);
        assert_eq!(s.expert, ExpertKind::Boulware);
        assert!(matches!(s.reason, SelectionReason::BestScore { .. }));
    }

    #[test]
    fn test_deadline_forces_deal_seeker() {
        let mut meta = controller();
        let opponent = OpponentModel::new(&[5, 3]);
        let s = meta.select(&opponent, 0.95, 30);
        assert_eq!(s.expert, ExpertKind::DealSeeker);
        assert_eq!(s.reason, SelectionReason::ForcedDeadline);
        assert_eq!(meta.active(), ExpertKind::DealSeeker);
    }

    #[test]
    fn test_stalemate_override_waits_for_rounds() {
        let mut meta = controller();
        let mut opponent = OpponentModel::new(&[5, 3]);
        for i in 0..4 {
            opponent.update(&Outcome::from_ints(&[1, 1]), 0.01 * i as f64);
        }
        assert!(opponent.is_stalemate());

        let early = meta.select(&opponent, 0.1, 4);
        assert_ne!(early.reason, SelectionReason::ForcedStalemate);

        let late = meta.select(&opponent, 0.5, 9);
        assert_eq!(late.expert, ExpertKind::Reciprocal);
        assert_eq!(late.reason, SelectionReason::ForcedStalemate);

        let panic = meta.select(&opponent, 0.91, 10);
        assert_ne!(panic.reason, SelectionReason::ForcedStalemate);
    }

    #[test]
    fn test_micro_opponent_forces_reciprocal() {
        let mut meta = controller();
        let mut opponent = OpponentModel::new(&[5, 3]);
        let mut i = 0;
        for a in 0..5 {
            for b in 0..2 {
                opponent.update(&Outcome::from_ints(&[a, b]), 0.01 * i as f64);
                i += 1;
            }
        }
        assert!(opponent.is_micro_style());
        let s = meta.select(&opponent, 0.3, 10);
        assert_eq!(s.expert, ExpertKind::Reciprocal);
        assert_eq!(s.reason, SelectionReason::ForcedReciprocal);
    }

    #[test]
    fn test_cooldown_holds_after_switch() {
        let mut meta = controller();
        let opponent = OpponentModel::new(&[5, 3]);
        for _ in 0..10 {
            meta.update_reward(ExpertKind::Forecast, 1.0);
        }

        let switch = meta.select(&opponent, 0.5, 1);
        assert_eq!(switch.expert, ExpertKind::Forecast);
        assert!(matches!(switch.reason, SelectionReason::Switched { previous: ExpertKind::Boulware, .. }));

        let held = meta.select(&opponent, 0.52, 2);
        assert_eq!(held.reason, SelectionReason::Cooldown { remaining: 1 });
        let held = meta.select(&opponent, 0.54, 3);
        assert_eq!(held.reason, SelectionReason::Cooldown { remaining: 0 });
        let scored = meta.select(&opponent, 0.56, 4);
        assert!(!matches!(scored.reason, SelectionReason::Cooldown { .. }));
    }

    #[test]
    fn test_weight_never_drops_below_floor() {
        let mut meta = controller();
        for _ in 0..500 {
            meta.update_reward(ExpertKind::Pareto, 0.0);
        }
        assert!(meta.weight(ExpertKind::Pareto) >= WEIGHT_FLOOR);
        assert!((meta.weight(ExpertKind::Pareto) - WEIGHT_FLOOR).abs() < 1e-12);
        assert!(meta.ema(ExpertKind::Pareto) < 1e-6);
        assert_eq!(meta.average_reward(ExpertKind::Pareto), Some(0.0));
    }

    #[test]
    fn test_reward_updates_ema_and_weight() {
        let mut meta = controller();
        meta.update_reward(ExpertKind::Boulware, 1.0);
        assert!((meta.ema(ExpertKind::Boulware) - 0.65).abs() < 1e-12);
        assert!((meta.weight(ExpertKind::Boulware) - 2.1).abs() < 1e-12);

        meta.update_reward(ExpertKind::Boulware, f64::NAN);
        assert_eq!(meta.status().reward_counts[0], 1);
        assert_eq!(meta.average_reward(ExpertKind::Forecast), None);
    }
}
