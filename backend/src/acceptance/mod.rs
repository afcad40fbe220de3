//! Composite acceptance controller
//!
//! A short-circuit chain of independent accept conditions behind two
//! absolute gates. The gates (reservation value and hard utility floor) are
//! checked before anything else and no later rule can bypass them.
//!
//! Chain, in order:
//!
//! 1. Hard gates: reservation, hard floor
//! 2. Bootstrap: reject during the first rounds
//! 3. Sliding threshold, linear in time
//! 4. Counter-offer dominance near the threshold
//! 5. Active expert vote near the threshold
//! 6. Stalemate relaxation
//! 7. Repeated-offer relaxation
//! 8. Near-best offer close to the deadline
//! 9. Progressive emergency floor, then last resort

use crate::core::time::normalize_time;
use serde::{Deserialize, Serialize};

const COUNTER_OFFER_RATIO: f64 = 0.93;
const EXPERT_VOTE_RATIO: f64 = 0.90;
const STALEMATE_RATIO: f64 = 0.85;
const REPEAT_RATIO: f64 = 0.90;
const REPEAT_MIN: usize = 3;
const NEAR_BEST_RATIO: f64 = 0.98;
const EMERGENCY_BASE_TOLERANCE: f64 = 0.05;
const EMERGENCY_TOLERANCE_GAIN: f64 = 0.10;
const MIN_SPAN: f64 = 0.001;

/// Which rule decided the offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptRule {
    // Rejections
    BelowReservation,
    BelowHardFloor,
    Bootstrap,
    NoRuleMet,
    /// Our utility of the offer could not be computed
    Unevaluable,

    // Acceptances
    SlidingThreshold,
    CounterOffer,
    ExpertVote,
    Stalemate,
    RepeatedOffer,
    NearBest,
    EmergencyBestReceived,
    EmergencyFloor,
    LastResort,
}

/// Verdict plus the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptDecision {
    pub accepted: bool,
    pub rule: AcceptRule,
}

impl AcceptDecision {
    pub fn accept(rule: AcceptRule) -> Self {
        Self { accepted: true, rule }
    }

    pub fn reject(rule: AcceptRule) -> Self {
        Self { accepted: false, rule }
    }
}

/// Tunable thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceThresholds {
    pub initial_threshold: f64,
    pub final_threshold: f64,
    /// Offers are rejected while `round ≤ no_accept_rounds`
    pub no_accept_rounds: usize,
    pub emergency_time: f64,
    pub emergency_floor: f64,
    /// Time after which an offer close to the best received is accepted
    pub near_best_time: f64,
    /// Time after which anything clearing the hard gates is accepted
    pub last_resort_time: f64,
}

impl Default for AcceptanceThresholds {
    fn default() -> Self {
        Self {
            initial_threshold: 0.92,
            final_threshold: 0.50,
            no_accept_rounds: 2,
            emergency_time: 0.88,
            emergency_floor: 0.0,
            near_best_time: 0.80,
            last_resort_time: 0.95,
        }
    }
}

/// Per-offer context gathered by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptanceInput {
    pub time: f64,
    /// Number of opponent offers observed, including this one
    pub round: usize,
    /// Utility of the counter-offer we would send instead
    pub planned_counter_util: Option<f64>,
    /// Active expert's own `should_accept`
    pub expert_vote: bool,
    pub is_stalemate: bool,
    pub consecutive_repeats: usize,
    pub best_received_util: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AcceptanceController {
    thresholds: AcceptanceThresholds,
    reservation: f64,
    min_util: f64,
    final_threshold: f64,
    emergency_floor: f64,
}

impl AcceptanceController {
    pub fn new(thresholds: AcceptanceThresholds, reservation: f64, min_util: f64) -> Self {
        let mut controller = Self {
            thresholds,
            reservation: 0.0,
            min_util: 0.0,
            final_threshold: thresholds.final_threshold,
            emergency_floor: thresholds.emergency_floor,
        };
        controller.update_reservation(reservation, min_util);
        controller
    }

    /// Revise the reservation value and the hard floor derived from it.
    pub fn update_reservation(&mut self, reservation: f64, min_util: f64) {
        self.reservation = reservation;
        self.min_util = min_util.max(reservation);
        self.final_threshold = self.thresholds.final_threshold.max(self.min_util);
        self.emergency_floor = self
            .thresholds
            .emergency_floor
            .max(self.reservation)
            .max(self.min_util);
    }

    pub fn reservation(&self) -> f64 {
        self.reservation
    }

    pub fn min_util(&self) -> f64 {
        self.min_util
    }

    /// `max(reservation, min_util)`: nothing below is ever accepted.
    pub fn hard_floor(&self) -> f64 {
        self.reservation.max(self.min_util)
    }

    pub fn final_threshold(&self) -> f64 {
        self.final_threshold
    }

    pub fn emergency_floor(&self) -> f64 {
        self.emergency_floor
    }

    /// Sliding threshold, from `initial_threshold` at t = 0 down to the
    /// final threshold at t = 1.
    pub fn threshold(&self, t: f64) -> f64 {
        let t = normalize_time(t);
        let initial = self.thresholds.initial_threshold;
        (initial - (initial - self.final_threshold) * t).max(self.final_threshold)
    }

    /// Progress through the emergency window, 0 at `emergency_time`.
    fn emergency_progress(&self, t: f64) -> f64 {
        let remaining = (1.0 - t).max(MIN_SPAN);
        let window = (1.0 - self.thresholds.emergency_time).max(MIN_SPAN);
        (1.0 - remaining / window).clamp(0.0, 1.0)
    }

    /// Emergency floor interpolated between the sliding threshold and the
    /// configured emergency floor.
    pub fn emergency_threshold(&self, t: f64) -> f64 {
        let threshold = self.threshold(t);
        threshold - (threshold - self.emergency_floor) * self.emergency_progress(t)
    }

    /// Decide on an offer of utility `u`.
    pub fn decide(&self, u: f64, input: &AcceptanceInput) -> AcceptDecision {
        if !u.is_finite() {
            return AcceptDecision::reject(AcceptRule::Unevaluable);
        }
        if u < self.reservation {
            return AcceptDecision::reject(AcceptRule::BelowReservation);
        }
        if u < self.min_util {
            return AcceptDecision::reject(AcceptRule::BelowHardFloor);
        }
        if input.round <= self.thresholds.no_accept_rounds {
            return AcceptDecision::reject(AcceptRule::Bootstrap);
        }

        let t = normalize_time(input.time);
        let threshold = self.threshold(t);
        if u >= threshold {
            return AcceptDecision::accept(AcceptRule::SlidingThreshold);
        }

        if let Some(counter) = input.planned_counter_util {
            if u >= counter && u >= threshold * COUNTER_OFFER_RATIO {
                return AcceptDecision::accept(AcceptRule::CounterOffer);
            }
        }

        if input.expert_vote && u >= threshold * EXPERT_VOTE_RATIO {
            return AcceptDecision::accept(AcceptRule::ExpertVote);
        }

        if input.is_stalemate && u >= self.final_threshold.max(threshold * STALEMATE_RATIO) {
            return AcceptDecision::accept(AcceptRule::Stalemate);
        }

        if input.consecutive_repeats >= REPEAT_MIN && u >= self.final_threshold.max(threshold * REPEAT_RATIO) {
            return AcceptDecision::accept(AcceptRule::RepeatedOffer);
        }

        let best = input.best_received_util;
        if t > self.thresholds.near_best_time && u >= best * NEAR_BEST_RATIO && u >= self.final_threshold {
            return AcceptDecision::accept(AcceptRule::NearBest);
        }

        if t >= self.thresholds.emergency_time {
            let progress = self.emergency_progress(t);
            let emergency = threshold - (threshold - self.emergency_floor) * progress;

            if best > emergency {
                let tolerance = EMERGENCY_BASE_TOLERANCE + EMERGENCY_TOLERANCE_GAIN * progress;
                if u >= best * (1.0 - tolerance) {
                    return AcceptDecision::accept(AcceptRule::EmergencyBestReceived);
                }
            }
            if u >= emergency {
                return AcceptDecision::accept(AcceptRule::EmergencyFloor);
            }
            if t >= self.thresholds.last_resort_time {
                // Both hard gates already passed
                return AcceptDecision::accept(AcceptRule::LastResort);
            }
        }

        AcceptDecision::reject(AcceptRule::NoRuleMet)
    }
}
