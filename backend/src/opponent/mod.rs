//! Frequency-based opponent model
//!
//! Converts the stream of opponent offers into:
//! - an estimated opponent utility function (per-issue weights and value
//!   utilities learned from value frequencies)
//! - style signals (hardheaded, conceder, many-unique-offers, tit-for-tat,
//!   stalemate, reciprocity) for the meta-controller
//! - a short-horizon forecast of where the opponent will end up
//!
//! The model is created once per negotiation and updated exactly once per
//! observed opponent offer. It never raises: missing issue values are
//! skipped and every estimate degrades to a neutral default when data is
//! scarce.

pub mod issue;
pub mod style;

pub use issue::IssueEstimator;
pub use style::{StyleFeatures, MIN_STYLE_OBSERVATIONS};

use crate::models::Outcome;
use std::collections::HashSet;
use style::{classify, mean};

/// Number of normalized-time buckets for segment aggregates.
pub const TIME_SEGMENTS: usize = 40;

/// Segments only accumulate after this fraction of the negotiation.
pub const SEGMENT_GRACE: f64 = 0.2;

/// Consecutive identical offers that constitute a stalemate.
pub const STALEMATE_REPEATS: usize = 3;

/// Recent points used by the concession forecast.
const FORECAST_WINDOW: usize = 20;

/// Minimum opponent responses to our concessions before reciprocity is scored.
const MIN_RECIPROCITY_TRIALS: usize = 3;

/// Frequency-based opponent model.
#[derive(Debug, Clone)]
pub struct OpponentModel {
    issues: Vec<IssueEstimator>,

    offers: Vec<Outcome>,
    /// Estimated opponent utility of each offer at the time it was made
    offer_utilities: Vec<f64>,
    unique_lookup: HashSet<Outcome>,
    /// Distinct offers in first-seen order
    unique_offers: Vec<Outcome>,

    segment_sums: Vec<f64>,
    segment_counts: Vec<usize>,
    current_segment: usize,

    consecutive_repeats: usize,
    stalemate_episodes: usize,
    is_stalemate: bool,

    concession_rate: f64,
    is_hardheaded: bool,
    is_conceder: bool,
    is_micro_style: bool,
    is_tft_style: bool,

    last_own_util: Option<f64>,
    awaiting_response_to_concession: bool,
    reciprocity_trials: usize,
    reciprocity_hits: usize,
}

impl OpponentModel {
    /// Create a model for a domain with the given number of values per issue.
    pub fn new(values_per_issue: &[usize]) -> Self {
        Self {
            issues: values_per_issue.iter().map(|&k| IssueEstimator::new(k)).collect(),
            offers: Vec::new(),
            offer_utilities: Vec::new(),
            unique_lookup: HashSet::new(),
            unique_offers: Vec::new(),
            segment_sums: vec![0.0; TIME_SEGMENTS],
            segment_counts: vec![0; TIME_SEGMENTS],
            current_segment: 0,
            consecutive_repeats: 0,
            stalemate_episodes: 0,
            is_stalemate: false,
            concession_rate: 0.0,
            is_hardheaded: false,
            is_conceder: false,
            is_micro_style: false,
            is_tft_style: false,
            last_own_util: None,
            awaiting_response_to_concession: false,
            reciprocity_trials: 0,
            reciprocity_hits: 0,
        }
    }

    /// Record one opponent offer made at normalized time `t`.
    pub fn update(&mut self, offer: &Outcome, t: f64) {
        let t = crate::core::time::normalize_time(t);

        for (i, estimator) in self.issues.iter_mut().enumerate() {
            if let Some(value) = offer.get(i) {
                estimator.update(value);
            }
        }

        self.update_stalemate(offer);

        let is_new = self.unique_lookup.insert(offer.clone());
        if is_new {
            self.unique_offers.push(offer.clone());
        }
        self.offers.push(offer.clone());

        let estimate = self.get_predicted_utility(offer);
        let previous_estimate = self.offer_utilities.last().copied();
        self.offer_utilities.push(estimate);

        self.update_segments(estimate, t);
        self.update_reciprocity(estimate, previous_estimate);

        let unique_ratio = self.unique_ratio();
        if let Some(c) = classify(&self.offer_utilities, unique_ratio) {
            self.concession_rate = c.concession_rate;
            self.is_hardheaded = c.is_hardheaded;
            self.is_conceder = c.is_conceder;
            self.is_micro_style = c.is_micro_style;
            self.is_tft_style = c.is_tft_style;
        }
    }

    fn update_stalemate(&mut self, offer: &Outcome) {
        if self.offers.last() == Some(offer) {
            self.consecutive_repeats += 1;
        } else {
            self.consecutive_repeats = 1;
        }
        if self.consecutive_repeats == STALEMATE_REPEATS {
            self.stalemate_episodes += 1;
        }
        // A second episode makes the diagnosis stick on shorter repeats
        self.is_stalemate = self.consecutive_repeats >= STALEMATE_REPEATS
            || (self.stalemate_episodes >= 2 && self.consecutive_repeats >= 2);
    }

    fn update_segments(&mut self, estimate: f64, t: f64) {
        if t <= SEGMENT_GRACE {
            return;
        }
        let last = TIME_SEGMENTS - 1;
        let position = (t - SEGMENT_GRACE) / (1.0 - SEGMENT_GRACE);
        let idx = ((last as f64 * position) as usize).min(last);
        self.segment_sums[idx] += estimate;
        self.segment_counts[idx] += 1;
        self.current_segment = self.current_segment.max(idx);
    }

    fn update_reciprocity(&mut self, estimate: f64, previous_estimate: Option<f64>) {
        if !self.awaiting_response_to_concession {
            return;
        }
        self.awaiting_response_to_concession = false;
        if let Some(previous) = previous_estimate {
            self.reciprocity_trials += 1;
            if estimate < previous - 1e-9 {
                self.reciprocity_hits += 1;
            }
        }
    }

    /// Report one of our own proposals so reciprocity can be measured.
    ///
    /// A drop in our self-utility counts as a concession; the opponent's next
    /// offer is then checked for a matching drop in its estimated utility.
    pub fn track_own_offer(&mut self, self_utility: f64) {
        if let Some(previous) = self.last_own_util {
            if self_utility < previous - 1e-9 {
                self.awaiting_response_to_concession = true;
            }
        }
        self.last_own_util = Some(self_utility);
    }

    /// Estimated opponent utility of an outcome, in `[0, 1]`.
    ///
    /// Weighted average of value utilities by issue weight; falls back to an
    /// unweighted average while no issue carries weight yet. Zero before any
    /// offer has been observed.
    pub fn get_predicted_utility(&self, outcome: &Outcome) -> f64 {
        if self.offers.is_empty() || self.issues.is_empty() {
            return 0.0;
        }
        let mut total_weight = 0.0;
        let mut weighted = 0.0;
        for (i, estimator) in self.issues.iter().enumerate() {
            if let Some(value) = outcome.get(i) {
                let w = estimator.weight();
                weighted += estimator.value_utility(value) * w;
                total_weight += w;
            }
        }
        let estimate = if total_weight > 0.0 {
            weighted / total_weight
        } else {
            let n = self.issues.len() as f64;
            self.issues
                .iter()
                .enumerate()
                .filter_map(|(i, est)| outcome.get(i).map(|v| est.value_utility(v)))
                .sum::<f64>()
                / n
        };
        estimate.clamp(0.0, 1.0)
    }

    /// Forecast the opponent's utility level at the deadline.
    ///
    /// Linear regression over the last (≤20) estimated utilities, projected
    /// over the remaining time and clamped to `[0.3, 1.0]`. Returns 0.5 with
    /// fewer than five observations.
    pub fn predict_future_concession(&self, t: f64) -> f64 {
        let len = self.offer_utilities.len();
        if len < 5 {
            return 0.5;
        }
        let n = len.min(FORECAST_WINDOW);
        let recent = &self.offer_utilities[len - n..];
        let x_mean = (n as f64 - 1.0) / 2.0;
        let y_mean = mean(recent);
        let mut num = 0.0;
        let mut denom = 0.0;
        for (i, y) in recent.iter().enumerate() {
            let dx = i as f64 - x_mean;
            num += dx * (y - y_mean);
            denom += dx * dx;
        }
        let slope = if denom > 0.0 { num / denom } else { 0.0 };

        let t = crate::core::time::normalize_time(t);
        let remaining_ratio = (1.0 - t) / t.max(0.01);
        let predicted = y_mean + slope * remaining_ratio * n as f64;
        predicted.clamp(0.3, 1.0)
    }

    /// Average estimated utility recorded in one time segment (0 if empty).
    pub fn average_segment_utility(&self, segment: usize) -> f64 {
        let seg = segment.min(TIME_SEGMENTS - 1);
        if self.segment_counts[seg] > 0 {
            self.segment_sums[seg] / self.segment_counts[seg] as f64
        } else {
            0.0
        }
    }

    /// Opponent's current demand level from the last four segments.
    ///
    /// Floored at 0.5; 0.8 before any segment has data.
    pub fn current_threshold(&self) -> f64 {
        if self.current_segment == 0 {
            return 0.8;
        }
        let start = self.current_segment.saturating_sub(3);
        let averages: Vec<f64> = (start..=self.current_segment)
            .map(|i| self.average_segment_utility(i))
            .filter(|avg| *avg > 0.0)
            .collect();
        if averages.is_empty() {
            0.8
        } else {
            mean(&averages).max(0.5)
        }
    }

    /// Fraction of our concessions answered by an opponent concession.
    pub fn reciprocity_score(&self) -> f64 {
        if self.reciprocity_trials < MIN_RECIPROCITY_TRIALS {
            0.5
        } else {
            self.reciprocity_hits as f64 / self.reciprocity_trials as f64
        }
    }

    pub fn unique_ratio(&self) -> f64 {
        self.unique_offers.len() as f64 / self.offers.len().max(1) as f64
    }

    pub fn style_features(&self) -> StyleFeatures {
        StyleFeatures {
            num_offers: self.offers.len(),
            unique_ratio: self.unique_ratio(),
            concession_rate: self.concession_rate,
            is_hardheaded: self.is_hardheaded,
            is_conceder: self.is_conceder,
            is_micro_style: self.is_micro_style,
            is_tft_style: self.is_tft_style,
            is_stalemate: self.is_stalemate,
            reciprocity: self.reciprocity_score(),
            current_threshold: self.current_threshold(),
        }
    }

    pub fn num_offers(&self) -> usize {
        self.offers.len()
    }

    pub fn offers(&self) -> &[Outcome] {
        &self.offers
    }

    pub fn offer_utilities(&self) -> &[f64] {
        &self.offer_utilities
    }

    /// Distinct opponent offers in first-seen order.
    pub fn unique_offers(&self) -> &[Outcome] {
        &self.unique_offers
    }

    pub fn has_offered(&self, outcome: &Outcome) -> bool {
        self.unique_lookup.contains(outcome)
    }

    pub fn issue(&self, index: usize) -> Option<&IssueEstimator> {
        self.issues.get(index)
    }

    pub fn consecutive_repeats(&self) -> usize {
        self.consecutive_repeats
    }

    pub fn stalemate_episodes(&self) -> usize {
        self.stalemate_episodes
    }

    pub fn is_stalemate(&self) -> bool {
        self.is_stalemate
    }

    pub fn is_hardheaded(&self) -> bool {
        self.is_hardheaded
    }

    pub fn is_conceder(&self) -> bool {
        self.is_conceder
    }

    pub fn is_micro_style(&self) -> bool {
        self.is_micro_style
    }

    pub fn is_tft_style(&self) -> bool {
        self.is_tft_style
    }

    pub fn concession_rate(&self) -> f64 {
        self.concession_rate
    }
}
