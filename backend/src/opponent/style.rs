//! Opponent style classification
//!
//! Style signals are derived from the series of estimated opponent
//! utilities of the opponent's own offers. They are recomputed after every
//! update once enough observations exist.

use serde::{Deserialize, Serialize};

/// Observations required before any style is asserted.
pub const MIN_STYLE_OBSERVATIONS: usize = 8;

/// |concession_rate| below this counts as not conceding.
pub const HARDHEADED_MAX_CONCESSION: f64 = 0.05;

/// concession_rate above this marks a conceder.
pub const CONCEDER_MIN_CONCESSION: f64 = 0.15;

/// unique/total ratio above this marks a many-unique-offers opponent.
pub const MANY_UNIQUE_RATIO: f64 = 0.8;

/// Sliding window used to judge whether offers change gradually.
pub const TFT_WINDOW: usize = 5;

/// Maximum deviation from the window average for "gradual" change.
pub const TFT_MAX_DEVIATION: f64 = 0.10;

/// Snapshot of the opponent's style signals, consumed by the experts and the
/// meta-controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleFeatures {
    pub num_offers: usize,
    pub unique_ratio: f64,
    /// Early minus late average estimated opponent utility; positive = conceding
    pub concession_rate: f64,
    pub is_hardheaded: bool,
    pub is_conceder: bool,
    /// Opponent rarely repeats itself (MiCRO-like stepping through outcomes)
    pub is_micro_style: bool,
    pub is_tft_style: bool,
    pub is_stalemate: bool,
    /// Fraction of our concessions followed by an opponent concession
    pub reciprocity: f64,
    pub current_threshold: f64,
}

impl StyleFeatures {
    /// True once enough offers exist for the classification to be trusted.
    pub fn is_confident(&self) -> bool {
        self.num_offers >= MIN_STYLE_OBSERVATIONS
    }

    /// Opponent that only concedes when matched.
    pub fn is_reciprocal(&self) -> bool {
        self.is_tft_style || self.is_micro_style
    }
}

/// Classification result for one pass over the utility series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Classification {
    pub concession_rate: f64,
    pub is_hardheaded: bool,
    pub is_conceder: bool,
    pub is_micro_style: bool,
    pub is_tft_style: bool,
}

/// Classify from the estimated-utility series and the uniqueness ratio.
///
/// Returns `None` below [`MIN_STYLE_OBSERVATIONS`].
pub(crate) fn classify(utilities: &[f64], unique_ratio: f64) -> Option<Classification> {
    let n = utilities.len();
    if n < MIN_STYLE_OBSERVATIONS {
        return None;
    }
    let third = (n / 3).max(1);
    let early = mean(&utilities[..third]);
    let late = mean(&utilities[n - third..]);
    let concession_rate = early - late;

    let is_micro_style = unique_ratio > MANY_UNIQUE_RATIO;
    let is_hardheaded = concession_rate.abs() < HARDHEADED_MAX_CONCESSION && !is_micro_style;
    let is_conceder = !is_hardheaded && concession_rate > CONCEDER_MIN_CONCESSION;

    let window = &utilities[n.saturating_sub(TFT_WINDOW)..];
    let window_avg = mean(window);
    let gradual = window
        .iter()
        .all(|u| (u - window_avg).abs() <= TFT_MAX_DEVIATION);
    let moderate = concession_rate > 0.01 && concession_rate <= CONCEDER_MIN_CONCESSION;
    let is_tft_style = gradual && moderate && unique_ratio >= 0.3;

    Some(Classification {
        concession_rate,
        is_hardheaded,
        is_conceder,
        is_micro_style,
        is_tft_style,
    })
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
