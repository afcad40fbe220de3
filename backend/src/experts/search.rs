//! Candidate search shared by all experts
//!
//! Outcomes are always drawn from the catalog's descending-utility list. A
//! search first tries a narrow window around the target, widens to the best
//! outcomes clearing the target, and finally falls back to the single best
//! outcome, so a search never comes back empty.

use crate::models::{Outcome, OutcomeCatalog};
use crate::opponent::OpponentModel;
use crate::rng::RngManager;

/// Opponent offers needed before experts trust the opponent model for
/// tie-breaking.
pub const MIN_OFFERS_FOR_OPPONENT_SCORING: usize = 4;

/// Time-dependent aspiration `min + (max − min) · (1 − t^(1/e))`.
///
/// `e < 1` concedes slowly (Boulware), `e = 1` linearly, `e > 1` fast.
/// A non-positive exponent never concedes.
///
/// # Example
/// ```
/// use negotiation_core_rs::experts::target_utility;
///
/// assert_eq!(target_utility(0.0, 0.1, 0.4, 1.0), 1.0);
/// assert!((target_utility(1.0, 0.1, 0.4, 1.0) - 0.4).abs() < 1e-12);
/// ```
pub fn target_utility(t: f64, e: f64, min_util: f64, max_util: f64) -> f64 {
    if e <= 0.0 {
        return max_util;
    }
    let t = crate::core::time::normalize_time(t);
    let ft = (1.0 - t.powf(1.0 / e)).clamp(0.0, 1.0);
    min_util + (max_util - min_util) * ft
}

/// Outcomes with utility in `[target − tolerance, target + tolerance]`.
pub fn outcomes_in_window(catalog: &OutcomeCatalog, target: f64, tolerance: f64) -> Vec<&Outcome> {
    let lower = target - tolerance;
    let upper = target + tolerance;
    let mut found = Vec::new();
    for outcome in catalog.sorted() {
        let u = utility_of(catalog, outcome);
        if u < lower {
            break;
        }
        if u <= upper {
            found.push(outcome);
        }
    }
    found
}

/// The best (at most `limit`) outcomes with utility at least `target`.
pub fn outcomes_at_or_above(catalog: &OutcomeCatalog, target: f64, limit: usize) -> Vec<&Outcome> {
    catalog
        .sorted()
        .iter()
        .take_while(|o| utility_of(catalog, o) >= target)
        .take(limit)
        .collect()
}

/// Window search, widening to the top outcomes above target, then to the
/// best outcome. Never empty.
pub fn candidate_search(
    catalog: &OutcomeCatalog,
    target: f64,
    tolerance: f64,
    widen_limit: usize,
) -> Vec<&Outcome> {
    let mut candidates = outcomes_in_window(catalog, target, tolerance);
    if candidates.is_empty() {
        candidates = outcomes_at_or_above(catalog, target, widen_limit);
    }
    if candidates.is_empty() {
        candidates.push(catalog.best());
    }
    candidates
}

/// Candidate maximizing `(1 − α) · self + α · opponent`; first wins ties.
pub fn pick_best_for_opponent<'c>(
    candidates: &[&'c Outcome],
    catalog: &OutcomeCatalog,
    opponent: &OpponentModel,
    alpha: f64,
) -> Option<&'c Outcome> {
    let mut best: Option<(&'c Outcome, f64)> = None;
    for &outcome in candidates {
        let score = (1.0 - alpha) * utility_of(catalog, outcome)
            + alpha * opponent.get_predicted_utility(outcome);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((outcome, score)),
        }
    }
    best.map(|(o, _)| o)
}

/// Uniformly random candidate.
pub fn pick_random<'c>(candidates: &[&'c Outcome], rng: &mut RngManager) -> Option<&'c Outcome> {
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.pick_index(candidates.len())])
}

/// Score by the opponent model when it has enough data, otherwise break the
/// tie randomly. Falls back to the catalog's best outcome.
pub fn choose(
    candidates: &[&Outcome],
    catalog: &OutcomeCatalog,
    opponent: &OpponentModel,
    alpha: f64,
    rng: &mut RngManager,
) -> Outcome {
    let picked = if opponent.num_offers() >= MIN_OFFERS_FOR_OPPONENT_SCORING && candidates.len() > 1 {
        pick_best_for_opponent(candidates, catalog, opponent, alpha)
    } else {
        pick_random(candidates, rng)
    };
    picked.unwrap_or_else(|| catalog.best()).clone()
}

/// Utility of a catalog outcome; 0 for outcomes the catalog never saw.
pub fn utility_of(catalog: &OutcomeCatalog, outcome: &Outcome) -> f64 {
    catalog.utility(outcome).unwrap_or(0.0)
}
