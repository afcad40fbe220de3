//! Hand-tuned score tables for expert selection
//!
//! Scores are indexed in [`ExpertKind::ALL`] order:
//! `[boulware, pareto, reciprocal, forecast, deal_seeker]`.

use crate::core::time::Phase;
use crate::experts::ExpertKind;
use crate::opponent::StyleFeatures;

pub const NUM_EXPERTS: usize = ExpertKind::ALL.len();

const B: usize = 0;
const P: usize = 1;
const R: usize = 2;
const F: usize = 3;
const D: usize = 4;

/// Phase prior: hold ground early, adapt mid-session, close deals late.
pub fn phase_prior(phase: Phase) -> [f64; NUM_EXPERTS] {
    match phase {
        Phase::Opening => [3.0, 0.5, 1.5, 0.8, 0.0],
        Phase::Early => [2.5, 0.8, 1.5, 1.2, 0.0],
        Phase::MidEarly => [2.0, 1.2, 1.5, 2.0, 0.0],
        Phase::Mid => [1.5, 1.5, 1.5, 2.5, 0.3],
        Phase::MidLate => [0.8, 1.5, 1.2, 2.0, 2.0],
        Phase::Late => [0.3, 1.0, 0.8, 1.5, 3.5],
    }
}

/// Additive score adjustment from the opponent's style.
///
/// All zeros until the classification is confident.
pub fn style_adjustment(features: &StyleFeatures, t: f64) -> [f64; NUM_EXPERTS] {
    let mut adj = [0.0; NUM_EXPERTS];
    if !features.is_confident() {
        return adj;
    }

    if features.is_reciprocal() {
        adj[R] += 2.5;
        adj[B] -= 1.0;
        adj[F] += 0.5;
    } else if features.is_hardheaded {
        adj[B] -= 0.5;
        adj[P] += 0.5;
        adj[F] += 1.5;
        if t > 0.7 {
            adj[D] += 1.0;
        }
    } else if features.is_conceder {
        adj[B] += 1.5;
        adj[R] -= 0.5;
        adj[P] -= 0.5;
    }

    if features.is_stalemate {
        adj[R] += 1.5;
        adj[D] += 1.5;
        adj[B] -= 1.5;
    }

    if features.reciprocity > 0.6 {
        adj[R] += 0.8;
    }

    if features.concession_rate > 0.15 {
        adj[B] += 0.5;
    } else if features.concession_rate < -0.05 {
        adj[F] += 0.5;
    }
    adj
}
