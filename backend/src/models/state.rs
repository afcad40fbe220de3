//! Per-round shared state
//!
//! `RoundState` is rebuilt by the orchestrator every round and passed by
//! reference to experts and the acceptance controller. It replaces any
//! string-keyed "shared state" with named, typed fields.

use super::catalog::OutcomeCatalog;
use super::outcome::Outcome;

/// Utility bounds derived once at initialization.
///
/// Invariants: `min_util ≥ reservation` always, and `0 ≤ min_util ≤ max_util ≤ 1`
/// whenever the reservation value is reachable. A reservation above every
/// outcome lifts the floor above `max_util`: nothing is acceptable then.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtilityBounds {
    /// Hard floor: nothing below this is ever proposed or accepted
    pub min_util: f64,
    /// Best achievable self-utility
    pub max_util: f64,
    /// Walk-away value
    pub reservation: f64,
}

impl UtilityBounds {
    /// Derive bounds from the catalog extremes.
    ///
    /// `min_util = max(fraction · max_util, reservation, raw_min)`.
    pub fn derive(max_util: f64, raw_min: f64, reservation: f64, hard_floor_fraction: f64) -> Self {
        let max_util = max_util.clamp(0.0, 1.0);
        let reservation = if reservation.is_finite() {
            reservation.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let min_util = (hard_floor_fraction * max_util)
            .max(raw_min.min(max_util))
            .max(reservation);
        Self {
            min_util,
            max_util,
            reservation,
        }
    }

    /// The stricter of the two absolute gates.
    pub fn hard_floor(&self) -> f64 {
        self.min_util.max(self.reservation)
    }
}

/// Transient view of one negotiation round.
#[derive(Debug, Clone)]
pub struct RoundState<'a> {
    /// Normalized time in `[0, 1]`
    pub time: f64,
    /// Number of opponent offers observed so far
    pub round: usize,
    pub bounds: UtilityBounds,
    pub best_received: Option<&'a Outcome>,
    pub best_received_util: f64,
    pub last_received: Option<&'a Outcome>,
    pub last_received_util: f64,
    /// Counter-offer the active expert plans to send if we reject
    pub planned_counter: Option<&'a Outcome>,
    pub last_proposed_util: f64,
    pub is_stalemate: bool,
    pub catalog: &'a OutcomeCatalog,
}

impl<'a> RoundState<'a> {
    pub fn min_util(&self) -> f64 {
        self.bounds.min_util
    }

    pub fn max_util(&self) -> f64 {
        self.bounds.max_util
    }

    pub fn reservation(&self) -> f64 {
        self.bounds.reservation
    }
}
