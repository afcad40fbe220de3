//! Reference opponents
//!
//! Simple, well-understood strategies used to exercise the agent in tests
//! and host-side tournaments. All implement [`Negotiator`].

pub mod micro;
pub mod tit_for_tat;
pub mod time_based;

pub use micro::MicroNegotiator;
pub use tit_for_tat::TitForTatNegotiator;
pub use time_based::TimeBasedNegotiator;

use crate::models::{Outcome, OutcomeCatalog, UtilityFunction};
use crate::orchestrator::NegotiationError;

/// Reservation assumed when the utility function carries none.
pub const DEFAULT_RESERVATION: f64 = 0.1;

/// Sorted outcomes plus the utility function for off-catalog offers.
#[derive(Debug, Clone)]
pub(crate) struct Ledger<U> {
    utility: U,
    catalog: OutcomeCatalog,
    reservation: f64,
}

impl<U: UtilityFunction> Ledger<U> {
    pub(crate) fn new(utility: U, outcomes: Vec<Outcome>) -> Result<Self, NegotiationError> {
        let catalog = OutcomeCatalog::build(outcomes, &utility)?;
        let reservation = utility
            .reserved_value()
            .filter(|r| r.is_finite())
            .unwrap_or(DEFAULT_RESERVATION);
        Ok(Self {
            utility,
            catalog,
            reservation,
        })
    }

    pub(crate) fn catalog(&self) -> &OutcomeCatalog {
        &self.catalog
    }

    pub(crate) fn reservation(&self) -> f64 {
        self.reservation
    }

    /// Our utility of `offer`, `None` if it cannot be computed.
    pub(crate) fn utility_of(&mut self, offer: &Outcome) -> Option<f64> {
        match self.catalog.ensure(offer, &self.utility) {
            Ok(u) => Some(u),
            Err(e) => {
                tracing::warn!(error = %e, "baseline could not evaluate offer");
                None
            }
        }
    }

    /// Lowest-utility outcome at or above `target`, else the best outcome.
    pub(crate) fn lowest_clearing(&self, target: f64) -> &Outcome {
        self.catalog
            .lowest_at_or_above(target)
            .unwrap_or_else(|| self.catalog.best())
    }
}
