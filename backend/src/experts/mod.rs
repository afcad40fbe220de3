//! Expert pool
//!
//! Five bidding experts, each with its own concession behaviour, share one
//! interface: propose a counter-offer and vote on a received offer. The
//! roster is fixed, so the pool is a closed enum rather than a trait object.
//!
//! Experts are pure with respect to their inputs except for their own
//! seeded random stream (used only for tie-breaking among candidates) and
//! small per-expert counters.

pub mod boulware;
pub mod deal_seeker;
pub mod forecast;
pub mod pareto;
pub mod reciprocal;
pub mod search;

pub use boulware::BoulwareExpert;
pub use deal_seeker::DealSeekerExpert;
pub use forecast::ForecastExpert;
pub use pareto::ParetoExpert;
pub use reciprocal::ReciprocalExpert;
pub use search::target_utility;

use crate::models::{Outcome, OutcomeCatalog, RoundState};
use crate::opponent::OpponentModel;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an expert in the pool, in pool order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpertKind {
    Boulware,
    Pareto,
    Reciprocal,
    Forecast,
    DealSeeker,
}

impl ExpertKind {
    /// Pool order. Indices into the meta-controller's tables follow it.
    pub const ALL: [ExpertKind; 5] = [
        ExpertKind::Boulware,
        ExpertKind::Pareto,
        ExpertKind::Reciprocal,
        ExpertKind::Forecast,
        ExpertKind::DealSeeker,
    ];

    pub fn index(self) -> usize {
        match self {
            ExpertKind::Boulware => 0,
            ExpertKind::Pareto => 1,
            ExpertKind::Reciprocal => 2,
            ExpertKind::Forecast => 3,
            ExpertKind::DealSeeker => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ExpertKind::Boulware => "boulware",
            ExpertKind::Pareto => "pareto",
            ExpertKind::Reciprocal => "reciprocal",
            ExpertKind::Forecast => "forecast",
            ExpertKind::DealSeeker => "deal_seeker",
        }
    }
}

impl fmt::Display for ExpertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tunable expert parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpertParams {
    /// Boulware concession exponent
    pub boulware_e: f64,
    /// Pareto concession exponent
    pub pareto_e: f64,
    /// Pareto opponent weight at t = 0
    pub pareto_alpha: f64,
    /// Reciprocal multiplier on the opponent's concession fraction
    pub reciprocal_match_factor: f64,
    /// Forecast base concession exponent
    pub forecast_base_e: f64,
    /// Normalized time at which the deal seeker starts conceding
    pub deal_seeker_start: f64,
}

impl Default for ExpertParams {
    fn default() -> Self {
        Self {
            boulware_e: 0.08,
            pareto_e: 0.10,
            pareto_alpha: 0.30,
            reciprocal_match_factor: 1.1,
            forecast_base_e: 0.10,
            deal_seeker_start: 0.82,
        }
    }
}

/// One expert of the pool.
#[derive(Debug, Clone, PartialEq)]
pub enum Expert {
    Boulware(BoulwareExpert),
    Pareto(ParetoExpert),
    Reciprocal(ReciprocalExpert),
    Forecast(ForecastExpert),
    DealSeeker(DealSeekerExpert),
}

impl Expert {
    /// Build the full pool in [`ExpertKind::ALL`] order.
    ///
    /// Each expert gets an independent random stream derived from `seed`.
    pub fn pool(params: &ExpertParams, seed: u64) -> Vec<Expert> {
        ExpertKind::ALL
            .iter()
            .map(|&kind| Expert::new(kind, params, RngManager::derive(seed, kind.index() as u64)))
            .collect()
    }

    pub fn new(kind: ExpertKind, params: &ExpertParams, rng: RngManager) -> Self {
        match kind {
            ExpertKind::Boulware => Expert::Boulware(BoulwareExpert::new(params.boulware_e, rng)),
            ExpertKind::Pareto => {
                Expert::Pareto(ParetoExpert::new(params.pareto_e, params.pareto_alpha, rng))
            }
            ExpertKind::Reciprocal => {
                Expert::Reciprocal(ReciprocalExpert::new(params.reciprocal_match_factor, rng))
            }
            ExpertKind::Forecast => Expert::Forecast(ForecastExpert::new(params.forecast_base_e, rng)),
            ExpertKind::DealSeeker => {
                Expert::DealSeeker(DealSeekerExpert::new(params.deal_seeker_start, rng))
            }
        }
    }

    pub fn kind(&self) -> ExpertKind {
        match self {
            Expert::Boulware(_) => ExpertKind::Boulware,
            Expert::Pareto(_) => ExpertKind::Pareto,
            Expert::Reciprocal(_) => ExpertKind::Reciprocal,
            Expert::Forecast(_) => ExpertKind::Forecast,
            Expert::DealSeeker(_) => ExpertKind::DealSeeker,
        }
    }

    /// Counter-offer for this round. Always a catalog outcome.
    pub fn propose(
        &mut self,
        catalog: &OutcomeCatalog,
        opponent: &OpponentModel,
        state: &RoundState<'_>,
    ) -> Outcome {
        match self {
            Expert::Boulware(e) => e.propose(catalog, opponent, state),
            Expert::Pareto(e) => e.propose(catalog, opponent, state),
            Expert::Reciprocal(e) => e.propose(catalog, opponent, state),
            Expert::Forecast(e) => e.propose(catalog, opponent, state),
            Expert::DealSeeker(e) => e.propose(catalog, opponent, state),
        }
    }

    /// Vote on `offer`. Advisory only; the acceptance controller decides.
    pub fn should_accept(
        &self,
        offer: &Outcome,
        catalog: &OutcomeCatalog,
        opponent: &OpponentModel,
        state: &RoundState<'_>,
    ) -> bool {
        match self {
            Expert::Boulware(e) => e.should_accept(offer, catalog, state),
            Expert::Pareto(e) => e.should_accept(offer, catalog, state),
            Expert::Reciprocal(e) => e.should_accept(offer, catalog, opponent, state),
            Expert::Forecast(e) => e.should_accept(offer, catalog, opponent, state),
            Expert::DealSeeker(e) => e.should_accept(offer, catalog, state),
        }
    }
}
