//! Time-based Boulware opponent
//!
//! Aspiration `1 − (1 − reservation) · t^β` with β = 5: firm early, fast
//! concession late. Proposes a random not-yet-proposed outcome clearing the
//! aspiration.

use super::Ledger;
use crate::models::{Outcome, UtilityFunction};
use crate::orchestrator::{NegotiationError, Negotiator, Response};
use crate::rng::RngManager;
use std::collections::HashSet;

pub const DEFAULT_BETA: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct TimeBasedNegotiator<U> {
    ledger: Ledger<U>,
    beta: f64,
    rng: RngManager,
    proposed: HashSet<Outcome>,
    /// Accept anything at least as good as the best offer received once
    /// this time has passed
    backstop_time: Option<f64>,
    best_received: f64,
}

impl<U: UtilityFunction> TimeBasedNegotiator<U> {
    pub fn new(utility: U, outcomes: Vec<Outcome>, seed: u64) -> Result<Self, NegotiationError> {
        Ok(Self {
            ledger: Ledger::new(utility, outcomes)?,
            beta: DEFAULT_BETA,
            rng: RngManager::new(seed),
            proposed: HashSet::new(),
            backstop_time: None,
            best_received: 0.0,
        })
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_backstop(mut self, time: f64) -> Self {
        self.backstop_time = Some(time);
        self
    }

    pub fn aspiration(&self, t: f64) -> f64 {
        let reservation = self.ledger.reservation();
        (1.0 - (1.0 - reservation) * t.clamp(0.0, 1.0).powf(self.beta)).max(reservation)
    }
}

impl<U: UtilityFunction> Negotiator for TimeBasedNegotiator<U> {
    fn respond(&mut self, offer: Option<&Outcome>, time: f64, _round: usize) -> Response {
        let Some(offer) = offer else {
            return Response::Reject;
        };
        let Some(u) = self.ledger.utility_of(offer) else {
            return Response::Reject;
        };
        let backstop = self
            .backstop_time
            .map_or(false, |start| time >= start && u >= self.best_received && u >= self.ledger.reservation());
        self.best_received = self.best_received.max(u);

        if u >= self.aspiration(time) || backstop {
            Response::Accept
        } else {
            Response::Reject
        }
    }

    fn propose(&mut self, time: f64, _round: usize) -> Outcome {
        let aspiration = self.aspiration(time);
        let catalog = self.ledger.catalog();
        let fresh: Vec<&Outcome> = catalog
            .sorted()
            .iter()
            .take_while(|o| catalog.utility(o).unwrap_or(0.0) >= aspiration)
            .filter(|o| !self.proposed.contains(*o))
            .collect();

        let proposal = if fresh.is_empty() {
            self.ledger.lowest_clearing(aspiration).clone()
        } else {
            fresh[self.rng.pick_index(fresh.len())].clone()
        };
        self.proposed.insert(proposal.clone());
        proposal
    }

    fn name(&self) -> &str {
        "time_based"
    }
}
