//! Tit-for-tat opponent
//!
//! Aspiration mirrors the best offer received: `1 − best_received`, never
//! below the reservation value. After t = 0.95 it panics and slides the
//! aspiration linearly down to the reservation value.

use super::Ledger;
use crate::models::{Outcome, UtilityFunction};
use crate::orchestrator::{NegotiationError, Negotiator, Response};

const PANIC_TIME: f64 = 0.95;

#[derive(Debug, Clone)]
pub struct TitForTatNegotiator<U> {
    ledger: Ledger<U>,
    best_received: f64,
}

impl<U: UtilityFunction> TitForTatNegotiator<U> {
    pub fn new(utility: U, outcomes: Vec<Outcome>) -> Result<Self, NegotiationError> {
        Ok(Self {
            ledger: Ledger::new(utility, outcomes)?,
            best_received: 0.0,
        })
    }

    pub fn aspiration(&self, t: f64) -> f64 {
        let reservation = self.ledger.reservation();
        let mut target = 1.0 - self.best_received;
        if t > PANIC_TIME {
            let panic = ((t - PANIC_TIME) / (1.0 - PANIC_TIME)).min(1.0);
            target -= (target - reservation) * panic;
        }
        target.max(reservation)
    }
}

impl<U: UtilityFunction> Negotiator for TitForTatNegotiator<U> {
    fn respond(&mut self, offer: Option<&Outcome>, time: f64, _round: usize) -> Response {
        let Some(offer) = offer else {
            return Response::Reject;
        };
        let Some(u) = self.ledger.utility_of(offer) else {
            return Response::Reject;
        };
        self.best_received = self.best_received.max(u);
        if u >= self.aspiration(time) {
            Response::Accept
        } else {
            Response::Reject
        }
    }

    fn propose(&mut self, time: f64, _round: usize) -> Outcome {
        self.ledger.lowest_clearing(self.aspiration(time)).clone()
    }

    fn name(&self) -> &str {
        "tit_for_tat"
    }
}
