//! MiCRO-style opponent
//!
//! Concedes exactly one step down its sorted outcome list for every new
//! (never seen before) opponent offer, and accepts anything at least as good
//! as its current step. Never concedes unilaterally.

use super::Ledger;
use crate::models::{Outcome, UtilityFunction};
use crate::orchestrator::{NegotiationError, Negotiator, Response};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct MicroNegotiator<U> {
    ledger: Ledger<U>,
    pointer: usize,
    seen: HashSet<Outcome>,
}

impl<U: UtilityFunction> MicroNegotiator<U> {
    pub fn new(utility: U, outcomes: Vec<Outcome>) -> Result<Self, NegotiationError> {
        Ok(Self {
            ledger: Ledger::new(utility, outcomes)?,
            pointer: 0,
            seen: HashSet::new(),
        })
    }

    /// Current step in the sorted outcome list
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    fn current(&self) -> &Outcome {
        let sorted = self.ledger.catalog().sorted();
        &sorted[self.pointer.min(sorted.len() - 1)]
    }
}

impl<U: UtilityFunction> Negotiator for MicroNegotiator<U> {
    fn respond(&mut self, offer: Option<&Outcome>, _time: f64, _round: usize) -> Response {
        let Some(offer) = offer else {
            return Response::Reject;
        };
        if self.seen.insert(offer.clone()) {
            self.pointer = (self.pointer + 1).min(self.ledger.catalog().len() - 1);
        }
        let Some(u) = self.ledger.utility_of(offer) else {
            return Response::Reject;
        };
        let target = self.ledger.catalog().utility(self.current()).unwrap_or(1.0);
        if u >= target {
            Response::Accept
        } else {
            Response::Reject
        }
    }

    fn propose(&mut self, _time: f64, _round: usize) -> Outcome {
        self.current().clone()
    }

    fn name(&self) -> &str {
        "micro"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;

    fn tenths(o: &Outcome) -> f64 {
        match o.get(0) {
            Some(Value::Int(v)) => *v as f64 / 10.0,
            _ => 0.0,
        }
    }

    #[test]
    fn test_concedes_one_step_per_new_offer() {
        let outcomes = (0..=10).map(|i| Outcome::from_ints(&[i])).collect();
        let mut n = MicroNegotiator::new(tenths, outcomes).unwrap();
        assert_eq!(n.propose(0.0, 0), Outcome::from_ints(&[10]));

        n.respond(Some(&Outcome::from_ints(&[1])), 0.1, 1);
        assert_eq!(n.propose(0.1, 1), Outcome::from_ints(&[9]));

        // Repeating an offer earns no concession
        n.respond(Some(&Outcome::from_ints(&[1])), 0.2, 2);
        assert_eq!(n.pointer(), 1);

        n.respond(Some(&Outcome::from_ints(&[2])), 0.3, 3);
        assert_eq!(n.propose(0.3, 3), Outcome::from_ints(&[8]));
    }

    #[test]
    fn test_accepts_at_or_above_current_step() {
        let outcomes = (0..=10).map(|i| Outcome::from_ints(&[i])).collect();
        let mut n = MicroNegotiator::new(tenths, outcomes).unwrap();
        assert_eq!(n.respond(Some(&Outcome::from_ints(&[9])), 0.1, 1), Response::Accept);
    }
}
