//! Shared fixtures for integration tests
//!
//! Provides a 5×3 two-issue domain and a minimal alternating-offers loop so
//! tests can drive negotiators the way a protocol engine would.

#![allow(dead_code)]

use negotiation_core_rs::{
    AgentConfig, LinearAdditiveUtility, Negotiator, Orchestrator, Outcome, Response,
};

/// Every outcome of the 5×3 domain, issue 0 outermost.
pub fn outcomes_5x3() -> Vec<Outcome> {
    let mut outcomes = Vec::with_capacity(15);
    for a in 0..5 {
        for b in 0..3 {
            outcomes.push(Outcome::from_ints(&[a, b]));
        }
    }
    outcomes
}

/// Our utility over the 5×3 domain: equal weights, max 1.0 at (4, 2), 0 at (0, 0).
///
/// Notable values: (0, 1) = 0.25, (3, 0) = 0.40, (1, 1) = 0.40.
pub fn self_utility() -> LinearAdditiveUtility {
    LinearAdditiveUtility::from_int_scores(
        vec![0.5, 0.5],
        vec![vec![0.0, 0.3, 0.5, 0.8, 1.0], vec![0.0, 0.5, 1.0]],
    )
}

/// Opponent's utility: the mirror image of ours.
pub fn opponent_utility() -> LinearAdditiveUtility {
    LinearAdditiveUtility::from_int_scores(
        vec![0.5, 0.5],
        vec![vec![1.0, 0.8, 0.5, 0.3, 0.0], vec![1.0, 0.5, 0.0]],
    )
}

pub fn utility_of(outcome: &Outcome) -> f64 {
    use negotiation_core_rs::UtilityFunction;
    self_utility().utility(outcome).unwrap_or(0.0)
}

/// Hybrid agent over the 5×3 domain.
pub fn agent(config: AgentConfig, reservation: f64) -> Orchestrator<LinearAdditiveUtility> {
    Orchestrator::new(config, self_utility(), Some(reservation), outcomes_5x3()).unwrap()
}

/// One action taken during a session.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Offer { by: usize, round: usize, outcome: Outcome },
    Accept { by: usize, round: usize },
}

/// Result of an alternating-offers session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub agreement: Option<Outcome>,
    pub actions: Vec<Action>,
}

/// Run an alternating-offers session; `first` opens.
///
/// Time is `round / rounds`, so the final round runs at just under 1.
pub fn run_session(first: &mut dyn Negotiator, second: &mut dyn Negotiator, rounds: usize) -> Session {
    let mut actions = Vec::new();
    let mut pending: Option<Outcome> = None;

    for round in 0..rounds {
        let t = round as f64 / rounds as f64;
        for by in 0..2 {
            let party: &mut dyn Negotiator = if by == 0 { &mut *first } else { &mut *second };
            if party.respond(pending.as_ref(), t, round) == Response::Accept {
                actions.push(Action::Accept { by, round });
                return Session {
                    agreement: pending,
                    actions,
                };
            }
            let outcome = party.propose(t, round);
            actions.push(Action::Offer {
                by,
                round,
                outcome: outcome.clone(),
            });
            pending = Some(outcome);
        }
    }

    Session {
        agreement: None,
        actions,
    }
}

/// Feed a fixed sequence of opponent offers, one per round, at `time(round)`.
pub fn feed_offers<U: negotiation_core_rs::UtilityFunction>(
    agent: &mut Orchestrator<U>,
    offers: &[Outcome],
    time: impl Fn(usize) -> f64,
) -> Vec<(Response, Outcome)> {
    offers
        .iter()
        .enumerate()
        .map(|(i, offer)| {
            let round = i + 1;
            let t = time(round);
            let response = agent.respond(Some(offer), t, round);
            let counter = agent.propose(t, round);
            (response, counter)
        })
        .collect()
}
