//! Orchestrator scenario tests
//!
//! Drives the full per-round pipeline with scripted opponents and with the
//! reference negotiators.

mod common;

use common::{agent, feed_offers, opponent_utility, outcomes_5x3, run_session, self_utility, utility_of, Action};
use negotiation_core_rs::baselines::{MicroNegotiator, TimeBasedNegotiator, TitForTatNegotiator};
use negotiation_core_rs::models::{Issue, OutcomeSpace};
use negotiation_core_rs::{
    AgentConfig, ExpertKind, NegotiationError, NegotiationEvent, Negotiator, Orchestrator, Outcome, Response,
    UtilityError, UtilityFunction, Value,
};

/// Utility that fails on outcomes whose first issue is 2.
struct Flaky;

impl UtilityFunction for Flaky {
    fn utility(&self, outcome: &Outcome) -> Result<f64, UtilityError> {
        if outcome.get(0) == Some(&Value::Int(2)) {
            return Err(UtilityError::Evaluation {
                outcome: outcome.to_string(),
                message: "scoring service unavailable".to_string(),
            });
        }
        self_utility().utility(outcome)
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_a_stalemate_detected_by_round_eight() {
    let mut agent = agent(AgentConfig::default(), 0.1);
    let mut offers: Vec<Outcome> = [[0, 0], [1, 0], [0, 1], [2, 0]]
        .iter()
        .map(|v| Outcome::from_ints(v))
        .collect();
    offers.extend(std::iter::repeat(Outcome::from_ints(&[1, 1])).take(4));

    feed_offers(&mut agent, &offers, |round| round as f64 / 100.0);

    assert_eq!(agent.opponent().num_offers(), 8);
    assert!(agent.opponent().is_stalemate());
}

#[test]
fn test_scenario_b_offer_between_reservation_and_floor_is_rejected() {
    let mut agent = agent(AgentConfig::default(), 0.2);
    assert!((agent.bounds().min_util - 0.35).abs() < 1e-12);
    assert_eq!(agent.bounds().max_util, 1.0);

    // (0, 1) is worth 0.25 to us
    let offer = Outcome::from_ints(&[0, 1]);
    for round in 1..=20 {
        let t = 0.9 + round as f64 * 0.005;
        assert_eq!(agent.respond(Some(&offer), t, round), Response::Reject);
        agent.propose(t, round);
    }
}

#[test]
fn test_scenario_c_last_gasp_offer_is_accepted() {
    let mut agent = agent(AgentConfig::default(), 0.1);
    // (3, 0) is worth 0.40 to us
    let offer = Outcome::from_ints(&[3, 0]);

    let responses = feed_offers(&mut agent, &[offer.clone(), offer.clone(), offer], |_| 0.99);
    assert_eq!(responses[0].0, Response::Reject);
    assert_eq!(responses[1].0, Response::Reject);
    assert_eq!(responses[2].0, Response::Accept);
}

#[test]
fn test_scenario_d_unique_stepping_opponent_gets_reciprocal_expert() {
    let mut agent = agent(AgentConfig::default(), 0.1);
    let offers: Vec<Outcome> = outcomes_5x3().into_iter().take(10).collect();
    feed_offers(&mut agent, &offers, |round| round as f64 / 40.0);

    let style = agent.opponent().style_features();
    assert_eq!(style.unique_ratio, 1.0);
    assert!(style.is_micro_style);
    assert!(!style.is_hardheaded);

    agent.respond(Some(&Outcome::from_ints(&[4, 0])), 0.3, 11);
    assert_eq!(agent.meta().active(), ExpertKind::Reciprocal);
}

// ============================================================================
// Pipeline behaviour
// ============================================================================

#[test]
fn test_every_round_logs_one_selection_and_one_proposal() {
    let mut agent = agent(AgentConfig::default(), 0.1);
    let offers: Vec<Outcome> = (0..6).map(|i| Outcome::from_ints(&[i % 2, 0])).collect();
    feed_offers(&mut agent, &offers, |round| round as f64 / 50.0);

    let log = agent.event_log();
    assert_eq!(log.events_of_type("OfferReceived").len(), 6);
    assert_eq!(log.events_of_type("ExpertSelected").len(), 6);
    assert_eq!(log.events_of_type("Proposed").len(), 6);
    assert_eq!(log.events_of_type("AcceptanceDecision").len(), 6);
}

#[test]
fn test_proposals_respect_the_floor_throughout() {
    let mut agent = agent(AgentConfig::default(), 0.1);
    let floor = agent.bounds().hard_floor();
    let offers: Vec<Outcome> = (0..40).map(|i| Outcome::from_ints(&[i % 3, 0])).collect();
    let results = feed_offers(&mut agent, &offers, |round| round as f64 / 40.0);

    for (_, counter) in results {
        assert!(utility_of(&counter) >= floor - 1e-12, "{} below floor", counter);
    }
}

#[test]
fn test_unknown_offer_is_appended_to_catalog() {
    let mut agent = agent(AgentConfig::default(), 0.1);
    let before = agent.catalog().len();
    // Outcome with a value the domain never enumerated
    let stranger = Outcome::new(vec![Value::Int(4), Value::Text("bonus".to_string())]);
    agent.respond(Some(&stranger), 0.1, 1);
    assert_eq!(agent.catalog().len(), before + 1);
    assert_eq!(agent.catalog().utility(&stranger), Some(0.5));
}

#[test]
fn test_failing_utility_falls_back_safely() {
    let mut agent = Orchestrator::new(AgentConfig::default(), Flaky, Some(0.1), outcomes_5x3()).unwrap();
    // Outcomes with issue 0 = 2 never made it into the catalog
    assert_eq!(agent.catalog().len(), 12);

    let unscorable = Outcome::from_ints(&[2, 2]);
    for round in 1..=5 {
        let t = round as f64 / 5.0;
        assert_eq!(agent.respond(Some(&unscorable), t, round), Response::Reject);
        let counter = agent.propose(t, round);
        assert!(agent.catalog().contains(&counter));
    }

    let fallbacks = agent.event_log().events_of_type("FallbackUsed");
    assert_eq!(fallbacks.len(), 5);
    assert!(matches!(
        agent.event_log().events_of_type("OfferReceived")[0],
        NegotiationEvent::OfferReceived { utility: None, .. }
    ));
}

#[test]
fn test_construction_errors() {
    let always_fails = |_: &Outcome| f64::NAN;
    let err = Orchestrator::new(AgentConfig::default(), always_fails, None, outcomes_5x3()).unwrap_err();
    assert_eq!(err, NegotiationError::NoValidOutcomes { attempted: 15 });

    let err = Orchestrator::new(AgentConfig::default(), self_utility(), None, Vec::new()).unwrap_err();
    assert_eq!(err, NegotiationError::EmptyOutcomeSpace);

    let err = Orchestrator::new(
        AgentConfig {
            final_threshold: 0.95,
            ..AgentConfig::default()
        },
        self_utility(),
        None,
        outcomes_5x3(),
    )
    .unwrap_err();
    assert!(matches!(err, NegotiationError::Config(_)));
}

#[test]
fn test_reservation_falls_back_to_utility_then_config() {
    let from_utility = Orchestrator::new(
        AgentConfig::default(),
        self_utility().with_reserved_value(0.6),
        None,
        outcomes_5x3(),
    )
    .unwrap();
    assert_eq!(from_utility.bounds().reservation, 0.6);
    assert_eq!(from_utility.bounds().min_util, 0.6);

    let from_config = Orchestrator::new(
        AgentConfig {
            reservation: 0.4,
            ..AgentConfig::default()
        },
        self_utility(),
        None,
        outcomes_5x3(),
    )
    .unwrap();
    assert_eq!(from_config.bounds().reservation, 0.4);
}

#[test]
fn test_high_floor_profile_raises_min_util() {
    let agent = agent(AgentConfig::high_floor(), 0.1);
    assert!((agent.bounds().min_util - 0.55).abs() < 1e-12);
}

#[test]
fn test_from_space_enumerates_small_domains() {
    let space = OutcomeSpace::new(vec![Issue::with_int_values("price", 5), Issue::with_int_values("delivery", 3)]);
    let agent = Orchestrator::from_space(AgentConfig::default(), self_utility(), Some(0.1), &space).unwrap();
    assert_eq!(agent.catalog().len(), 15);
    assert_eq!(agent.catalog().best(), &Outcome::from_ints(&[4, 2]));
}

// ============================================================================
// Sessions against reference negotiators
// ============================================================================

fn check_session(session: &common::Session, floor: f64) {
    for action in &session.actions {
        if let Action::Offer { by: 0, outcome, .. } = action {
            assert!(utility_of(outcome) >= floor - 1e-12, "offered {} below floor", outcome);
        }
    }
    if let Some(agreement) = &session.agreement {
        assert!(utility_of(agreement) >= floor - 1e-12, "agreed on {} below floor", agreement);
    }
}

#[test]
fn test_session_against_time_based() {
    let mut hybrid = agent(AgentConfig::default(), 0.1);
    let floor = hybrid.bounds().hard_floor();
    let mut opponent = TimeBasedNegotiator::new(opponent_utility(), outcomes_5x3(), 5).unwrap();

    let session = run_session(&mut hybrid, &mut opponent, 60);
    check_session(&session, floor);
    assert_eq!(hybrid.name(), "hybrid");
}

#[test]
fn test_session_against_micro() {
    let mut hybrid = agent(AgentConfig::default(), 0.1);
    let floor = hybrid.bounds().hard_floor();
    let mut opponent = MicroNegotiator::new(opponent_utility(), outcomes_5x3()).unwrap();

    let session = run_session(&mut hybrid, &mut opponent, 60);
    check_session(&session, floor);
}

#[test]
fn test_session_against_tit_for_tat() {
    let mut hybrid = agent(AgentConfig::default(), 0.1);
    let floor = hybrid.bounds().hard_floor();
    let mut opponent = TitForTatNegotiator::new(opponent_utility(), outcomes_5x3()).unwrap();

    let session = run_session(&mut opponent, &mut hybrid, 60);
    // Hybrid is the second party here
    for action in &session.actions {
        if let Action::Offer { by: 1, outcome, .. } = action {
            assert!(utility_of(outcome) >= floor - 1e-12);
        }
    }
    if let Some(agreement) = &session.agreement {
        assert!(utility_of(agreement) >= floor - 1e-12);
    }
}

#[test]
fn test_repeated_calls_within_a_round_are_stable() {
    let mut agent = agent(AgentConfig::default(), 0.1);
    let offer = Outcome::from_ints(&[1, 1]);
    let first = agent.respond(Some(&offer), 0.2, 3);
    let counter = agent.propose(0.2, 3);
    assert_eq!(agent.respond(Some(&offer), 0.2, 3), first);
    assert_eq!(agent.propose(0.2, 3), counter);
    assert_eq!(agent.opponent().num_offers(), 1);
}
