//! Property-based tests with proptest
//!
//! Safety invariants that must hold for every opponent behaviour, seed and
//! reservation value.

mod common;

use common::{agent, outcomes_5x3, utility_of};
use negotiation_core_rs::core::time::normalize_time;
use negotiation_core_rs::experts::target_utility;
use negotiation_core_rs::{AgentConfig, OpponentModel, Outcome, Response};
use proptest::prelude::*;

fn config(seed: u64) -> AgentConfig {
    AgentConfig {
        rng_seed: seed,
        ..AgentConfig::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_never_accepts_below_hard_floor(
        seed in any::<u64>(),
        reservation in 0.0f64..1.0,
        picks in prop::collection::vec(0usize..15, 1..60),
    ) {
        let outcomes = outcomes_5x3();
        let mut agent = agent(config(seed), reservation);
        let floor = reservation.max(agent.bounds().min_util);

        for (i, pick) in picks.iter().enumerate() {
            let round = i + 1;
            let t = round as f64 / picks.len() as f64;
            let offer = &outcomes[*pick];
            if agent.respond(Some(offer), t, round) == Response::Accept {
                prop_assert!(utility_of(offer) >= floor - 1e-12);
                break;
            }
            agent.propose(t, round);
        }
    }

    #[test]
    fn prop_proposals_clear_floor_or_are_best(
        seed in any::<u64>(),
        reservation in 0.0f64..1.0,
        picks in prop::collection::vec(0usize..15, 1..60),
    ) {
        let outcomes = outcomes_5x3();
        let mut agent = agent(config(seed), reservation);
        let floor = agent.bounds().hard_floor();
        let best = agent.catalog().best().clone();
        let reachable = agent.catalog().max_utility() >= floor;

        for (i, pick) in picks.iter().enumerate() {
            let round = i + 1;
            let t = round as f64 / picks.len() as f64;
            agent.respond(Some(&outcomes[*pick]), t, round);
            let counter = agent.propose(t, round);
            if reachable {
                prop_assert!(utility_of(&counter) >= floor - 1e-12);
            } else {
                prop_assert_eq!(&counter, &best);
            }
        }
    }

    #[test]
    fn prop_predicted_utility_in_unit_range(
        offers in prop::collection::vec((0i64..8, 0i64..5), 1..50),
        probe in (0i64..8, 0i64..5),
    ) {
        let mut model = OpponentModel::new(&[5, 3]);
        for (i, (a, b)) in offers.iter().enumerate() {
            let offer = Outcome::from_ints(&[*a, *b]);
            model.update(&offer, i as f64 / offers.len() as f64);
            let u = model.get_predicted_utility(&offer);
            prop_assert!((0.0..=1.0).contains(&u));
        }
        let u = model.get_predicted_utility(&Outcome::from_ints(&[probe.0, probe.1]));
        prop_assert!((0.0..=1.0).contains(&u));
    }

    #[test]
    fn prop_boulware_target_non_increasing(
        e in 0.01f64..=1.0,
        min in 0.0f64..0.5,
        span in 0.0f64..0.5,
        t1 in 0.0f64..=1.0,
        t2 in 0.0f64..=1.0,
    ) {
        let max = min + span;
        let (early, late) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        let a = target_utility(early, e, min, max);
        let b = target_utility(late, e, min, max);
        prop_assert!(b <= a + 1e-12);
        prop_assert!(b >= min - 1e-12 && a <= max + 1e-12);
    }

    #[test]
    fn prop_normalized_time_in_unit_range(t in any::<f64>()) {
        let n = normalize_time(t);
        prop_assert!((0.0..=1.0).contains(&n));
    }
}
