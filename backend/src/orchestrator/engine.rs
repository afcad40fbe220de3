//! Orchestrator - per-round negotiation control loop
//!
//! One orchestrator serves exactly one negotiation. Each logical round:
//!
//! 1. Record the opponent offer (once per `(round, offer)` appearance)
//! 2. Select the active expert (once per round)
//! 3. Have it propose a counter-offer and verify it against the hard floor
//! 4. Run the acceptance chain with the verified counter as reference
//! 5. Accept, or send the verified counter-offer
//! 6. Feed the achieved utility back to the meta-controller
//!
//! # Error Handling
//!
//! Construction may fail (bad config, empty outcome space, a utility function
//! failing everywhere). After that, `respond` and `propose` never fail:
//! errors are logged as [`NegotiationEvent::FallbackUsed`] and turned into
//! a deterministic fallback (reject, propose the best-known outcome).

use super::config::{AgentConfig, ConfigError};
use super::negotiator::{Negotiator, Response};
use crate::acceptance::{AcceptDecision, AcceptRule, AcceptanceController, AcceptanceInput};
use crate::core::time::normalize_time;
use crate::experts::ExpertKind;
use crate::meta::MetaController;
use crate::models::{
    values_per_issue, CatalogError, EventLog, NegotiationEvent, Outcome, OutcomeCatalog, OutcomeSpace,
    RoundState, UtilityBounds, UtilityError, UtilityFunction,
};
use crate::opponent::OpponentModel;
use crate::rng::RngManager;
use thiserror::Error;

/// Random stream used for outcome sampling; experts use streams 0..5.
const SAMPLING_STREAM: u64 = 1_000;

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while setting up a negotiation
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NegotiationError {
    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error("Utility error: {0}")]
    Utility(#[from] UtilityError),

    #[error("Outcome space is empty")]
    EmptyOutcomeSpace,

    #[error("Utility could not be computed for any of {attempted} outcomes")]
    NoValidOutcomes { attempted: usize },
}

impl From<CatalogError> for NegotiationError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::EmptyOutcomeSpace => NegotiationError::EmptyOutcomeSpace,
            CatalogError::NoValidOutcomes { attempted } => NegotiationError::NoValidOutcomes { attempted },
        }
    }
}

// ============================================================================
// Bootstrap
// ============================================================================

/// Everything derived once before the first round.
///
/// Pure in its inputs: initializing twice from the same config, utility,
/// reservation and outcomes yields an identical value.
#[derive(Debug, Clone, PartialEq)]
pub struct Bootstrap {
    pub catalog: OutcomeCatalog,
    pub bounds: UtilityBounds,
    /// Distinct values per issue, sizing the opponent model
    pub values_per_issue: Vec<usize>,
    /// Lowest catalog utility at initialization
    pub raw_min: f64,
}

impl Bootstrap {
    /// Materialize the catalog and derive the utility bounds.
    ///
    /// Outcome lists longer than `config.max_cardinality` are sampled down
    /// with the configured seed.
    ///
    /// # Errors
    ///
    /// * `NegotiationError::Config` - config out of range
    /// * `NegotiationError::EmptyOutcomeSpace` - no outcomes supplied
    /// * `NegotiationError::NoValidOutcomes` - utility failed on every outcome
    pub fn initialize<U: UtilityFunction + ?Sized>(
        config: &AgentConfig,
        utility: &U,
        reservation: f64,
        outcomes: Vec<Outcome>,
    ) -> Result<Self, NegotiationError> {
        config.validate()?;
        if outcomes.is_empty() {
            return Err(NegotiationError::EmptyOutcomeSpace);
        }

        let mut rng = RngManager::derive(config.rng_seed, SAMPLING_STREAM);
        let outcomes = bound_outcomes(outcomes, config.max_cardinality, &mut rng);
        let values_per_issue = values_per_issue(&outcomes);
        let catalog = OutcomeCatalog::build(outcomes, utility)?;
        let raw_min = catalog.min_utility();
        let bounds = UtilityBounds::derive(catalog.max_utility(), raw_min, reservation, config.hard_floor_fraction);

        Ok(Self {
            catalog,
            bounds,
            values_per_issue,
            raw_min,
        })
    }
}

/// Keep at most `max` outcomes, chosen by a seeded partial shuffle.
fn bound_outcomes(mut outcomes: Vec<Outcome>, max: usize, rng: &mut RngManager) -> Vec<Outcome> {
    if outcomes.len() <= max {
        return outcomes;
    }
    let len = outcomes.len();
    for i in 0..max {
        let j = i + rng.pick_index(len - i);
        outcomes.swap(i, j);
    }
    outcomes.truncate(max);
    outcomes
}

// ============================================================================
// Round bookkeeping
// ============================================================================

/// Identifies one logical round: the host's counter plus the number of
/// opponent offers seen, so a new offer always opens a new round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlanKey {
    round: usize,
    offers: usize,
}

/// Verified counter-offer of the active expert for one round
#[derive(Debug, Clone, PartialEq)]
struct Plan {
    key: PlanKey,
    expert: ExpertKind,
    outcome: Outcome,
    utility: f64,
}

#[derive(Debug, Clone, Default)]
struct History {
    best_received: Option<(Outcome, f64)>,
    last_received: Option<(Outcome, f64)>,
    last_proposed_util: f64,
}

impl History {
    fn record(&mut self, offer: &Outcome, utility: f64) {
        if self.best_received.as_ref().map_or(true, |(_, best)| utility > *best) {
            self.best_received = Some((offer.clone(), utility));
        }
        self.last_received = Some((offer.clone(), utility));
    }

    fn best_util(&self) -> f64 {
        self.best_received.as_ref().map_or(0.0, |(_, u)| *u)
    }

    fn view<'a>(
        &'a self,
        catalog: &'a OutcomeCatalog,
        bounds: UtilityBounds,
        opponent: &OpponentModel,
        time: f64,
        planned_counter: Option<&'a Outcome>,
    ) -> RoundState<'a> {
        RoundState {
            time,
            round: opponent.num_offers(),
            bounds,
            best_received: self.best_received.as_ref().map(|(o, _)| o),
            best_received_util: self.best_util(),
            last_received: self.last_received.as_ref().map(|(o, _)| o),
            last_received_util: self.last_received.as_ref().map_or(0.0, |(_, u)| *u),
            planned_counter,
            last_proposed_util: self.last_proposed_util,
            is_stalemate: opponent.is_stalemate(),
            catalog,
        }
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Decision core of one negotiation
///
/// Owns the catalog, opponent model, meta-controller (with its experts) and
/// acceptance controller.
///
/// # Determinism
///
/// All randomness comes from streams derived from `config.rng_seed`. Same
/// seed + same utility + same opponent offers = identical actions and an
/// identical event log digest.
pub struct Orchestrator<U: UtilityFunction> {
    config: AgentConfig,
    utility: U,
    catalog: OutcomeCatalog,
    bounds: UtilityBounds,
    raw_min: f64,
    opponent: OpponentModel,
    meta: MetaController,
    acceptance: AcceptanceController,
    history: History,
    plan: Option<Plan>,
    last_recorded: Option<(usize, Outcome)>,
    proposed: Option<PlanKey>,
    accepted: Option<PlanKey>,
    event_log: EventLog,
}

impl<U: UtilityFunction> Orchestrator<U> {
    /// Create an orchestrator over an explicit outcome list.
    ///
    /// The reservation value is taken from `reservation`, else from the
    /// utility function, else from `config.reservation`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use negotiation_core_rs::orchestrator::{AgentConfig, Orchestrator, Response};
    /// use negotiation_core_rs::{LinearAdditiveUtility, Outcome};
    ///
    /// let utility = LinearAdditiveUtility::from_int_scores(
    ///     vec![0.6, 0.4],
    ///     vec![vec![0.0, 0.5, 1.0], vec![0.0, 1.0]],
    /// );
    /// let outcomes = vec![
    ///     Outcome::from_ints(&[0, 0]),
    ///     Outcome::from_ints(&[1, 1]),
    ///     Outcome::from_ints(&[2, 1]),
    /// ];
    /// let mut agent = Orchestrator::new(AgentConfig::default(), utility, Some(0.1), outcomes).unwrap();
    ///
    /// assert_eq!(agent.respond(None, 0.0, 0), Response::Reject);
    /// assert_eq!(agent.propose(0.0, 0), Outcome::from_ints(&[2, 1]));
    /// ```
    pub fn new(
        config: AgentConfig,
        utility: U,
        reservation: Option<f64>,
        outcomes: Vec<Outcome>,
    ) -> Result<Self, NegotiationError> {
        let reservation = reservation
            .or_else(|| utility.reserved_value())
            .unwrap_or(config.reservation);
        let Bootstrap {
            catalog,
            bounds,
            values_per_issue,
            raw_min,
        } = Bootstrap::initialize(&config, &utility, reservation, outcomes)?;

        tracing::debug!(
            outcomes = catalog.len(),
            min_util = bounds.min_util,
            max_util = bounds.max_util,
            reservation = bounds.reservation,
            "negotiation initialized"
        );

        let opponent = OpponentModel::new(&values_per_issue);
        let meta = MetaController::new(&config.experts, config.switch_cooldown, config.rng_seed);
        let acceptance = AcceptanceController::new(config.acceptance_thresholds(), bounds.reservation, bounds.min_util);
        let history = History {
            last_proposed_util: bounds.max_util,
            ..History::default()
        };

        Ok(Self {
            config,
            utility,
            catalog,
            bounds,
            raw_min,
            opponent,
            meta,
            acceptance,
            history,
            plan: None,
            last_recorded: None,
            proposed: None,
            accepted: None,
            event_log: EventLog::new(),
        })
    }

    /// Create an orchestrator over a declared outcome space, enumerated or
    /// sampled down to `config.max_cardinality`.
    pub fn from_space(
        config: AgentConfig,
        utility: U,
        reservation: Option<f64>,
        space: &OutcomeSpace,
    ) -> Result<Self, NegotiationError> {
        config.validate()?;
        let mut rng = RngManager::derive(config.rng_seed, SAMPLING_STREAM);
        let outcomes = space.enumerate_or_sample(config.max_cardinality, &mut rng);
        Self::new(config, utility, reservation, outcomes)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn catalog(&self) -> &OutcomeCatalog {
        &self.catalog
    }

    pub fn bounds(&self) -> UtilityBounds {
        self.bounds
    }

    pub fn opponent(&self) -> &OpponentModel {
        &self.opponent
    }

    pub fn meta(&self) -> &MetaController {
        &self.meta
    }

    pub fn acceptance(&self) -> &AcceptanceController {
        &self.acceptance
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Best utility received so far, 0 before any offer.
    pub fn best_received_util(&self) -> f64 {
        self.history.best_util()
    }

    /// Utility of our latest proposal (max utility before the first).
    pub fn last_proposed_util(&self) -> f64 {
        self.history.last_proposed_util
    }

    // ========================================================================
    // Turn entry points
    // ========================================================================

    /// Decide on the opponent's offer.
    ///
    /// `None` (our opening turn) is always rejected. An offer whose utility
    /// cannot be computed is rejected.
    pub fn respond(&mut self, offer: Option<&Outcome>, time: f64, round: usize) -> Response {
        let t = normalize_time(time);
        let Some(offer) = offer else {
            return Response::Reject;
        };

        let utility = self.record_offer(offer, t, round);
        let key = self.key(round);
        self.ensure_plan(key, t);

        let Some(u) = utility else {
            return Response::Reject;
        };

        let (decision, expert) = self.decide(offer, u, t);
        tracing::debug!(
            utility = u,
            t,
            accepted = decision.accepted,
            rule = ?decision.rule,
            "acceptance decision"
        );
        self.log(NegotiationEvent::AcceptanceDecision {
            round: self.opponent.num_offers(),
            utility: u,
            accepted: decision.accepted,
            rule: decision.rule,
        });

        if decision.accepted {
            if self.accepted != Some(key) {
                self.accepted = Some(key);
                self.reward(expert, u);
            }
            Response::Accept
        } else {
            Response::Reject
        }
    }

    /// Counter-offer for this round. Never below the hard floor unless the
    /// catalog has no such outcome, in which case the best outcome.
    pub fn propose(&mut self, time: f64, round: usize) -> Outcome {
        let t = normalize_time(time);
        let key = self.key(round);
        self.ensure_plan(key, t);

        let Some(plan) = self.plan.clone() else {
            return self.catalog.best().clone();
        };

        if self.proposed != Some(key) {
            self.proposed = Some(key);
            self.opponent.track_own_offer(plan.utility);
            self.history.last_proposed_util = plan.utility;
            self.log(NegotiationEvent::Proposed {
                round: self.opponent.num_offers(),
                time: t,
                utility: plan.utility,
            });
            self.reward(plan.expert, plan.utility);
        }
        plan.outcome
    }

    /// Revise the reservation value and every floor derived from it.
    ///
    /// The pending counter-offer is re-verified against the new floor.
    pub fn update_reservation(&mut self, reservation: f64) {
        let bounds = UtilityBounds::derive(
            self.bounds.max_util,
            self.raw_min,
            reservation,
            self.config.hard_floor_fraction,
        );
        self.bounds = bounds;
        self.acceptance.update_reservation(bounds.reservation, bounds.min_util);
        self.log(NegotiationEvent::ReservationUpdated {
            round: self.opponent.num_offers(),
            reservation: bounds.reservation,
            min_util: bounds.min_util,
        });

        if let Some(plan) = self.plan.take() {
            match self.verify_proposal(plan.expert, plan.outcome.clone()) {
                Ok((outcome, utility)) => {
                    self.plan = Some(Plan {
                        outcome,
                        utility,
                        ..plan
                    })
                }
                Err(e) => self.fallback(&e),
            }
        }
    }

    // ========================================================================
    // Round steps
    // ========================================================================

    fn key(&self, round: usize) -> PlanKey {
        PlanKey {
            round,
            offers: self.opponent.num_offers(),
        }
    }

    /// Record an offer once per `(round, offer)` appearance; returns our
    /// utility of it, `None` if it cannot be computed.
    fn record_offer(&mut self, offer: &Outcome, t: f64, round: usize) -> Option<f64> {
        let seen = self
            .last_recorded
            .as_ref()
            .map_or(false, |(r, o)| *r == round && o == offer);
        if seen {
            self.log(NegotiationEvent::DuplicateOfferIgnored {
                round: self.opponent.num_offers(),
            });
            return self.catalog.utility(offer);
        }
        self.last_recorded = Some((round, offer.clone()));

        let utility = match self.catalog.ensure(offer, &self.utility) {
            Ok(u) => Some(u),
            Err(e) => {
                self.fallback(&NegotiationError::from(e));
                None
            }
        };

        self.opponent.update(offer, t);
        if let Some(u) = utility {
            self.history.record(offer, u);
        }
        self.log(NegotiationEvent::OfferReceived {
            round: self.opponent.num_offers(),
            time: t,
            utility,
            opponent_estimate: self.opponent.offer_utilities().last().copied().unwrap_or(0.0),
        });
        utility
    }

    /// Select an expert and build the verified counter-offer, once per round.
    fn ensure_plan(&mut self, key: PlanKey, t: f64) {
        if self.plan.as_ref().map_or(false, |p| p.key == key) {
            return;
        }

        let offers = self.opponent.num_offers();
        let selection = self.meta.select(&self.opponent, t, offers);
        let expert = selection.expert;
        self.log(NegotiationEvent::ExpertSelected {
            round: offers,
            expert,
            reason: selection.reason,
        });

        let candidate = {
            let state = self.history.view(&self.catalog, self.bounds, &self.opponent, t, None);
            self.meta
                .expert_mut(expert)
                .propose(&self.catalog, &self.opponent, &state)
        };

        let (outcome, utility) = match self.verify_proposal(expert, candidate) {
            Ok(verified) => verified,
            Err(e) => {
                self.fallback(&e);
                (self.catalog.best().clone(), self.catalog.max_utility())
            }
        };
        self.plan = Some(Plan {
            key,
            expert,
            outcome,
            utility,
        });
    }

    /// Replace a candidate below the hard floor by the lowest outcome that
    /// clears it, or the best outcome if none does.
    fn verify_proposal(&mut self, expert: ExpertKind, candidate: Outcome) -> Result<(Outcome, f64), NegotiationError> {
        let u = self.catalog.ensure(&candidate, &self.utility)?;
        let floor = self.bounds.hard_floor();
        if u >= floor {
            return Ok((candidate, u));
        }

        let replacement = self
            .catalog
            .lowest_at_or_above(floor)
            .unwrap_or_else(|| self.catalog.best())
            .clone();
        let corrected = self.catalog.utility(&replacement).unwrap_or(u);
        tracing::debug!(%expert, original = u, corrected, floor, "proposal corrected");
        self.log(NegotiationEvent::ProposalCorrected {
            round: self.opponent.num_offers(),
            expert,
            original_utility: u,
            corrected_utility: corrected,
        });
        Ok((replacement, corrected))
    }

    fn decide(&self, offer: &Outcome, u: f64, t: f64) -> (AcceptDecision, ExpertKind) {
        let expert = self.plan.as_ref().map_or(self.meta.active(), |p| p.expert);
        let planned = self.plan.as_ref().map(|p| &p.outcome);
        let state = self.history.view(&self.catalog, self.bounds, &self.opponent, t, planned);

        let expert_vote = self
            .meta
            .expert(expert)
            .should_accept(offer, &self.catalog, &self.opponent, &state);
        let input = AcceptanceInput {
            time: t,
            round: self.opponent.num_offers(),
            planned_counter_util: self.plan.as_ref().map(|p| p.utility),
            expert_vote,
            is_stalemate: state.is_stalemate,
            consecutive_repeats: self.opponent.consecutive_repeats(),
            best_received_util: state.best_received_util,
        };
        (self.acceptance.decide(u, &input), expert)
    }

    fn reward(&mut self, expert: ExpertKind, reward: f64) {
        self.meta.update_reward(expert, reward);
        self.log(NegotiationEvent::RewardRecorded {
            round: self.opponent.num_offers(),
            expert,
            reward,
        });
    }

    fn fallback(&mut self, error: &NegotiationError) {
        tracing::warn!(error = %error, "recovered from negotiation error");
        self.log(NegotiationEvent::FallbackUsed {
            round: self.opponent.num_offers(),
            error: error.to_string(),
        });
    }

    fn log(&mut self, event: NegotiationEvent) {
        self.event_log.log(event);
    }
}

impl<U: UtilityFunction> Negotiator for Orchestrator<U> {
    fn respond(&mut self, offer: Option<&Outcome>, time: f64, round: usize) -> Response {
        Orchestrator::respond(self, offer, time, round)
    }

    fn propose(&mut self, time: f64, round: usize) -> Outcome {
        Orchestrator::propose(self, time, round)
    }

    fn name(&self) -> &str {
        "hybrid"
    }
}

impl<U: UtilityFunction> std::fmt::Debug for Orchestrator<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("outcomes", &self.catalog.len())
            .field("bounds", &self.bounds)
            .field("offers", &self.opponent.num_offers())
            .field("active", &self.meta.active())
            .field("events", &self.event_log.len())
            .finish()
    }
}
