//! Event logging for negotiation auditing and replay checks.
//!
//! Every round appends typed events describing what the core observed and
//! decided. Events enable:
//! - Auditing (which acceptance rule fired, at which utility)
//! - Debugging (why an expert was selected, when a proposal was corrected)
//! - Determinism checks (same seed + same inputs → same digest)
//!
//! # Example
//!
//! ```rust
//! use negotiation_core_rs::models::{EventLog, NegotiationEvent};
//!
//! let mut log = EventLog::new();
//! log.log(NegotiationEvent::Proposed { round: 0, time: 0.0, utility: 1.0 });
//! assert_eq!(log.events_at_round(0).len(), 1);
//! ```

use crate::acceptance::AcceptRule;
use crate::experts::ExpertKind;
use crate::meta::SelectionReason;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Negotiation event capturing an observation or decision.
///
/// All events carry the round (number of opponent offers observed) in which
/// they happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NegotiationEvent {
    /// Opponent offer recorded in the opponent model
    OfferReceived {
        round: usize,
        time: f64,
        /// Our utility, `None` if it could not be computed
        utility: Option<f64>,
        /// Estimated opponent utility of their own offer
        opponent_estimate: f64,
    },

    /// Offer seen again in the same round; not re-counted
    DuplicateOfferIgnored { round: usize },

    /// Meta-controller picked the active expert
    ExpertSelected {
        round: usize,
        expert: ExpertKind,
        reason: SelectionReason,
    },

    /// Verification replaced an expert's candidate
    ProposalCorrected {
        round: usize,
        expert: ExpertKind,
        original_utility: f64,
        corrected_utility: f64,
    },

    /// Acceptance controller verdict
    AcceptanceDecision {
        round: usize,
        utility: f64,
        accepted: bool,
        rule: AcceptRule,
    },

    /// Counter-offer sent to the opponent
    Proposed { round: usize, time: f64, utility: f64 },

    /// Reward fed back into the meta-controller
    RewardRecorded {
        round: usize,
        expert: ExpertKind,
        reward: f64,
    },

    /// Reservation value revised mid-negotiation
    ReservationUpdated {
        round: usize,
        reservation: f64,
        min_util: f64,
    },

    /// An internal error was recovered with a safe fallback
    FallbackUsed { round: usize, error: String },
}

impl NegotiationEvent {
    /// Round in which the event occurred
    pub fn round(&self) -> usize {
        match self {
            NegotiationEvent::OfferReceived { round, .. }
            | NegotiationEvent::DuplicateOfferIgnored { round }
            | NegotiationEvent::ExpertSelected { round, .. }
            | NegotiationEvent::ProposalCorrected { round, .. }
            | NegotiationEvent::AcceptanceDecision { round, .. }
            | NegotiationEvent::Proposed { round, .. }
            | NegotiationEvent::RewardRecorded { round, .. }
            | NegotiationEvent::ReservationUpdated { round, .. }
            | NegotiationEvent::FallbackUsed { round, .. } => *round,
        }
    }

    /// Event type name for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            NegotiationEvent::OfferReceived { .. } => "OfferReceived",
            NegotiationEvent::DuplicateOfferIgnored { .. } => "DuplicateOfferIgnored",
            NegotiationEvent::ExpertSelected { .. } => "ExpertSelected",
            NegotiationEvent::ProposalCorrected { .. } => "ProposalCorrected",
            NegotiationEvent::AcceptanceDecision { .. } => "AcceptanceDecision",
            NegotiationEvent::Proposed { .. } => "Proposed",
            NegotiationEvent::RewardRecorded { .. } => "RewardRecorded",
            NegotiationEvent::ReservationUpdated { .. } => "ReservationUpdated",
            NegotiationEvent::FallbackUsed { .. } => "FallbackUsed",
        }
    }
}

/// Append-only log of negotiation events
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    events: Vec<NegotiationEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: NegotiationEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[NegotiationEvent] {
        &self.events
    }

    /// Get events for a specific round
    pub fn events_at_round(&self, round: usize) -> Vec<&NegotiationEvent> {
        self.events.iter().filter(|e| e.round() == round).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&NegotiationEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// SHA-256 of the JSON encoding of all events, hex encoded.
    ///
    /// Two negotiations with the same seed, utility function and opponent
    /// offer sequence produce the same digest.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for event in &self.events {
            // Serializing plain data enums cannot fail
            if let Ok(json) = serde_json::to_string(event) {
                hasher.update(json.as_bytes());
                hasher.update(b"\n");
            }
        }
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_by_round_and_type() {
        let mut log = EventLog::new();
        log.log(NegotiationEvent::Proposed {
            round: 0,
            time: 0.0,
            utility: 1.0,
        });
        log.log(NegotiationEvent::DuplicateOfferIgnored { round: 1 });
        log.log(NegotiationEvent::Proposed {
            round: 1,
            time: 0.1,
            utility: 0.9,
        });

        assert_eq!(log.len(), 3);
        assert_eq!(log.events_at_round(1).len(), 2);
        assert_eq!(log.events_of_type("Proposed").len(), 2);
    }

    #[test]
    fn test_digest_tracks_content() {
        let mut a = EventLog::new();
        let mut b = EventLog::new();
        assert_eq!(a.digest(), b.digest());

        a.log(NegotiationEvent::FallbackUsed {
            round: 2,
            error: "boom".to_string(),
        });
        assert_ne!(a.digest(), b.digest());

        b.log(NegotiationEvent::FallbackUsed {
            round: 2,
            error: "boom".to_string(),
        });
        assert_eq!(a.digest(), b.digest());
    }
}
