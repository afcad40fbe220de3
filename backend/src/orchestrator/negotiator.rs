//! Turn-level interface shared by the agent and the reference opponents

use crate::models::Outcome;
use serde::{Deserialize, Serialize};

/// Answer to an opponent offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Response {
    Accept,
    Reject,
}

impl Response {
    pub fn is_accept(self) -> bool {
        matches!(self, Response::Accept)
    }
}

/// A party in an alternating-offers negotiation.
///
/// The protocol engine calls `respond` with the opponent's latest offer
/// (`None` on the opening turn) and, on rejection, `propose` for the
/// counter-offer. Both must always return a valid action.
///
/// `time` is normalized to `[0, 1]`; `round` is the host's round counter.
pub trait Negotiator {
    fn respond(&mut self, offer: Option<&Outcome>, time: f64, round: usize) -> Response;

    fn propose(&mut self, time: f64, round: usize) -> Outcome;

    /// Short identifier for reports
    fn name(&self) -> &str;
}
