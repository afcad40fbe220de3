//! Negotiation Core - Rust Engine
//!
//! Decision core for a bilateral alternating-offers negotiation agent with
//! deterministic execution.
//!
//! # Architecture
//!
//! - **core**: Time normalization and negotiation phases
//! - **models**: Domain types (Outcome, OutcomeCatalog, utility, events)
//! - **opponent**: Frequency-based opponent model and style features
//! - **experts**: The five proposal strategies
//! - **meta**: Bandit-style expert selection with sticky switching
//! - **acceptance**: Layered accept/reject rules
//! - **orchestrator**: Per-round pipeline tying everything together
//! - **baselines**: Simple reference negotiators for self-play
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. Never accept or propose below the hard utility floor
//! 2. All randomness is deterministic (seeded RNG)
//! 3. Every call returns a decision, even when the utility function fails

// Module declarations
pub mod acceptance;
pub mod baselines;
pub mod core;
pub mod experts;
pub mod meta;
pub mod models;
pub mod opponent;
pub mod orchestrator;
pub mod rng;

// Re-exports for convenience
pub use acceptance::{AcceptDecision, AcceptRule, AcceptanceController, AcceptanceThresholds};
pub use core::time::{normalize_time, Phase};
pub use experts::{Expert, ExpertKind, ExpertParams};
pub use meta::{MetaController, Selection, SelectionReason};
pub use models::{
    event::{EventLog, NegotiationEvent},
    outcome::{Outcome, Value},
    state::{RoundState, UtilityBounds},
    utility::{LinearAdditiveUtility, UtilityError, UtilityFunction},
    OutcomeCatalog, OutcomeSpace,
};
pub use opponent::OpponentModel;
pub use orchestrator::{AgentConfig, ConfigError, NegotiationError, Negotiator, Orchestrator, Response};
pub use rng::RngManager;

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn negotiation_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::negotiator::PyNegotiator>()?;
    Ok(())
}
