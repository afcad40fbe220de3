//! Domain models for the negotiation core

pub mod catalog;
pub mod domain;
pub mod event;
pub mod outcome;
pub mod state;
pub mod utility;

// Re-exports
pub use catalog::{CatalogError, OutcomeCatalog};
pub use domain::{values_per_issue, Issue, OutcomeSpace};
pub use event::{EventLog, NegotiationEvent};
pub use outcome::{Outcome, Value};
pub use state::{RoundState, UtilityBounds};
pub use utility::{evaluate, LinearAdditiveUtility, UtilityError, UtilityFunction};
