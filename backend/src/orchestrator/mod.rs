//! Orchestrator - per-round control loop and configuration
//!
//! See `engine.rs` for the round sequence.

pub mod config;
pub mod engine;
pub mod negotiator;

pub use config::{AgentConfig, ConfigError};
pub use engine::{Bootstrap, NegotiationError, Orchestrator};
pub use negotiator::{Negotiator, Response};
