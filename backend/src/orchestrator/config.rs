//! Agent configuration
//!
//! A fixed, enumerated set of named numeric parameters passed at
//! construction. Omitted JSON fields fall back to [`AgentConfig::default`].

use crate::acceptance::AcceptanceThresholds;
use crate::experts::ExpertParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be in [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("final_threshold {final_threshold} exceeds initial_threshold {initial_threshold}")]
    ThresholdOrder {
        initial_threshold: f64,
        final_threshold: f64,
    },

    #[error("emergency_time must be below 1, got {0}")]
    EmergencyTooLate(f64),

    #[error("max_cardinality must be at least 1")]
    ZeroCardinality,

    #[error("Failed to parse config: {0}")]
    Parse(String),
}

/// Agent configuration
///
/// # Profiles
///
/// - [`AgentConfig::default`]: hard floor at 35% of the best utility,
///   emergency acceptance from t = 0.88
/// - [`AgentConfig::high_floor`]: hard floor at 55%, emergency from t = 0.98
///
/// # Example
///
/// ```rust
/// use negotiation_core_rs::orchestrator::AgentConfig;
///
/// let config = AgentConfig::from_json(r#"{"rng_seed": 7, "switch_cooldown": 3}"#).unwrap();
/// assert_eq!(config.rng_seed, 7);
/// assert_eq!(config.hard_floor_fraction, 0.35);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Walk-away value used when neither the host nor the utility function
    /// supplies one
    pub reservation: f64,

    /// Hard floor as a fraction of the best achievable utility
    pub hard_floor_fraction: f64,

    /// Sliding acceptance threshold at t = 0
    pub initial_threshold: f64,

    /// Sliding acceptance threshold at t = 1 (raised to the hard floor)
    pub final_threshold: f64,

    /// Offers are never accepted during the first rounds
    pub no_accept_rounds: usize,

    /// Start of progressive emergency acceptance
    pub emergency_time: f64,

    /// Lowest emergency threshold (raised to the hard floor)
    pub emergency_floor: f64,

    /// Per-expert exponents and weights
    pub experts: ExpertParams,

    /// Rounds an expert is kept after a scored switch
    pub switch_cooldown: usize,

    /// Seed for every random stream (tie-breaking, outcome sampling)
    pub rng_seed: u64,

    /// Outcome spaces larger than this are sampled
    pub max_cardinality: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            reservation: 0.0,
            hard_floor_fraction: 0.35,
            initial_threshold: 0.92,
            final_threshold: 0.50,
            no_accept_rounds: 2,
            emergency_time: 0.88,
            emergency_floor: 0.0,
            experts: ExpertParams::default(),
            switch_cooldown: 2,
            rng_seed: 12345,
            max_cardinality: 10_000,
        }
    }
}

impl AgentConfig {
    /// Tuning for rich bid representations: higher floor, later panic.
    pub fn high_floor() -> Self {
        Self {
            hard_floor_fraction: 0.55,
            emergency_time: 0.98,
            ..Self::default()
        }
    }

    /// Parse a JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AgentConfig = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        unit("reservation", self.reservation)?;
        unit("hard_floor_fraction", self.hard_floor_fraction)?;
        unit("initial_threshold", self.initial_threshold)?;
        unit("final_threshold", self.final_threshold)?;
        unit("emergency_time", self.emergency_time)?;
        unit("emergency_floor", self.emergency_floor)?;
        unit("pareto_alpha", self.experts.pareto_alpha)?;
        unit("deal_seeker_start", self.experts.deal_seeker_start)?;

        if self.final_threshold > self.initial_threshold {
            return Err(ConfigError::ThresholdOrder {
                initial_threshold: self.initial_threshold,
                final_threshold: self.final_threshold,
            });
        }
        if self.emergency_time >= 1.0 {
            return Err(ConfigError::EmergencyTooLate(self.emergency_time));
        }

        positive("boulware_e", self.experts.boulware_e)?;
        positive("pareto_e", self.experts.pareto_e)?;
        positive("forecast_base_e", self.experts.forecast_base_e)?;
        positive("reciprocal_match_factor", self.experts.reciprocal_match_factor)?;

        if self.max_cardinality == 0 {
            return Err(ConfigError::ZeroCardinality);
        }
        Ok(())
    }

    /// Acceptance chain parameters.
    pub fn acceptance_thresholds(&self) -> AcceptanceThresholds {
        AcceptanceThresholds {
            initial_threshold: self.initial_threshold,
            final_threshold: self.final_threshold,
            no_accept_rounds: self.no_accept_rounds,
            emergency_time: self.emergency_time,
            emergency_floor: self.emergency_floor,
            ..AcceptanceThresholds::default()
        }
    }
}

fn unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}
