//! Normalized negotiation time
//!
//! The protocol engine reports progress as a fraction of the allotted
//! rounds/time. Components never trust that value raw: it is sanitized once
//! and bucketed into coarse phases for the meta-controller's priors.

use serde::{Deserialize, Serialize};

/// Clamp a reported time into `[0, 1]`, mapping NaN to 0.
///
/// # Example
/// ```
/// use negotiation_core_rs::core::time::normalize_time;
///
/// assert_eq!(normalize_time(1.7), 1.0);
/// assert_eq!(normalize_time(-0.2), 0.0);
/// assert_eq!(normalize_time(f64::NAN), 0.0);
/// ```
pub fn normalize_time(t: f64) -> f64 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

/// Coarse time bucket used to key the expert phase priors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// t < 0.15
    Opening,
    /// 0.15 ≤ t < 0.30
    Early,
    /// 0.30 ≤ t < 0.50
    MidEarly,
    /// 0.50 ≤ t < 0.70
    Mid,
    /// 0.70 ≤ t < 0.85
    MidLate,
    /// t ≥ 0.85
    Late,
}

impl Phase {
    /// Bucket a normalized time.
    pub fn of(t: f64) -> Self {
        let t = normalize_time(t);
        if t < 0.15 {
            Phase::Opening
        } else if t < 0.30 {
            Phase::Early
        } else if t < 0.50 {
            Phase::MidEarly
        } else if t < 0.70 {
            Phase::Mid
        } else if t < 0.85 {
            Phase::MidLate
        } else {
            Phase::Late
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_boundaries() {
        assert_eq!(Phase::of(0.0), Phase::Opening);
        assert_eq!(Phase::of(0.15), Phase::Early);
        assert_eq!(Phase::of(0.49), Phase::MidEarly);
        assert_eq!(Phase::of(0.5), Phase::Mid);
        assert_eq!(Phase::of(0.84), Phase::MidLate);
        assert_eq!(Phase::of(0.85), Phase::Late);
        assert_eq!(Phase::of(2.0), Phase::Late);
    }

    #[test]
    fn test_phase_is_monotone() {
        let mut last = Phase::of(0.0) as u8;
        for i in 0..=100 {
            let p = Phase::of(i as f64 / 100.0) as u8;
            assert!(p >= last);
            last = p;
        }
    }
}
