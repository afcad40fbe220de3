//! Deterministic random number generation
//!
//! Uses xorshift64* for fast, reproducible tie-breaking and outcome sampling.
//! CRITICAL: All randomness in the negotiation core MUST go through this module.

mod xorshift;

pub use xorshift::RngManager;
