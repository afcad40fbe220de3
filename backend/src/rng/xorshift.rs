//! xorshift64* random number generator
//!
//! Every expert owns its own generator, derived from the agent seed with
//! [`RngManager::derive`], so one expert's draws never shift another's.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. This is CRITICAL for:
//! - Testing (replay a negotiation action-for-action)
//! - Debugging (reproduce a surprising proposal)

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use negotiation_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let index = rng.pick_index(10);
/// assert!(index < 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit, never zero)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    pub fn new(seed: u64) -> Self {
        // xorshift requires a non-zero state
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Create an independent generator for a numbered stream.
    ///
    /// The stream id is mixed with splitmix64 so neighbouring ids start from
    /// unrelated states.
    pub fn derive(seed: u64, stream: u64) -> Self {
        let mut z = seed
            .wrapping_add(stream.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        Self::new(z ^ (z >> 31))
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Uniform index in `[0, len)`. Returns 0 when `len` is 0 or 1.
    pub fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.next() % len as u64) as usize
    }

    /// Get current RNG state
    pub fn get_state(&self) -> u64 {
        self.state
    }
}
