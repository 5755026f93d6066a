//! Deterministic PRNG for order selection, wait times and scoring.
//!
//! Uses the SplitMix64 algorithm: fast, 8 bytes of state, and trivially
//! reproducible from a seed so whole shifts can be replayed in tests.

/// SplitMix64 pseudo-random number generator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform value in the half-open range `[min, max)`.
    ///
    /// An empty or inverted range yields `min`.
    pub fn range(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        min + self.next_u64() % (max - min)
    }

    /// Uniform value in the closed range `[min, max]`.
    pub fn range_inclusive(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        self.range(u64::from(min), u64::from(max) + 1) as u32
    }

    /// Uniform index into a collection of length `len`. Returns `None` when
    /// the collection is empty.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.range(0, len as u64) as usize)
    }

    /// Get the internal state.
    pub fn state(&self) -> u64 {
        self.state
    }
}
