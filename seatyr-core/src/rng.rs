//! Deterministic pseudo-random number generation for the search driver.
//!
//! The search driver (§4.I) needs reproducible randomness: identical inputs
//! and identical seeds must always yield identical plan lists, bit-for-bit,
//! on any platform. A general-purpose RNG crate does not promise that its
//! algorithm is stable across versions, so this module hand-rolls a small
//! 32-bit xorshift generator instead, following the spirit (not the letter)
//! of the splitmix-based worker-seed derivation used to fan a base seed out
//! into independent streams.

const DEFAULT_SEED: u32 = 0x9E37_79B9;

/// A 32-bit xorshift pseudo-random number generator.
///
/// Produces an identical sequence for a given seed on every platform. Shuffle
/// outcomes are derived entirely from integer draws so they do not depend on
/// floating-point associativity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XorShift32 {
    state: u32,
}

impl Default for XorShift32 {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl XorShift32 {
    /// Builds a generator from a seed. A zero seed is remapped to the
    /// default seed since xorshift's fixed point at zero never advances.
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { DEFAULT_SEED } else { seed },
        }
    }

    /// Derives an independent child generator from this one.
    ///
    /// Used by the search driver to turn a single base seed into a distinct,
    /// reproducible seed for each run of the seed loop (§4.I step 2).
    #[must_use]
    pub fn derive(&mut self, salt: u32) -> Self {
        let mixed = self.next_u32() ^ salt.wrapping_mul(0x85EB_CA6B);
        Self::new(mixed)
    }

    /// Draws the next raw 32-bit value and advances the generator state.
    #[must_use]
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Draws a uniform value in `[0, 1)`.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "uniform float conversion is the generator's documented contract"
    )]
    #[must_use]
    pub fn next_unit_float(&mut self) -> f64 {
        let draw = self.next_u32();
        f64::from(draw) / (f64::from(u32::MAX) + 1.0)
    }

    /// Draws a uniform integer in `[0, bound)`. Returns 0 when `bound == 0`.
    #[must_use]
    pub fn next_below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.next_u32() % bound
    }

    /// Shuffles `items` in place via Fisher-Yates, using integer draws for
    /// index selection so results never depend on floating-point rounding.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        let len = items.len();
        if len < 2 {
            return;
        }
        for i in (1..len).rev() {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "slice lengths used by this solver never approach u32::MAX"
            )]
            let bound = (i as u32) + 1;
            #[expect(
                clippy::cast_possible_truncation,
                reason = "next_below(bound) is < bound, which fits in usize here"
            )]
            let j = self.next_below(bound) as usize;
            items.swap(i, j);
        }
    }
}
