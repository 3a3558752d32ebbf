//! Shared parameter records

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A signed lattice coordinate with magnitude below 2^128
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LatticeScalar {
    /// Absolute value
    pub magnitude: u128,
    /// True when the coordinate is negative
    pub negative: bool,
}

impl LatticeScalar {
    /// A non-negative coordinate
    pub const fn positive(magnitude: u128) -> Self {
        Self {
            magnitude,
            negative: false,
        }
    }

    /// A negative coordinate
    pub const fn negative(magnitude: u128) -> Self {
        Self {
            magnitude,
            negative: true,
        }
    }
}

/// Precomputed constants for GLV decomposition over a prime-order group.
///
/// The short basis `v1 = (a1, b1)`, `v2 = (a2, b2)` spans the lattice of
/// pairs `(k1, k2)` with `k1 + k2·λ ≡ 0 (mod q)` and satisfies
/// `a1·b2 − a2·b1 = q`. The rounding constants are
/// `g1 = round(2^256·|b2| / q)` and `g2 = round(2^256·|b1| / q)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlvParameters {
    /// Group order `q`, little-endian limbs
    pub modulus: [u64; 4],
    /// Eigenvalue of the endomorphism, `endo(P) = λ·P`
    pub lambda: [u64; 4],
    /// First basis vector, first coordinate
    pub a1: LatticeScalar,
    /// First basis vector, second coordinate
    pub b1: LatticeScalar,
    /// Second basis vector, first coordinate
    pub a2: LatticeScalar,
    /// Second basis vector, second coordinate
    pub b2: LatticeScalar,
    /// Barrett rounding constant for `b2`
    pub g1: [u64; 4],
    /// Barrett rounding constant for `b1`
    pub g2: [u64; 4],
    /// Upper bound on the bit length of either half-scalar
    pub max_bits: u32,
}
