//! Scalar view used by decomposition

use core::fmt::Debug;

/// A scalar-field element as the MSM engine sees it: a canonical integer
/// in `[0, q)` exposed as four little-endian 64-bit limbs.
pub trait MsmScalar: Copy + Clone + Debug + Default + PartialEq + Send + Sync + 'static {
    /// Bit length of the group order
    const NUM_BITS: u32;

    /// Canonical (non-Montgomery) little-endian limbs
    fn to_canonical_limbs(&self) -> [u64; 4];

    /// Builds a scalar from canonical limbs, `None` if the value is not below the modulus
    fn from_canonical_limbs(limbs: [u64; 4]) -> Option<Self>;
}
