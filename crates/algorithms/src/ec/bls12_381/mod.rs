//! BLS12-381 G₁ arithmetic with the GLV endomorphism.
//!
//! **Warning:** Unaudited implementation. Use at your own risk.

mod field;
mod g1;
mod scalar;

#[cfg(test)]
mod tests;

pub use field::fp::Fp;
pub use g1::{G1Affine, G1Projective, BETA};
pub use scalar::Scalar;
pub use self::scalar::Scalar as Bls12_381Scalar;
