//! Elliptic Curve Primitives
//!
//! Short Weierstrass curves equipped with an efficient endomorphism.

pub mod bls12_381;

pub use bls12_381::{
    Bls12_381Scalar, Fp as Bls12_381Fp, G1Affine as Bls12_381G1Affine,
    G1Projective as Bls12_381G1,
};
