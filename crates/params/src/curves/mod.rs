//! Per-curve constants

pub mod bls12_381;
