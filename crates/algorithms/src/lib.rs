//! Curve arithmetic backing the multi-scalar multiplication engine
//!
//! This crate provides the BLS12-381 G₁ group together with its base and
//! scalar fields. Field elements are kept in Montgomery form and all
//! group operations used by the bucket method go through the
//! `dmsm_api` curve traits.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub use dmsm_api::{validate, Error, Result};

// Elliptic curve implementations
#[cfg(feature = "ec")]
pub mod ec;
