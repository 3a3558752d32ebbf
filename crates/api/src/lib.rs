//! Public API traits and types for the dmsm library
//!
//! This crate provides the contracts the MSM engine consumes: field and curve
//! arithmetic traits, the scalar view used for decomposition, the GLV lattice
//! parameter record, and the shared error type.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at the crate level for convenience
pub use error::{validate, Error, Result};
pub use types::{GlvParameters, LatticeScalar};

// Re-export all traits from the traits module
pub use traits::{CurveAffine, CurveProjective, Endomorphism, Field, GlvCurve, MsmScalar};
