//! Trait definitions for the arithmetic the MSM engine consumes

pub mod curve;
pub mod field;
pub mod scalar;

pub use curve::{CurveAffine, CurveProjective, Endomorphism, GlvCurve};
pub use field::Field;
pub use scalar::MsmScalar;
