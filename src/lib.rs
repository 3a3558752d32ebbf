//! # dmsm
//!
//! Parallel multi-scalar multiplication for pairing-friendly curves.
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! dmsm = "0.3"
//! ```
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `serde`: Serialization of [`msm::MsmConfig`]
//! - `full`: All features enabled
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports functionality from several sub-crates:
//!
//! - [`dmsm-api`]: Curve and field traits, error types
//! - [`dmsm-params`]: Curve constants and window heuristics
//! - [`dmsm-algorithms`]: BLS12-381 field and G1 arithmetic
//! - [`dmsm-msm`]: The MSM engine

pub use dmsm_algorithms as algorithms;
pub use dmsm_api as api;
pub use dmsm_internal as internal;
pub use dmsm_msm as msm;
pub use dmsm_params as params;

/// Common imports for dmsm users
pub mod prelude {
    // Re-export error types
    pub use crate::api::{Error, Result};

    // Re-export core traits
    pub use crate::api::{CurveAffine, CurveProjective, Endomorphism, Field, GlvCurve, MsmScalar};

    // Engine entry points
    pub use crate::msm::{msm_pippenger, AdditionMode, MsmConfig, MsmContext, WorkerPool};

    // Concrete curve types
    pub use crate::algorithms::ec::{
        Bls12_381G1, Bls12_381G1Affine, Bls12_381Scalar,
    };
}
