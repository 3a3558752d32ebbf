//! Parallel multi-scalar multiplication
//!
//! Computes `Σ s_i·G_i` over a curve with an efficient endomorphism. Each
//! scalar is split in two half-length parts (GLV), the resulting `2N`
//! half-scalars are recoded into signed windows and sorted into buckets,
//! and buckets are summed with batched affine additions that share one
//! field inversion per thread and pass. Work is statically partitioned over
//! a fixed worker pool; threads synchronize with a barrier between phases.
//!
//! ```no_run
//! use dmsm_algorithms::ec::bls12_381::{G1Affine, Scalar};
//! use dmsm_msm::{MsmConfig, MsmContext, WorkerPool};
//!
//! # fn main() -> dmsm_api::Result<()> {
//! let ctx = MsmContext::<G1Affine>::new(WorkerPool::start(4)?, MsmConfig::default())?;
//! let bases = vec![G1Affine::generator(); 3];
//! let scalars = vec![Scalar::from(1u64), Scalar::from(2u64), Scalar::from(3u64)];
//! let sum = ctx.msm(&scalars, &bases)?;
//! # let _ = sum;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod arena;
pub mod batch_add;
pub mod bucket;
pub mod combine;
pub mod config;
pub mod digit;
pub mod engine;
pub mod fallback;
pub mod glv;
pub mod pool;
pub mod reduce;

pub use config::{AdditionMode, MsmConfig};
pub use digit::{SignedDigit, WindowGeometry};
pub use engine::MsmContext;
pub use fallback::{msm_pippenger, msm_pippenger_with_window};
pub use glv::{Decomposition, GlvDecomposer};
pub use pool::{Role, ThreadContext, WorkerPool};
