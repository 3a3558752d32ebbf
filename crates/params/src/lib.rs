//! Constant values for the dmsm library
//!
//! Curve constants and engine defaults. Constants only, no logic beyond the
//! window heuristic.

#![forbid(unsafe_code)]

pub mod curves;
pub mod msm;
