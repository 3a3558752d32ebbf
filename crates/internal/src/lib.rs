//! Internal utilities for the dmsm library
//!
//! Limb-level arithmetic shared by the field implementations and the scalar
//! decomposer. Not part of the public API.

#![forbid(unsafe_code)]

pub mod arith;
pub mod constant_time;
pub mod endian;
