//! Validation utilities for MSM boundaries

use super::{Error, Result};

/// Validate a parameter condition
#[inline(always)]
pub fn parameter(condition: bool, name: &'static str, reason: &'static str) -> Result<()> {
    if !condition {
        return Err(Error::param(name, reason));
    }
    Ok(())
}

/// Validate a length
#[inline(always)]
pub fn length(context: &'static str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(Error::Length {
            context,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Validate that `requested` elements fit into the `available` free space of a zone
#[inline(always)]
pub fn capacity(zone: &'static str, requested: usize, available: usize) -> Result<()> {
    if requested > available {
        return Err(Error::Capacity {
            zone,
            requested,
            available,
        });
    }
    Ok(())
}
