//! Engine configuration

use dmsm_api::{validate, Result};
use dmsm_params::msm::{
    default_window_bits, DEFAULT_PARALLEL_THRESHOLD, MAX_WINDOW_BITS, MIN_WINDOW_BITS,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How bucket points are paired up during batch-affine accumulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AdditionMode {
    /// Every pair is classified (identity, doubling, cancellation, addition)
    #[default]
    Checked,
    /// Pairs are assumed distinct and not mutually inverse
    Unchecked,
}

/// Tunables for a [`MsmContext`](crate::MsmContext)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MsmConfig {
    /// Window size override; `None` picks one from the input size
    pub window: Option<u32>,
    /// Addition mode used by [`MsmContext::msm`](crate::MsmContext::msm)
    pub mode: AdditionMode,
    /// Inputs smaller than this run on the calling thread only
    pub parallel_threshold: usize,
}

impl Default for MsmConfig {
    fn default() -> Self {
        Self {
            window: None,
            mode: AdditionMode::Checked,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl MsmConfig {
    /// Fix the window size instead of using the heuristic
    pub fn with_window(mut self, bits: u32) -> Self {
        self.window = Some(bits);
        self
    }

    /// Select the addition mode
    pub fn with_mode(mut self, mode: AdditionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the input size below which no worker threads are used
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Check that an explicit window is within the supported range
    pub fn validate(&self) -> Result<()> {
        if let Some(c) = self.window {
            validate::parameter(
                (MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&c),
                "window",
                "window size must be between 2 and 20 bits",
            )?;
        }
        Ok(())
    }

    /// Window size used for `points` inputs
    pub fn window_for(&self, points: usize) -> u32 {
        self.window.unwrap_or_else(|| default_window_bits(points))
    }
}
