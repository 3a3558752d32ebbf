//! Defaults for the multi-scalar multiplication engine

/// Smallest window accepted by the engine
pub const MIN_WINDOW_BITS: u32 = 2;

/// Largest window accepted as an explicit override
pub const MAX_WINDOW_BITS: u32 = 20;

/// Largest window the heuristic will pick on its own
pub const MAX_HEURISTIC_WINDOW_BITS: u32 = 16;

/// Window used for fewer than [`SMALL_INPUT_THRESHOLD`] points
pub const SMALL_INPUT_WINDOW_BITS: u32 = 3;

/// Point counts below this use [`SMALL_INPUT_WINDOW_BITS`]
pub const SMALL_INPUT_THRESHOLD: usize = 32;

/// Inputs below this size are processed on the calling thread only
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// Integer approximation of ln(a): floor(log2(a)) * 69 / 100
#[inline]
pub const fn ln_without_floats(a: usize) -> usize {
    if a == 0 {
        return 0;
    }
    let log2 = (usize::BITS - 1 - a.leading_zeros()) as usize;
    log2 * 69 / 100
}

/// Default window size for `points` bucket inputs: 3 below 32 points,
/// otherwise ln(n) + 2, capped at [`MAX_HEURISTIC_WINDOW_BITS`].
pub const fn default_window_bits(points: usize) -> u32 {
    if points < SMALL_INPUT_THRESHOLD {
        return SMALL_INPUT_WINDOW_BITS;
    }
    let c = (ln_without_floats(points) + 2) as u32;
    if c > MAX_HEURISTIC_WINDOW_BITS {
        MAX_HEURISTIC_WINDOW_BITS
    } else {
        c
    }
}
