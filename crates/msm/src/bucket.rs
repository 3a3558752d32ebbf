//! Bucket assignment by counting sort
//!
//! Pass 1 counts how many expanded points land in every bucket, pass 2
//! turns the counts into offsets, pass 3 copies each point to a slot claimed
//! from its bucket's cursor. After pass 3 the points of bucket `b` occupy
//! `bounds[b]..bounds[b + 1]` of the bucket array.

use core::ops::Range;
use core::sync::atomic::{AtomicU32, Ordering};

use dmsm_api::{CurveAffine, Error, GlvCurve, Result};

use crate::arena::{Arena, Slab};
use crate::digit::WindowGeometry;
use crate::glv::GlvDecomposer;

/// A signed input point, or its signed endomorphism image, with the
/// half-scalar it is multiplied by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandedPoint<C> {
    /// `±G` or `±endo(G)`
    pub point: C,
    /// Half-scalar magnitude
    pub scalar: u128,
}

/// Turn one input pair into its two expanded points.
///
/// Identity inputs get zero half-scalars so they produce no digits.
pub fn expand<C: GlvCurve>(
    decomposer: &GlvDecomposer,
    point: &C,
    scalar: &[u64; 4],
) -> [ExpandedPoint<C>; 2] {
    if point.is_identity() {
        return [ExpandedPoint::default(); 2];
    }
    let d = decomposer.decompose_reduced(scalar);
    let endo = point.endomorphism();
    [
        ExpandedPoint {
            point: if d.neg0 { point.negate() } else { *point },
            scalar: d.s0,
        },
        ExpandedPoint {
            point: if d.neg1 { endo.negate() } else { endo },
            scalar: d.s1,
        },
    ]
}

/// Per-bucket counters, reused as write cursors after the prefix sum
pub struct BucketCounters {
    counts: Vec<AtomicU32>,
    max: AtomicU32,
}

impl BucketCounters {
    /// Zeroed counters for `buckets` buckets
    pub fn new(buckets: usize) -> Self {
        Self {
            counts: (0..buckets).map(|_| AtomicU32::new(0)).collect(),
            max: AtomicU32::new(0),
        }
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when there are no buckets
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Count one more point in `bucket`, returning the new count
    #[inline]
    pub fn record(&self, bucket: usize) -> u32 {
        self.counts[bucket].fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Fold a thread's largest observed count into the global maximum
    #[inline]
    pub fn publish_max(&self, local_max: u32) {
        self.max.fetch_max(local_max, Ordering::Relaxed);
    }

    /// Largest bucket, valid once every thread has published
    pub fn max_bucket(&self) -> u32 {
        self.max.load(Ordering::Relaxed)
    }

    /// Prefix-sum the counts into bucket bounds and rewind every counter
    /// to its bucket's first slot
    pub fn prefix_sum(&self) -> Result<BucketBounds> {
        let mut offsets = Vec::with_capacity(self.counts.len() + 1);
        let mut total = 0usize;
        offsets.push(0);
        for counter in &self.counts {
            total += counter.load(Ordering::Relaxed) as usize;
            offsets.push(total);
        }
        if total > u32::MAX as usize {
            return Err(Error::param(
                "points",
                "bucket entries exceed 32-bit cursor range",
            ));
        }
        for (counter, start) in self.counts.iter().zip(&offsets) {
            counter.store(*start as u32, Ordering::Relaxed);
        }
        Ok(BucketBounds { offsets })
    }

    /// Claim the next free slot of `bucket`
    #[inline]
    pub fn claim(&self, bucket: usize) -> usize {
        self.counts[bucket].fetch_add(1, Ordering::Relaxed) as usize
    }
}

/// Start offsets of every bucket in the bucket array, plus the total
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketBounds {
    offsets: Vec<usize>,
}

impl BucketBounds {
    /// Total number of bucket entries
    #[inline]
    pub fn total(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// Number of buckets
    #[inline]
    pub fn buckets(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Slots of `bucket`
    #[inline]
    pub fn range(&self, bucket: usize) -> Range<usize> {
        self.offsets[bucket]..self.offsets[bucket + 1]
    }

    /// Slots spanned by a run of buckets
    #[inline]
    pub fn span(&self, buckets: Range<usize>) -> Range<usize> {
        self.offsets[buckets.start]..self.offsets[buckets.end]
    }

    /// Number of pairs the first accumulation pass forms over `buckets`
    pub fn first_pass_pairs(&self, buckets: Range<usize>) -> usize {
        buckets.map(|b| self.range(b).len() / 2).sum()
    }

    /// Largest bucket
    pub fn max_bucket(&self) -> usize {
        (0..self.buckets())
            .map(|b| self.range(b).len())
            .max()
            .unwrap_or(0)
    }
}

/// Pass 1: count the non-zero digits of `entries`.
///
/// Returns the largest bucket count this thread observed.
pub fn count_digits<C>(
    geometry: &WindowGeometry,
    counters: &BucketCounters,
    entries: &[ExpandedPoint<C>],
) -> u32 {
    let mut local_max = 0;
    for entry in entries {
        for (k, digit) in geometry.digits(entry.scalar) {
            if digit.is_zero() {
                continue;
            }
            let count = counters.record(geometry.bucket_id(k, digit.magnitude));
            local_max = local_max.max(count);
        }
    }
    local_max
}

/// Pass 3: copy every point of `entries` into the slots claimed from its
/// buckets, negated when the digit is negative.
///
/// # Safety
///
/// `counters` must have been rewound by [`BucketCounters::prefix_sum`] and
/// `buckets` must span its total. While any caller runs, no other view of
/// `buckets` may be alive; concurrent callers must share `counters` so the
/// claimed slots stay disjoint.
pub unsafe fn scatter<C: CurveAffine>(
    geometry: &WindowGeometry,
    counters: &BucketCounters,
    entries: &[ExpandedPoint<C>],
    arena: &Arena<C>,
    buckets: Slab,
) {
    for entry in entries {
        for (k, digit) in geometry.digits(entry.scalar) {
            if digit.is_zero() {
                continue;
            }
            let slot = counters.claim(geometry.bucket_id(k, digit.magnitude));
            let point = if digit.carry {
                entry.point.negate()
            } else {
                entry.point
            };
            // SAFETY: `claim` hands every slot to exactly one caller.
            unsafe { arena.write(buckets, slot, point) };
        }
    }
}
