//! Bucket reduction
//!
//! Once accumulation is done every bucket holds its sum at its first slot.
//! A partition reduces to `Σ l·B_l`, computed with the running-sum trick
//! over `l = L..1`. Threads reduce slices of the bucket space and shift
//! their partial triangle by the slice offset.

use core::ops::Range;

use dmsm_api::{CurveAffine, CurveProjective};

use crate::bucket::BucketBounds;
use crate::digit::WindowGeometry;

/// `n·p` by double-and-add
pub fn mul_small<P: CurveProjective>(p: &P, n: u64) -> P {
    let mut acc = P::identity();
    for i in (0..u64::BITS - n.leading_zeros()).rev() {
        acc = acc.double();
        if (n >> i) & 1 == 1 {
            acc = acc.add(p);
        }
    }
    acc
}

/// `Σ l·buckets[l-1]` for a full partition
pub fn triangle_sum<C: CurveAffine>(buckets: &[C]) -> C::Projective {
    let (triangle, _) = triangle_from(buckets.iter().rev().copied());
    triangle
}

/// Running sum over buckets given from highest to lowest, returning
/// `(triangle, row)`
fn triangle_from<C: CurveAffine>(descending: impl Iterator<Item = C>) -> (C::Projective, C::Projective) {
    let mut row = C::Projective::identity();
    let mut triangle = C::Projective::identity();
    for bucket in descending {
        row = row.add_mixed(&bucket);
        triangle = triangle.add(&row);
    }
    (triangle, row)
}

/// Reduce the accumulated buckets `buckets` (flat ids).
///
/// `points` is the bucket array slice starting at the first slot of the
/// range. Returns one `(partition, partial)` entry per partition the range
/// touches.
pub fn reduce_range<C: CurveAffine>(
    geometry: &WindowGeometry,
    bounds: &BucketBounds,
    buckets: Range<usize>,
    points: &[C],
) -> Vec<(usize, C::Projective)> {
    if buckets.is_empty() {
        return Vec::new();
    }
    let base = bounds.span(buckets.clone()).start;
    let per = geometry.buckets_per_partition;
    let first = geometry.partition_of(buckets.start);
    let last = geometry.partition_of(buckets.end - 1);

    (first..=last)
        .map(|k| {
            let start = buckets.start.max(k * per);
            let end = buckets.end.min((k + 1) * per);
            let value = |b: usize| {
                let slots = bounds.range(b);
                if slots.is_empty() {
                    C::identity()
                } else {
                    points[slots.start - base]
                }
            };
            let (triangle, row) = triangle_from((start..end).rev().map(value));
            // bucket index l = b - k·L + 1, so the slice starts at lstart - 1 = start - k·L
            let offset = (start - k * per) as u64;
            (k, triangle.add(&mul_small(&row, offset)))
        })
        .collect()
}
