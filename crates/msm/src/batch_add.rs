//! Batch-affine accumulation with Montgomery's trick
//!
//! A batch is a list of disjoint slot pairs `(left[i], right[i])` inside a
//! points slice. Every pair is added with affine formulas and the result is
//! written to the left slot; all denominators of the batch share a single
//! field inversion.
//!
//! Formulas assume a short Weierstrass curve `y² = x³ + b`.

use core::ops::Range;

use dmsm_api::{CurveAffine, Error, Field, Result};
use tracing::warn;

use crate::bucket::BucketBounds;
use crate::config::AdditionMode;

/// How a pair of affine points is combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairKind {
    /// Distinct x coordinates, slope denominator `x_R - x_L`
    Add,
    /// Equal points, slope denominator `2y`
    Double,
    /// Right operand is the identity
    TakeLeft,
    /// Left operand is the identity
    TakeRight,
    /// Mutually inverse points, or doubling a point with `y = 0`
    Cancel,
}

impl PairKind {
    /// Classify `left + right`
    pub fn classify<C: CurveAffine>(left: &C, right: &C) -> Self {
        if left.is_identity() {
            return PairKind::TakeRight;
        }
        if right.is_identity() {
            return PairKind::TakeLeft;
        }
        if left.x() != right.x() {
            return PairKind::Add;
        }
        if left.y() == right.y() && !left.y().is_zero() {
            PairKind::Double
        } else {
            PairKind::Cancel
        }
    }

    #[inline]
    fn needs_inverse(self) -> bool {
        matches!(self, PairKind::Add | PairKind::Double)
    }
}

#[inline]
fn denominator<C: CurveAffine>(kind: PairKind, left: &C, right: &C) -> C::Base {
    match kind {
        PairKind::Double => left.y().double(),
        _ => right.x() - left.x(),
    }
}

/// Finish the addition once the denominator inverse is known
#[inline]
fn finish<C: CurveAffine>(kind: PairKind, left: &C, right: &C, inverse: C::Base) -> C {
    let numerator = match kind {
        PairKind::Double => {
            let xx = left.x().square();
            xx.double() + xx
        }
        _ => right.y() - left.y(),
    };
    let slope = numerator * inverse;
    let x3 = slope.square() - left.x() - right.x();
    let y3 = slope * (left.x() - x3) - left.y();
    C::from_xy_unchecked(x3, y3)
}

/// Add every pair with full case analysis.
///
/// `prefix` must hold at least `left.len()` elements.
pub fn add_pairs_checked<C: CurveAffine>(
    points: &mut [C],
    left: &[u32],
    right: &[u32],
    prefix: &mut [C::Base],
) -> Result<()> {
    let mut acc = C::Base::one();
    for (k, (&l, &r)) in left.iter().zip(right).enumerate() {
        let (a, b) = (&points[l as usize], &points[r as usize]);
        let kind = PairKind::classify(a, b);
        if kind.needs_inverse() {
            prefix[k] = acc;
            acc = acc * denominator(kind, a, b);
        }
    }

    let mut inv = acc.inverse().ok_or(Error::Processing {
        operation: "batch_add",
        details: "zero denominator in checked batch",
    })?;

    for (k, (&l, &r)) in left.iter().zip(right).enumerate().rev() {
        let (a, b) = (points[l as usize], points[r as usize]);
        let kind = PairKind::classify(&a, &b);
        points[l as usize] = match kind {
            PairKind::TakeLeft => a,
            PairKind::TakeRight => b,
            PairKind::Cancel => C::identity(),
            PairKind::Add | PairKind::Double => {
                let d = denominator(kind, &a, &b);
                let d_inv = inv * prefix[k];
                inv = inv * d;
                finish(kind, &a, &b, d_inv)
            }
        };
    }
    Ok(())
}

/// Add every pair as distinct, non-inverse finite points.
///
/// Returns `false` without touching `points` when some pair shares an x
/// coordinate, which shows up as a zero product of denominators.
pub fn add_pairs_unchecked<C: CurveAffine>(
    points: &mut [C],
    left: &[u32],
    right: &[u32],
    prefix: &mut [C::Base],
) -> bool {
    let mut acc = C::Base::one();
    for (k, (&l, &r)) in left.iter().zip(right).enumerate() {
        prefix[k] = acc;
        acc = acc * (points[r as usize].x() - points[l as usize].x());
    }

    let Some(mut inv) = acc.inverse() else {
        return false;
    };

    for (k, (&l, &r)) in left.iter().zip(right).enumerate().rev() {
        let (a, b) = (points[l as usize], points[r as usize]);
        let d = b.x() - a.x();
        let d_inv = inv * prefix[k];
        inv = inv * d;
        points[l as usize] = finish(PairKind::Add, &a, &b, d_inv);
    }
    true
}

/// Per-thread batch adder tracking whether unchecked mode had to give up
#[derive(Debug, Clone, Copy)]
pub struct BatchAdder {
    mode: AdditionMode,
    degraded: bool,
}

impl BatchAdder {
    /// Adder in `mode`
    pub fn new(mode: AdditionMode) -> Self {
        Self {
            mode,
            degraded: false,
        }
    }

    /// True once an unchecked batch hit a collision
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Add one batch of pairs.
    ///
    /// In unchecked mode a colliding batch is recomputed with checked
    /// additions and every later batch on this adder is checked too.
    pub fn add_pairs<C: CurveAffine>(
        &mut self,
        points: &mut [C],
        left: &[u32],
        right: &[u32],
        prefix: &mut [C::Base],
    ) -> Result<()> {
        if left.is_empty() {
            return Ok(());
        }
        if self.mode == AdditionMode::Unchecked && !self.degraded {
            if add_pairs_unchecked(points, left, right, prefix) {
                return Ok(());
            }
            self.degraded = true;
            warn!(
                pairs = left.len(),
                "unchecked batch hit a collision, continuing with checked additions"
            );
        }
        add_pairs_checked(points, left, right, prefix)
    }
}

/// Pair slots at distance `m` inside every bucket of `buckets`.
///
/// Offsets are relative to the start of the first bucket. Returns the
/// number of pairs written to `left` and `right`.
pub fn collect_pairs(
    bounds: &BucketBounds,
    buckets: Range<usize>,
    m: usize,
    left: &mut [u32],
    right: &mut [u32],
) -> usize {
    let base = bounds.span(buckets.clone()).start;
    let mut n = 0;
    for b in buckets {
        let range = bounds.range(b);
        let (start, count) = (range.start - base, range.len());
        let mut j = 0;
        while j + m < count {
            left[n] = (start + j) as u32;
            right[n] = (start + j + m) as u32;
            n += 1;
            j += 2 * m;
        }
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::BucketCounters;
    use dmsm_algorithms::ec::bls12_381::{Fp, G1Affine, G1Projective};
    use dmsm_api::CurveProjective;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn random_points(n: usize, seed: u64) -> Vec<G1Affine> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let points: Vec<G1Projective> = (0..n).map(|_| G1Projective::random(&mut rng)).collect();
        G1Projective::batch_to_affine(&points)
    }

    fn expected_sums(points: &[G1Affine], left: &[u32], right: &[u32]) -> Vec<G1Affine> {
        left.iter()
            .zip(right)
            .map(|(&l, &r)| {
                G1Affine::from(G1Projective::from(points[l as usize]) + G1Projective::from(points[r as usize]))
            })
            .collect()
    }

    #[test]
    fn test_classify() {
        let pts = random_points(2, 1);
        let (p, q) = (pts[0], pts[1]);
        let id = G1Affine::identity();
        assert_eq!(PairKind::classify(&p, &q), PairKind::Add);
        assert_eq!(PairKind::classify(&p, &p), PairKind::Double);
        assert_eq!(PairKind::classify(&p, &-p), PairKind::Cancel);
        assert_eq!(PairKind::classify(&p, &id), PairKind::TakeLeft);
        assert_eq!(PairKind::classify(&id, &q), PairKind::TakeRight);
        assert_eq!(PairKind::classify(&id, &id), PairKind::TakeRight);
    }

    #[test]
    fn test_distinct_pairs_both_modes() {
        let points = random_points(64, 2);
        let left: Vec<u32> = (0..32).map(|i| 2 * i).collect();
        let right: Vec<u32> = (0..32).map(|i| 2 * i + 1).collect();
        let want = expected_sums(&points, &left, &right);
        let mut prefix = vec![Fp::zero(); 32];

        let mut checked = points.clone();
        add_pairs_checked(&mut checked, &left, &right, &mut prefix).unwrap();
        let mut unchecked = points.clone();
        assert!(add_pairs_unchecked(&mut unchecked, &left, &right, &mut prefix));

        for (k, &l) in left.iter().enumerate() {
            assert_eq!(checked[l as usize], want[k]);
            assert_eq!(unchecked[l as usize], want[k]);
            assert!(bool::from(checked[l as usize].is_on_curve()));
        }
        // right slots are left alone
        for &r in &right {
            assert_eq!(checked[r as usize], points[r as usize]);
        }
    }

    #[test]
    fn test_checked_edge_cases() {
        let pts = random_points(3, 3);
        let (p, q, r) = (pts[0], pts[1], pts[2]);
        let id = G1Affine::identity();
        // slots: (p, p) (q, -q) (id, r) (r, id) (id, id) (p, q)
        let mut points = vec![p, p, q, -q, id, r, r, id, id, id, p, q];
        let left = [0u32, 2, 4, 6, 8, 10];
        let right = [1u32, 3, 5, 7, 9, 11];
        let mut prefix = vec![Fp::zero(); left.len()];
        add_pairs_checked(&mut points, &left, &right, &mut prefix).unwrap();

        assert_eq!(points[0], G1Affine::from(G1Projective::from(p).double()));
        assert_eq!(points[2], id);
        assert_eq!(points[4], r);
        assert_eq!(points[6], r);
        assert_eq!(points[8], id);
        assert_eq!(points[10], G1Affine::from(G1Projective::from(p) + G1Projective::from(q)));
    }

    #[test]
    fn test_unchecked_collision_falls_back() {
        let pts = random_points(3, 4);
        let (p, q) = (pts[0], pts[1]);
        let mut points = vec![p, q, q, -q, p, p];
        let left = [0u32, 2, 4];
        let right = [1u32, 3, 5];
        let mut prefix = vec![Fp::zero(); 3];

        let untouched = points.clone();
        assert!(!add_pairs_unchecked(&mut points, &left, &right, &mut prefix));
        assert_eq!(points, untouched);

        let mut adder = BatchAdder::new(AdditionMode::Unchecked);
        adder.add_pairs(&mut points, &left, &right, &mut prefix).unwrap();
        assert!(adder.is_degraded());
        assert_eq!(points[0], G1Affine::from(G1Projective::from(p) + G1Projective::from(q)));
        assert_eq!(points[2], G1Affine::identity());
        assert_eq!(points[4], G1Affine::from(G1Projective::from(p).double()));
    }

    #[test]
    fn test_checked_adder_never_degrades() {
        let pts = random_points(2, 5);
        let mut points = vec![pts[0], pts[0]];
        let mut prefix = vec![Fp::zero(); 1];
        let mut adder = BatchAdder::new(AdditionMode::Checked);
        adder.add_pairs(&mut points, &[0], &[1], &mut prefix).unwrap();
        assert!(!adder.is_degraded());
        adder.add_pairs::<G1Affine>(&mut points, &[], &[], &mut prefix).unwrap();
    }

    #[test]
    fn test_collect_pairs_schedule() {
        // bucket sizes 5, 0, 2, 1
        let counters = BucketCounters::new(4);
        for (bucket, n) in [(0usize, 5usize), (2, 2), (3, 1)] {
            for _ in 0..n {
                counters.record(bucket);
            }
        }
        let bounds = counters.prefix_sum().unwrap();
        let mut left = vec![0u32; 8];
        let mut right = vec![0u32; 8];

        let n = collect_pairs(&bounds, 0..4, 1, &mut left, &mut right);
        assert_eq!(&left[..n], &[0, 2, 5]);
        assert_eq!(&right[..n], &[1, 3, 6]);

        let n = collect_pairs(&bounds, 0..4, 2, &mut left, &mut right);
        assert_eq!(&left[..n], &[0]);
        assert_eq!(&right[..n], &[2]);

        let n = collect_pairs(&bounds, 0..4, 4, &mut left, &mut right);
        assert_eq!(&left[..n], &[0]);
        assert_eq!(&right[..n], &[4]);

        // offsets are relative to the first bucket of the range
        let n = collect_pairs(&bounds, 2..4, 1, &mut left, &mut right);
        assert_eq!(&left[..n], &[0]);
        assert_eq!(&right[..n], &[1]);
    }

    #[test]
    fn test_passes_fold_bucket_into_first_slot() {
        let counters = BucketCounters::new(1);
        for _ in 0..13 {
            counters.record(0);
        }
        let bounds = counters.prefix_sum().unwrap();
        let mut points = random_points(13, 6);
        let want = G1Affine::from(points.iter().map(G1Projective::from).sum::<G1Projective>());

        let mut left = vec![0u32; 6];
        let mut right = vec![0u32; 6];
        let mut prefix = vec![Fp::zero(); 6];
        let mut adder = BatchAdder::new(AdditionMode::Unchecked);
        let mut m = 1;
        while m < bounds.max_bucket() {
            let n = collect_pairs(&bounds, 0..1, m, &mut left, &mut right);
            adder
                .add_pairs(&mut points, &left[..n], &right[..n], &mut prefix)
                .unwrap();
            m *= 2;
        }
        assert_eq!(points[0], want);
    }
}
