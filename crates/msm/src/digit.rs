//! Signed-digit recoding of half-scalars

use dmsm_api::{validate, Result};
use dmsm_params::msm::{MAX_WINDOW_BITS, MIN_WINDOW_BITS};

/// One window of a signed recoding.
///
/// The digit value is `magnitude` when `carry` is clear and `-magnitude`
/// when it is set; a set carry adds one to the next window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignedDigit {
    /// Absolute value, at most `2^(c-1)`
    pub magnitude: u32,
    /// Digit is negative and borrows one from the next window
    pub carry: bool,
}

impl SignedDigit {
    /// True for a zero digit, which contributes to no bucket
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.magnitude == 0
    }

    /// Digit value as a signed integer
    #[inline]
    pub fn value(&self) -> i64 {
        if self.carry {
            -(self.magnitude as i64)
        } else {
            self.magnitude as i64
        }
    }
}

/// Window size and the bucket layout it implies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    /// Half-scalar bit length `b`
    pub scalar_bits: u32,
    /// Window size `c`
    pub window: u32,
    /// Number of partitions `K = ⌈(b + 1) / c⌉`
    pub partitions: usize,
    /// Buckets per partition `L = 2^(c-1)`
    pub buckets_per_partition: usize,
}

impl WindowGeometry {
    /// Geometry for `scalar_bits`-bit half-scalars and a `window`-bit window
    pub fn new(scalar_bits: u32, window: u32) -> Result<Self> {
        validate::parameter(
            (MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&window),
            "window",
            "window size must be between 2 and 20 bits",
        )?;
        validate::parameter(
            scalar_bits > 0 && scalar_bits <= 128,
            "scalar_bits",
            "half-scalars are at most 128 bits",
        )?;
        Ok(Self {
            scalar_bits,
            window,
            partitions: (scalar_bits + window) as usize / window as usize,
            buckets_per_partition: 1 << (window - 1),
        })
    }

    /// Total bucket count `K·L`
    #[inline]
    pub fn total_buckets(&self) -> usize {
        self.partitions * self.buckets_per_partition
    }

    /// Flat bucket id of bucket `l ∈ [1, L]` in partition `k`
    #[inline]
    pub fn bucket_id(&self, partition: usize, magnitude: u32) -> usize {
        partition * self.buckets_per_partition + magnitude as usize - 1
    }

    /// Partition of a flat bucket id
    #[inline]
    pub fn partition_of(&self, bucket: usize) -> usize {
        bucket / self.buckets_per_partition
    }

    /// Iterate the signed digits of `scalar`, lowest window first
    #[inline]
    pub fn digits(&self, scalar: u128) -> SignedDigits {
        SignedDigits {
            scalar,
            window: self.window,
            partitions: self.partitions,
            next: 0,
            carry: false,
        }
    }
}

/// Iterator over `(partition, digit)` pairs of a half-scalar
#[derive(Debug, Clone)]
pub struct SignedDigits {
    scalar: u128,
    window: u32,
    partitions: usize,
    next: usize,
    carry: bool,
}

impl Iterator for SignedDigits {
    type Item = (usize, SignedDigit);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.partitions {
            return None;
        }
        let k = self.next;
        self.next += 1;

        let shift = k as u32 * self.window;
        let bits = if shift >= 128 {
            0
        } else {
            ((self.scalar >> shift) as u32) & ((1u32 << self.window) - 1)
        };
        let raw = bits + self.carry as u32;
        let half = 1u32 << (self.window - 1);

        let digit = if raw > half {
            SignedDigit {
                magnitude: (1u32 << self.window) - raw,
                carry: true,
            }
        } else {
            SignedDigit {
                magnitude: raw,
                carry: false,
            }
        };
        self.carry = digit.carry;
        Some((k, digit))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.partitions - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for SignedDigits {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Σ digit_k · 2^(k·c) mod 2^128
    fn recompose(geometry: &WindowGeometry, scalar: u128) -> u128 {
        geometry.digits(scalar).fold(0u128, |acc, (k, d)| {
            let shift = k as u32 * geometry.window;
            if shift >= 128 {
                return acc;
            }
            acc.wrapping_add((d.value() as i128 as u128).wrapping_shl(shift))
        })
    }

    #[test]
    fn test_geometry() {
        let g = WindowGeometry::new(128, 16).unwrap();
        assert_eq!(g.partitions, 9);
        assert_eq!(g.buckets_per_partition, 1 << 15);
        assert_eq!(g.total_buckets(), 9 << 15);
        assert_eq!(g.bucket_id(2, 1), 2 << 15);
        assert_eq!(g.partition_of(g.bucket_id(3, 1 << 15)), 3);

        assert_eq!(WindowGeometry::new(128, 2).unwrap().partitions, 65);
        assert_eq!(WindowGeometry::new(128, 3).unwrap().partitions, 43);
        assert!(WindowGeometry::new(128, 1).is_err());
        assert!(WindowGeometry::new(128, 21).is_err());
        assert!(WindowGeometry::new(129, 8).is_err());
    }

    #[test]
    fn test_known_recoding() {
        // 0b111 with c = 2: raw windows 3, 1 -> (-1, carry), 1 + 1 = 2 -> (2)
        let g = WindowGeometry::new(3, 2).unwrap();
        let digits: Vec<i64> = g.digits(7).map(|(_, d)| d.value()).collect();
        assert_eq!(digits, vec![-1, 2]);
    }

    #[test]
    fn test_full_window_with_carry_is_zero() {
        // both windows all ones: second raw = 3 + 1 = 4 = 2^c -> zero digit, carry
        let g = WindowGeometry::new(5, 2).unwrap();
        let digits: Vec<SignedDigit> = g.digits(0b01111).map(|(_, d)| d).collect();
        assert_eq!(digits[0], SignedDigit { magnitude: 1, carry: true });
        assert_eq!(digits[1], SignedDigit { magnitude: 0, carry: true });
        assert!(digits[1].is_zero());
        assert_eq!(digits[2], SignedDigit { magnitude: 1, carry: false });
    }

    #[test]
    fn test_max_half_scalar() {
        for c in MIN_WINDOW_BITS..=MAX_WINDOW_BITS {
            let g = WindowGeometry::new(128, c).unwrap();
            let last = g.digits(u128::MAX).last().unwrap().1;
            assert!(!last.carry, "window {} carried out", c);
            assert_eq!(recompose(&g, u128::MAX), u128::MAX);
        }
    }

    proptest! {
        #[test]
        fn prop_digits_recompose(scalar in any::<u128>(), c in MIN_WINDOW_BITS..=MAX_WINDOW_BITS) {
            let g = WindowGeometry::new(128, c).unwrap();
            let half = 1u32 << (c - 1);
            let mut last_carry = false;
            for (_, d) in g.digits(scalar) {
                prop_assert!(d.magnitude <= half);
                last_carry = d.carry;
            }
            prop_assert!(!last_carry);
            prop_assert_eq!(recompose(&g, scalar), scalar);
        }
    }
}
