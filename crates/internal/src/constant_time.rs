//! Branch-free selection on 256-bit two's complement limbs

use subtle::{Choice, ConditionallySelectable};

use crate::arith::neg_256;

#[inline]
fn is_negative_256(v: &[u64; 4]) -> Choice {
    Choice::from((v[3] >> 63) as u8)
}

/// Returns `-v` if `choice` is set, `v` otherwise
#[inline]
pub fn conditional_negate_256(v: &[u64; 4], choice: Choice) -> [u64; 4] {
    let neg = neg_256(v);
    [
        u64::conditional_select(&v[0], &neg[0], choice),
        u64::conditional_select(&v[1], &neg[1], choice),
        u64::conditional_select(&v[2], &neg[2], choice),
        u64::conditional_select(&v[3], &neg[3], choice),
    ]
}

/// Splits a 256-bit two's complement value into `(|v|, v < 0)`
#[inline]
pub fn abs_256(v: &[u64; 4]) -> ([u64; 4], Choice) {
    let negative = is_negative_256(v);
    (conditional_negate_256(v, negative), negative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abs_256() {
        let minus_five = neg_256(&[5, 0, 0, 0]);
        let (mag, neg) = abs_256(&minus_five);
        assert_eq!(mag, [5, 0, 0, 0]);
        assert!(bool::from(neg));

        let (mag, neg) = abs_256(&[7, 0, 0, 0]);
        assert_eq!(mag, [7, 0, 0, 0]);
        assert!(!bool::from(neg));

        let (mag, neg) = abs_256(&[0; 4]);
        assert_eq!(mag, [0; 4]);
        assert!(!bool::from(neg));
    }

    #[test]
    fn test_conditional_negate_keeps_value_when_unset() {
        let v = [1, 2, 3, 4];
        assert_eq!(conditional_negate_256(&v, Choice::from(0)), v);
        assert_eq!(conditional_negate_256(&v, Choice::from(1)), neg_256(&v));
    }
}
