//! Prime field contract

use core::fmt::Debug;
use core::ops::{Add, Mul, Neg, Sub};

/// Arithmetic of a prime field as used by affine point formulas.
///
/// Elements are small `Copy` values; every operation is total except
/// [`Field::inverse`], which fails only on zero.
pub trait Field:
    Copy
    + Clone
    + Debug
    + Default
    + PartialEq
    + Eq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    /// Additive identity
    fn zero() -> Self;

    /// Multiplicative identity
    fn one() -> Self;

    /// Returns true for the additive identity
    fn is_zero(&self) -> bool;

    /// Returns `self * self`
    fn square(&self) -> Self;

    /// Returns `self + self`
    fn double(&self) -> Self;

    /// Multiplicative inverse, `None` for zero
    fn inverse(&self) -> Option<Self>;

    /// Inverts every non-zero element in place with a single field inversion.
    ///
    /// Zero entries are left untouched.
    fn batch_inverse(values: &mut [Self]) {
        let mut prefix = Vec::with_capacity(values.len());
        let mut acc = Self::one();
        for v in values.iter() {
            prefix.push(acc);
            if !v.is_zero() {
                acc = acc * *v;
            }
        }

        // product of non-zero elements, never zero
        let Some(mut inv) = acc.inverse() else {
            return;
        };

        for (v, p) in values.iter_mut().zip(prefix).rev() {
            if v.is_zero() {
                continue;
            }
            let next = inv * *v;
            *v = inv * p;
            inv = next;
        }
    }
}
