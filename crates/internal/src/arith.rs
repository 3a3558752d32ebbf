//! Multi-precision limb arithmetic on little-endian `u64` limbs

/// Compute a + b + carry, returning (result, carry)
#[inline(always)]
pub const fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let ret = (a as u128) + (b as u128) + (carry as u128);
    (ret as u64, (ret >> 64) as u64)
}

/// Compute a - (b + borrow), returning (result, borrow)
///
/// The returned borrow is either 0 or `u64::MAX`.
#[inline(always)]
pub const fn sbb(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let ret = (a as u128).wrapping_sub((b as u128) + ((borrow >> 63) as u128));
    (ret as u64, (ret >> 64) as u64)
}

/// Compute a + (b * c) + carry, returning (result, carry)
#[inline(always)]
pub const fn mac(a: u64, b: u64, c: u64, carry: u64) -> (u64, u64) {
    let ret = (a as u128) + ((b as u128) * (c as u128)) + (carry as u128);
    (ret as u64, (ret >> 64) as u64)
}

/// Schoolbook 256 x 256 -> 512 bit product
pub const fn mul_wide(a: &[u64; 4], b: &[u64; 4]) -> [u64; 8] {
    let mut out = [0u64; 8];
    let mut i = 0;
    while i < 4 {
        let mut carry = 0;
        let mut j = 0;
        while j < 4 {
            let (lo, hi) = mac(out[i + j], a[i], b[j], carry);
            out[i + j] = lo;
            carry = hi;
            j += 1;
        }
        out[i + 4] = carry;
        i += 1;
    }
    out
}

/// Wrapping 256-bit subtraction
#[inline]
pub const fn sub_256(a: &[u64; 4], b: &[u64; 4]) -> [u64; 4] {
    let (d0, borrow) = sbb(a[0], b[0], 0);
    let (d1, borrow) = sbb(a[1], b[1], borrow);
    let (d2, borrow) = sbb(a[2], b[2], borrow);
    let (d3, _) = sbb(a[3], b[3], borrow);
    [d0, d1, d2, d3]
}

/// Two's complement negation modulo 2^256
#[inline]
pub const fn neg_256(a: &[u64; 4]) -> [u64; 4] {
    sub_256(&[0; 4], a)
}

/// Returns true when `a < b` as unsigned 256-bit integers
#[inline]
pub const fn lt_256(a: &[u64; 4], b: &[u64; 4]) -> bool {
    let (_, borrow) = sbb(a[0], b[0], 0);
    let (_, borrow) = sbb(a[1], b[1], borrow);
    let (_, borrow) = sbb(a[2], b[2], borrow);
    let (_, borrow) = sbb(a[3], b[3], borrow);
    borrow != 0
}

/// Widen a `u128` to four limbs
#[inline(always)]
pub const fn from_u128(v: u128) -> [u64; 4] {
    [v as u64, (v >> 64) as u64, 0, 0]
}

/// Low 128 bits of a 256-bit value
#[inline(always)]
pub const fn low_u128(v: &[u64; 4]) -> u128 {
    (v[0] as u128) | ((v[1] as u128) << 64)
}

/// `(a * b + 2^255) >> 256`, the product of `a` and `b / 2^256` rounded to nearest
pub const fn mul_shift_round(a: &[u64; 4], b: &[u64; 4]) -> [u64; 4] {
    let wide = mul_wide(a, b);
    let (_, carry) = adc(wide[3], 1 << 63, 0);
    let (d0, carry) = adc(wide[4], 0, carry);
    let (d1, carry) = adc(wide[5], 0, carry);
    let (d2, carry) = adc(wide[6], 0, carry);
    let (d3, _) = adc(wide[7], 0, carry);
    [d0, d1, d2, d3]
}
