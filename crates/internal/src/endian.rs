//! Conversions between byte strings and little-endian limb arrays

#[inline(always)]
fn u64_from_le_bytes(bytes: &[u8]) -> u64 {
    u64::from_le_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}

#[inline(always)]
fn u64_from_be_bytes(bytes: &[u8]) -> u64 {
    u64::from_be_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}

/// Little-endian bytes to little-endian limbs
pub fn limbs_from_le_bytes<const N: usize, const B: usize>(bytes: &[u8; B]) -> [u64; N] {
    debug_assert_eq!(B, N * 8);
    let mut limbs = [0u64; N];
    for (limb, chunk) in limbs.iter_mut().zip(bytes.chunks_exact(8)) {
        *limb = u64_from_le_bytes(chunk);
    }
    limbs
}

/// Big-endian bytes to little-endian limbs
pub fn limbs_from_be_bytes<const N: usize, const B: usize>(bytes: &[u8; B]) -> [u64; N] {
    debug_assert_eq!(B, N * 8);
    let mut limbs = [0u64; N];
    for (limb, chunk) in limbs.iter_mut().rev().zip(bytes.chunks_exact(8)) {
        *limb = u64_from_be_bytes(chunk);
    }
    limbs
}

/// Little-endian limbs to little-endian bytes
pub fn limbs_to_le_bytes<const N: usize, const B: usize>(limbs: &[u64; N]) -> [u8; B] {
    debug_assert_eq!(B, N * 8);
    let mut out = [0u8; B];
    for (chunk, limb) in out.chunks_exact_mut(8).zip(limbs.iter()) {
        chunk.copy_from_slice(&limb.to_le_bytes());
    }
    out
}

/// Little-endian limbs to big-endian bytes
pub fn limbs_to_be_bytes<const N: usize, const B: usize>(limbs: &[u64; N]) -> [u8; B] {
    debug_assert_eq!(B, N * 8);
    let mut out = [0u8; B];
    for (chunk, limb) in out.chunks_exact_mut(8).zip(limbs.iter().rev()) {
        chunk.copy_from_slice(&limb.to_be_bytes());
    }
    out
}
