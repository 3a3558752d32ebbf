//! Constants for BLS12-381 G1 and its GLV decomposition

/// BLS parameter x = -0xd201000000010000
pub const BLS_X: u64 = 0xd201_0000_0001_0000;

/// Sign of BLS parameter x
pub const BLS_X_IS_NEGATIVE: bool = true;

/// x^2, the first coordinate of the short basis vector v1 = (x^2, 1)
pub const BLS_X_SQUARED: u128 = 0xac45_a401_0001_a402_0000_0001_0000_0000;

/// Scalar field modulus q, little-endian limbs
pub const SCALAR_MODULUS: [u64; 4] = [
    0xffff_ffff_0000_0001,
    0x53bd_a402_fffe_5bfe,
    0x3339_d808_09a1_d805,
    0x73ed_a753_299d_7d48,
];

/// Bit length of the scalar field modulus
pub const SCALAR_BITS: u32 = 255;

/// Eigenvalue of (x, y) -> (beta * x, y): lambda = -x^2 mod q
pub const GLV_LAMBDA: [u64; 4] = [
    0xffff_fffe_0000_0001,
    0xa778_0001_fffc_b7fc,
    0x3339_d808_09a1_d804,
    0x73ed_a753_299d_7d48,
];

/// round(2^256 * (x^2 - 1) / q)
pub const GLV_G1: [u64; 4] = [0x63f6_e522_f6cf_ee2e, 0x7c6b_ecf1_e01f_aadd, 0x1, 0x0];

/// round(2^256 / q)
pub const GLV_G2: [u64; 4] = [0x2, 0x0, 0x0, 0x0];

/// Half-scalars produced by the decomposition stay below x^2 < 2^128
pub const GLV_MAX_BITS: u32 = 128;
