//! GLV scalar decomposition
//!
//! A scalar `s < q` is split into two half-length signed parts with
//! `s ≡ k1 + k2·λ (mod q)` by rounding `s` against a short basis of the
//! lattice `{(a, b) : a + b·λ ≡ 0 (mod q)}`. All intermediate values are
//! 256-bit two's complement and the only branches depend on the curve
//! constants, never on the scalar.

use dmsm_api::{validate, GlvCurve, GlvParameters, LatticeScalar, Result};
use dmsm_internal::arith::{from_u128, low_u128, lt_256, mul_shift_round, mul_wide, sub_256};
use dmsm_internal::constant_time::{abs_256, conditional_negate_256};
use subtle::Choice;

/// Signed half-scalars with `s ≡ ±s0 ± s1·λ (mod q)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decomposition {
    /// Magnitude of the first half
    pub s0: u128,
    /// Magnitude of the second half, multiplied by `λ`
    pub s1: u128,
    /// First half is negative
    pub neg0: bool,
    /// Second half is negative
    pub neg1: bool,
}

/// Splits canonical scalars using precomputed lattice constants
#[derive(Debug, Clone, Copy)]
pub struct GlvDecomposer {
    params: &'static GlvParameters,
}

impl GlvDecomposer {
    /// Decomposer for an explicit parameter set
    pub fn new(params: &'static GlvParameters) -> Self {
        Self { params }
    }

    /// Decomposer for the scalar field of `C`
    pub fn for_curve<C: GlvCurve>() -> Self {
        Self::new(C::glv_parameters())
    }

    /// Lattice constants in use
    pub fn parameters(&self) -> &'static GlvParameters {
        self.params
    }

    /// Bit bound on either half-scalar
    pub fn half_bits(&self) -> u32 {
        self.params.max_bits
    }

    /// Decompose canonical little-endian limbs, rejecting values `>= q`
    pub fn decompose(&self, scalar: &[u64; 4]) -> Result<Decomposition> {
        validate::parameter(
            lt_256(scalar, &self.params.modulus),
            "scalar",
            "value is not below the group order",
        )?;
        Ok(self.decompose_reduced(scalar))
    }

    /// Decompose limbs already known to be below `q`
    pub(crate) fn decompose_reduced(&self, scalar: &[u64; 4]) -> Decomposition {
        let p = self.params;

        // c1 = round(s·b2 / q), c2 = round(-s·b1 / q)
        let c1 = conditional_negate_256(&mul_shift_round(scalar, &p.g1), sign(p.b2));
        let c2 = conditional_negate_256(&mul_shift_round(scalar, &p.g2), !sign(p.b1));

        // k1 = s - c1·a1 - c2·a2
        let k1 = sub_256(
            &sub_256(scalar, &mul_signed(&c1, p.a1)),
            &mul_signed(&c2, p.a2),
        );
        // k2 = -c1·b1 - c2·b2
        let k2 = sub_256(
            &sub_256(&[0; 4], &mul_signed(&c1, p.b1)),
            &mul_signed(&c2, p.b2),
        );

        let (m0, neg0) = abs_256(&k1);
        let (m1, neg1) = abs_256(&k2);
        debug_assert!(m0[2] == 0 && m0[3] == 0, "first half exceeds 128 bits");
        debug_assert!(m1[2] == 0 && m1[3] == 0, "second half exceeds 128 bits");

        Decomposition {
            s0: low_u128(&m0),
            s1: low_u128(&m1),
            neg0: bool::from(neg0),
            neg1: bool::from(neg1),
        }
    }
}

#[inline]
fn sign(v: LatticeScalar) -> Choice {
    Choice::from(v.negative as u8)
}

/// Wrapping product of a two's complement value and a signed lattice coordinate
#[inline]
fn mul_signed(c: &[u64; 4], v: LatticeScalar) -> [u64; 4] {
    let wide = mul_wide(c, &from_u128(v.magnitude));
    conditional_negate_256(&[wide[0], wide[1], wide[2], wide[3]], sign(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmsm_algorithms::ec::bls12_381::{G1Affine, Scalar};
    use dmsm_api::MsmScalar;
    use dmsm_params::curves::bls12_381::{GLV_LAMBDA, SCALAR_MODULUS};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn decomposer() -> GlvDecomposer {
        GlvDecomposer::for_curve::<G1Affine>()
    }

    fn lift(magnitude: u128, negative: bool) -> Scalar {
        let s = Scalar::from_raw(from_u128(magnitude));
        if negative {
            -s
        } else {
            s
        }
    }

    fn recompose(d: &Decomposition) -> Scalar {
        let lambda = Scalar::from_raw(decomposer().parameters().lambda);
        lift(d.s0, d.neg0) + lift(d.s1, d.neg1) * lambda
    }

    fn check(s: &Scalar) {
        let d = decomposer().decompose(&s.to_canonical_limbs()).unwrap();
        assert_eq!(recompose(&d), *s, "decomposition of {:?}", s);
        assert!(d.s0 < 1u128 << 127 && d.s1 < 1u128 << 127);
    }

    #[test]
    fn test_small_values() {
        let d = decomposer();
        assert_eq!(d.decompose(&[0; 4]).unwrap(), Decomposition::default());
        assert_eq!(
            d.decompose(&[1, 0, 0, 0]).unwrap(),
            Decomposition {
                s0: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_order_minus_one() {
        let q_minus_one = sub_256(&SCALAR_MODULUS, &[1, 0, 0, 0]);
        let d = decomposer().decompose(&q_minus_one).unwrap();
        assert_eq!(
            d,
            Decomposition {
                s0: 1,
                s1: 0,
                neg0: true,
                neg1: false,
            }
        );
    }

    #[test]
    fn test_edge_scalars_roundtrip() {
        let half = Scalar::from(2u64).invert().unwrap();
        for s in [
            Scalar::zero(),
            Scalar::one(),
            -Scalar::one(),
            half,
            half + Scalar::one(),
            half - Scalar::one(),
            Scalar::from_raw(GLV_LAMBDA),
        ] {
            check(&s);
        }
    }

    #[test]
    fn test_random_scalars_roundtrip() {
        let mut rng = ChaCha20Rng::seed_from_u64(0x91f);
        for _ in 0..1000 {
            check(&Scalar::random(&mut rng));
        }
    }

    #[test]
    fn test_rejects_unreduced() {
        let d = decomposer();
        assert!(d.decompose(&SCALAR_MODULUS).is_err());
        assert!(d.decompose(&[u64::MAX; 4]).is_err());
    }

    proptest! {
        #[test]
        fn prop_roundtrip(limbs in any::<[u64; 4]>()) {
            let mut limbs = limbs;
            limbs[3] &= 0x7fff_ffff_ffff_ffff;
            prop_assume!(lt_256(&limbs, &SCALAR_MODULUS));
            let s = Scalar::from_canonical_limbs(limbs).unwrap();
            let d = decomposer().decompose(&limbs).unwrap();
            prop_assert_eq!(recompose(&d), s);
            prop_assert!(d.s0 >> 127 == 0);
            prop_assert!(d.s1 >> 127 == 0);
        }
    }
}
