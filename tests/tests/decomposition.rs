//! GLV decomposition checked against scalar and group arithmetic

use dmsm_algorithms::ec::bls12_381::{G1Affine, G1Projective, Scalar};
use dmsm_api::MsmScalar;
use dmsm_msm::{Decomposition, GlvDecomposer};
use dmsm_params::curves::bls12_381::{GLV_LAMBDA, SCALAR_MODULUS};
use dmsm_tests::rng;
use proptest::prelude::*;

fn half(magnitude: u128, negative: bool) -> Scalar {
    let s = Scalar::from_canonical_limbs([magnitude as u64, (magnitude >> 64) as u64, 0, 0])
        .unwrap();
    if negative {
        -s
    } else {
        s
    }
}

fn recompose(d: &Decomposition) -> Scalar {
    let lambda = Scalar::from_canonical_limbs(GLV_LAMBDA).unwrap();
    half(d.s0, d.neg0) + half(d.s1, d.neg1) * lambda
}

fn check(decomposer: &GlvDecomposer, s: &Scalar) {
    let d = decomposer.decompose(&s.to_canonical_limbs()).unwrap();
    assert!(128 - d.s0.leading_zeros() <= decomposer.half_bits());
    assert!(128 - d.s1.leading_zeros() <= decomposer.half_bits());
    assert_eq!(recompose(&d), *s, "{:?}", d);
}

fn sub_small(limbs: [u64; 4], k: u64) -> [u64; 4] {
    let mut out = limbs;
    let mut borrow = k;
    for limb in out.iter_mut() {
        let (v, b) = limb.overflowing_sub(borrow);
        *limb = v;
        borrow = b as u64;
    }
    out
}

fn half_modulus(limbs: [u64; 4]) -> [u64; 4] {
    let mut out = [0u64; 4];
    for i in 0..4 {
        out[i] = limbs[i] >> 1;
        if i < 3 {
            out[i] |= limbs[i + 1] << 63;
        }
    }
    out
}

#[test]
fn edge_scalars_round_trip() {
    let decomposer = GlvDecomposer::for_curve::<G1Affine>();
    let q_minus_1 = sub_small(SCALAR_MODULUS, 1);
    let half_q = half_modulus(SCALAR_MODULUS);
    let edges = [
        [0u64; 4],
        [1, 0, 0, 0],
        q_minus_1,
        half_q,
        sub_small(half_q, 1),
        [half_q[0] + 1, half_q[1], half_q[2], half_q[3]],
        GLV_LAMBDA,
    ];
    for limbs in edges {
        let s = Scalar::from_canonical_limbs(limbs).unwrap();
        check(&decomposer, &s);
    }
}

#[test]
fn q_minus_one_splits_to_minus_one() {
    let decomposer = GlvDecomposer::for_curve::<G1Affine>();
    let d = decomposer
        .decompose(&sub_small(SCALAR_MODULUS, 1))
        .unwrap();
    assert_eq!(
        d,
        Decomposition {
            s0: 1,
            neg0: true,
            s1: 0,
            neg1: false,
        }
    );
}

#[test]
fn modulus_is_rejected() {
    let decomposer = GlvDecomposer::for_curve::<G1Affine>();
    assert!(decomposer.decompose(&SCALAR_MODULUS).is_err());
    assert!(decomposer.decompose(&[u64::MAX; 4]).is_err());
}

#[test]
fn halves_apply_to_points() {
    let decomposer = GlvDecomposer::for_curve::<G1Affine>();
    let mut rng = rng(17);
    for _ in 0..16 {
        let s = Scalar::random(&mut rng);
        let p = G1Affine::from(G1Projective::random(&mut rng));
        let d = decomposer.decompose(&s.to_canonical_limbs()).unwrap();
        let lhs = &p * &half(d.s0, d.neg0)
            + &p.endomorphism() * &half(d.s1, d.neg1);
        assert_eq!(lhs, &p * &s);
    }
}

proptest! {
    #[test]
    fn random_scalars_round_trip(seed in any::<u64>()) {
        let decomposer = GlvDecomposer::for_curve::<G1Affine>();
        let s = Scalar::random(&mut rng(seed));
        let d = decomposer.decompose(&s.to_canonical_limbs()).unwrap();
        prop_assert!(128 - d.s0.leading_zeros() <= decomposer.half_bits());
        prop_assert!(128 - d.s1.leading_zeros() <= decomposer.half_bits());
        prop_assert_eq!(recompose(&d), s);
    }
}
