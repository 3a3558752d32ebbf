//! Cross-crate checks of the pieces the engine is built from

use std::sync::atomic::{AtomicUsize, Ordering};

use dmsm_algorithms::ec::bls12_381::{Fp, G1Affine, G1Projective, Scalar};
use dmsm_api::Field;
use dmsm_msm::reduce::triangle_sum;
use dmsm_msm::{WindowGeometry, WorkerPool};
use dmsm_tests::rng;
use proptest::prelude::*;

#[test]
fn batch_inversion_with_zeros() {
    let mut rng = rng(40);
    let mut values: Vec<Fp> = (0..257).map(|_| Fp::random(&mut rng)).collect();
    for i in (0..values.len()).step_by(10) {
        values[i] = Fp::zero();
    }
    let expected: Vec<Fp> = values
        .iter()
        .map(|v| Field::inverse(v).unwrap_or_else(Fp::zero))
        .collect();

    Fp::batch_inverse(&mut values);
    assert_eq!(values, expected);
}

#[test]
fn triangle_sum_weights_buckets_by_index() {
    let g = G1Projective::generator();
    let buckets: Vec<G1Affine> = (1..=16u64)
        .map(|l| G1Affine::from(g * Scalar::from(l)))
        .collect();
    assert_eq!(triangle_sum(&buckets), g * Scalar::from(1496u64));
}

#[test]
fn triangle_sum_skips_empty_buckets() {
    let g = G1Affine::generator();
    let mut buckets = vec![G1Affine::identity(); 8];
    buckets[2] = g;
    buckets[7] = g;
    // 3·G + 8·G
    assert_eq!(
        triangle_sum(&buckets),
        G1Projective::generator() * Scalar::from(11u64)
    );
}

#[test]
fn pool_phases_are_ordered() {
    let pool = WorkerPool::start(6).unwrap();
    let arrived = AtomicUsize::new(0);
    let seen = pool.run(|ctx| {
        arrived.fetch_add(1, Ordering::SeqCst);
        ctx.barrier();
        let count = arrived.load(Ordering::SeqCst);
        ctx.barrier();
        (ctx.id(), count)
    });
    assert_eq!(seen.len(), 6);
    for (id, (got, count)) in seen.into_iter().enumerate() {
        assert_eq!(got, id);
        assert_eq!(count, 6);
    }
    pool.stop();
}

fn recompose(geometry: &WindowGeometry, scalar: u128) -> Scalar {
    let radix = Scalar::from(1u64 << geometry.window);
    let mut acc = Scalar::zero();
    let digits: Vec<_> = geometry.digits(scalar).collect();
    for (_, digit) in digits.into_iter().rev() {
        let magnitude = Scalar::from(digit.value().unsigned_abs());
        acc = acc * radix + if digit.value() < 0 { -magnitude } else { magnitude };
    }
    acc
}

proptest! {
    #[test]
    fn signed_digits_recompose(scalar in any::<u128>(), c in 2u32..=16) {
        let geometry = WindowGeometry::new(128, c).unwrap();
        let limbs = [scalar as u64, (scalar >> 64) as u64, 0, 0];
        let want = <Scalar as dmsm_api::MsmScalar>::from_canonical_limbs(limbs).unwrap();
        prop_assert_eq!(recompose(&geometry, scalar), want);
        for (_, digit) in geometry.digits(scalar) {
            prop_assert!(digit.magnitude as usize <= geometry.buckets_per_partition);
        }
    }
}
