//! End-to-end properties of the parallel MSM engine over BLS12-381 G1

use dmsm_algorithms::ec::bls12_381::{G1Affine, G1Projective, Scalar};
use dmsm_api::CurveProjective;
use dmsm_msm::{msm_pippenger, AdditionMode, MsmConfig, MsmContext, WorkerPool};
use dmsm_tests::{init_tracing, naive_msm, parallel_context, random_inputs, rng, MODES};

#[test]
fn matches_naive_across_sizes() {
    init_tracing();
    for mode in MODES {
        let ctx = parallel_context(4, mode);
        for n in [1usize, 2, 4, 16, 256] {
            let (scalars, points) = random_inputs(n, n as u64);
            assert_eq!(
                ctx.msm(&scalars, &points).unwrap(),
                naive_msm(&scalars, &points),
                "n = {}, mode = {:?}",
                n,
                mode
            );
        }
    }
}

#[test]
fn default_config_uses_sequential_path_for_small_inputs() {
    let ctx = MsmContext::<G1Affine>::with_threads(4).unwrap();
    let (scalars, points) = random_inputs(40, 5);
    assert!(points.len() < ctx.config().parallel_threshold);
    assert_eq!(ctx.msm(&scalars, &points).unwrap(), naive_msm(&scalars, &points));
}

#[test]
fn linear_in_the_bases() {
    let mut rng = rng(21);
    let s = Scalar::random(&mut rng);
    let p = G1Projective::random(&mut rng);
    let q = G1Projective::random(&mut rng);
    let pq = G1Affine::from(p + q);
    let (p, q) = (G1Affine::from(p), G1Affine::from(q));

    for mode in MODES {
        let ctx = parallel_context(3, mode);
        assert_eq!(
            ctx.msm(&[s], &[pq]).unwrap(),
            ctx.msm(&[s, s], &[p, q]).unwrap(),
            "mode = {:?}",
            mode
        );
    }
}

#[test]
fn affine_conversion_does_not_change_the_result() {
    let mut rng = rng(33);
    let scalars: Vec<Scalar> = (0..50).map(|_| Scalar::random(&mut rng)).collect();
    let projective: Vec<G1Projective> = (0..50)
        .map(|_| G1Projective::random(&mut rng).double())
        .collect();
    let batched = G1Projective::batch_to_affine(&projective);
    let single: Vec<G1Affine> = projective.iter().map(G1Affine::from).collect();
    assert_eq!(batched, single);

    let ctx = parallel_context(2, AdditionMode::Checked);
    let want: G1Projective = scalars.iter().zip(&projective).map(|(s, p)| p * s).sum();
    assert_eq!(ctx.msm(&scalars, &batched).unwrap(), want);
}

#[test]
fn thread_count_does_not_change_the_result() {
    let (scalars, points) = random_inputs(300, 77);
    let one = parallel_context(1, AdditionMode::Checked)
        .msm(&scalars, &points)
        .unwrap();
    let many = parallel_context(16, AdditionMode::Checked)
        .msm(&scalars, &points)
        .unwrap();
    assert_eq!(one.to_affine(), many.to_affine());
    assert_eq!(one, naive_msm(&scalars, &points));
}

#[test]
fn repeated_calls_reuse_the_pool() {
    let ctx = parallel_context(4, AdditionMode::Unchecked);
    for seed in 0..5u64 {
        let (scalars, points) = random_inputs(70, 1000 + seed);
        assert_eq!(ctx.msm(&scalars, &points).unwrap(), naive_msm(&scalars, &points));
    }
}

#[test]
fn degenerate_inputs_in_both_modes() {
    let mut rng = rng(8);
    let p = G1Affine::from(G1Projective::random(&mut rng));
    let q = G1Affine::from(G1Projective::random(&mut rng));
    let s = Scalar::random(&mut rng);
    let t = Scalar::random(&mut rng);

    let cases: Vec<(Vec<Scalar>, Vec<G1Affine>)> = vec![
        // repeated base and scalar land in the same buckets
        (vec![s; 20], vec![p; 20]),
        // P and -P with equal scalars cancel
        (vec![s, s, t], vec![p, -p, q]),
        // identities and zero scalars contribute nothing
        (
            vec![s, Scalar::zero(), t, s],
            vec![G1Affine::identity(), q, p, G1Affine::identity()],
        ),
        (vec![Scalar::zero(); 8], vec![p; 8]),
        // s and -s on the same base
        (vec![s, -s, Scalar::one()], vec![q, q, p]),
        (vec![-Scalar::one(); 6], vec![p, q, p, q, p, q]),
    ];

    for mode in MODES {
        let ctx = parallel_context(4, mode);
        for (i, (scalars, points)) in cases.iter().enumerate() {
            assert_eq!(
                ctx.msm(scalars, points).unwrap(),
                naive_msm(scalars, points),
                "case {}, mode = {:?}",
                i,
                mode
            );
        }
    }
}

#[test]
fn all_identity_result() {
    let mut rng = rng(4);
    let p = G1Affine::from(G1Projective::random(&mut rng));
    let s = Scalar::random(&mut rng);
    for mode in MODES {
        let ctx = parallel_context(2, mode);
        let sum = ctx.msm(&[s, s], &[p, -p]).unwrap();
        assert!(bool::from(sum.is_identity()));
    }
}

#[test]
fn small_windows_stress_carries() {
    let (scalars, points) = random_inputs(64, 12);
    let want = naive_msm(&scalars, &points);
    let mut pool = WorkerPool::start(5).unwrap();
    for c in [2u32, 3, 5, 7, 16] {
        let config = MsmConfig::default()
            .with_window(c)
            .with_parallel_threshold(0)
            .with_mode(AdditionMode::Unchecked);
        let ctx = MsmContext::<G1Affine>::new(pool, config).unwrap();
        assert_eq!(ctx.msm(&scalars, &points).unwrap(), want, "window {}", c);
        pool = ctx.into_pool();
    }
}

#[test]
fn fallback_agrees_with_engine() {
    let (scalars, points) = random_inputs(100, 99);
    let ctx = parallel_context(3, AdditionMode::Checked);
    assert_eq!(
        msm_pippenger(&scalars, &points).unwrap(),
        ctx.msm(&scalars, &points).unwrap()
    );
}

#[test]
fn generator_times_small_scalars() {
    let g = G1Affine::generator();
    let scalars: Vec<Scalar> = (1..=10u64).map(Scalar::from).collect();
    let ctx = parallel_context(2, AdditionMode::Checked);
    let sum = ctx.msm(&scalars, &vec![g; 10]).unwrap();
    assert_eq!(sum, G1Projective::generator() * Scalar::from(55u64));
}
