//! Shared fixtures for the dmsm integration tests

use dmsm_algorithms::ec::bls12_381::{G1Affine, G1Projective, Scalar};
use dmsm_api::CurveProjective;
use dmsm_msm::{AdditionMode, MsmConfig, MsmContext, WorkerPool};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing_subscriber::EnvFilter;

/// Deterministic rng so failures reproduce
pub fn rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// Install a test-friendly subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `n` random scalars and `n` random affine points
pub fn random_inputs(n: usize, seed: u64) -> (Vec<Scalar>, Vec<G1Affine>) {
    let mut rng = rng(seed);
    let scalars = (0..n).map(|_| Scalar::random(&mut rng)).collect();
    let points: Vec<G1Projective> = (0..n).map(|_| G1Projective::random(&mut rng)).collect();
    (scalars, G1Projective::batch_to_affine(&points))
}

/// Reference answer by independent scalar multiplications
pub fn naive_msm(scalars: &[Scalar], points: &[G1Affine]) -> G1Projective {
    scalars.iter().zip(points).map(|(s, p)| p * s).sum()
}

/// Engine that always takes the threaded path
pub fn parallel_context(threads: usize, mode: AdditionMode) -> MsmContext<G1Affine> {
    let config = MsmConfig::default()
        .with_mode(mode)
        .with_parallel_threshold(0);
    MsmContext::new(WorkerPool::start(threads).unwrap(), config).unwrap()
}

/// Both addition modes, for tests that must hold in either
pub const MODES: [AdditionMode; 2] = [AdditionMode::Checked, AdditionMode::Unchecked];
