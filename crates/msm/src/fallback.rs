//! Plain bucket-method MSM for curves without an endomorphism
//!
//! Unsigned windows over the full scalar, projective buckets, one thread.

use dmsm_api::{validate, CurveAffine, CurveProjective, MsmScalar, Result};
use dmsm_params::msm::{default_window_bits, MAX_WINDOW_BITS, MIN_WINDOW_BITS};

/// Extract the `c`-bit window starting at `bit` from little-endian limbs
#[inline]
fn window(limbs: &[u64; 4], bit: usize, c: usize) -> usize {
    let limb = bit / 64;
    let shift = bit % 64;
    if limb >= 4 {
        return 0;
    }
    let mut v = limbs[limb] >> shift;
    if shift + c > 64 && limb + 1 < 4 {
        v |= limbs[limb + 1] << (64 - shift);
    }
    (v & ((1u64 << c) - 1)) as usize
}

/// `Σ scalars[i]·points[i]` with Pippenger's bucket method.
///
/// The window comes from the input-size heuristic; use
/// [`msm_pippenger_with_window`] to fix it.
pub fn msm_pippenger<C, S>(scalars: &[S], points: &[C]) -> Result<C::Projective>
where
    C: CurveAffine,
    S: MsmScalar,
{
    msm_pippenger_with_window(scalars, points, default_window_bits(points.len()))
}

/// `Σ scalars[i]·points[i]` with `window`-bit unsigned windows
pub fn msm_pippenger_with_window<C, S>(
    scalars: &[S],
    points: &[C],
    window: u32,
) -> Result<C::Projective>
where
    C: CurveAffine,
    S: MsmScalar,
{
    validate::parameter(
        (MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&window),
        "window",
        "window size out of range",
    )?;
    validate::length("scalars", scalars.len(), points.len())?;
    if points.is_empty() {
        return Ok(C::Projective::identity());
    }

    let c = window as usize;
    let num_windows = (S::NUM_BITS as usize).div_ceil(c);
    let limbs: Vec<[u64; 4]> = scalars.iter().map(|s| s.to_canonical_limbs()).collect();

    let mut buckets = vec![C::Projective::identity(); (1 << c) - 1];
    let mut acc = C::Projective::identity();

    for w in (0..num_windows).rev() {
        for _ in 0..c {
            acc = acc.double();
        }

        buckets.fill(C::Projective::identity());
        for (s, p) in limbs.iter().zip(points) {
            let k = self::window(s, w * c, c);
            if k > 0 {
                buckets[k - 1] = buckets[k - 1].add_mixed(p);
            }
        }

        // Σ k·bucket[k]
        let mut running = C::Projective::identity();
        let mut window_sum = C::Projective::identity();
        for bucket in buckets.iter().rev() {
            running = running.add(bucket);
            window_sum = window_sum.add(&running);
        }
        acc = acc.add(&window_sum);
    }

    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmsm_algorithms::ec::bls12_381::{G1Affine, G1Projective, Scalar};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_window_crosses_limbs() {
        let limbs = [0xf000_0000_0000_0000, 0x5, 0, 0];
        assert_eq!(window(&limbs, 60, 8), 0x5f);
        assert_eq!(window(&limbs, 252, 8), 0);
        assert_eq!(window(&limbs, 256, 8), 0);
    }

    #[test]
    fn test_matches_naive() {
        let mut rng = ChaCha20Rng::seed_from_u64(77);
        for n in [1usize, 2, 31, 40] {
            let scalars: Vec<Scalar> = (0..n).map(|_| Scalar::random(&mut rng)).collect();
            let points: Vec<G1Affine> = (0..n)
                .map(|_| G1Affine::from(G1Projective::random(&mut rng)))
                .collect();
            let want: G1Projective = scalars.iter().zip(&points).map(|(s, p)| p * s).sum();
            assert_eq!(msm_pippenger(&scalars, &points).unwrap(), want, "n = {}", n);
        }
    }

    #[test]
    fn test_explicit_window() {
        let mut rng = ChaCha20Rng::seed_from_u64(78);
        let scalars: Vec<Scalar> = (0..20).map(|_| Scalar::random(&mut rng)).collect();
        let points: Vec<G1Affine> = (0..20)
            .map(|_| G1Affine::from(G1Projective::random(&mut rng)))
            .collect();
        let want: G1Projective = scalars.iter().zip(&points).map(|(s, p)| p * s).sum();
        for c in [2u32, 5, 8, 13] {
            assert_eq!(
                msm_pippenger_with_window(&scalars, &points, c).unwrap(),
                want,
                "window {}",
                c
            );
        }
        assert!(msm_pippenger_with_window(&scalars, &points, 1).is_err());
        assert!(msm_pippenger_with_window(&scalars, &points, 21).is_err());
    }

    #[test]
    fn test_edge_inputs() {
        let g = G1Affine::generator();
        let scalars = [Scalar::zero(), -Scalar::one(), Scalar::one()];
        let points = [g, g, G1Affine::identity()];
        assert_eq!(msm_pippenger(&scalars, &points).unwrap(), -G1Projective::generator());
        assert!(msm_pippenger(&scalars[..1], &points).is_err());
        assert_eq!(
            msm_pippenger::<G1Affine, Scalar>(&[], &[]).unwrap(),
            G1Projective::identity()
        );
    }
}
