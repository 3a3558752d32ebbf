//! Partition combination

use dmsm_api::CurveProjective;

/// Sum per-thread partials into one value per partition
pub fn sum_partials<P, I>(partitions: usize, partials: I) -> Vec<P>
where
    P: CurveProjective,
    I: IntoIterator<Item = (usize, P)>,
{
    let mut sums = vec![P::identity(); partitions];
    for (k, partial) in partials {
        sums[k] = sums[k].add(&partial);
    }
    sums
}

/// Horner evaluation `Σ 2^(k·c)·P[k]`
pub fn combine<P: CurveProjective>(partition_sums: &[P], window: u32) -> P {
    let Some((top, rest)) = partition_sums.split_last() else {
        return P::identity();
    };
    rest.iter().rev().fold(*top, |acc, p| {
        let mut acc = acc;
        for _ in 0..window {
            acc = acc.double();
        }
        acc.add(p)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmsm_algorithms::ec::bls12_381::{G1Projective, Scalar};

    #[test]
    fn test_horner() {
        let g = G1Projective::generator();
        let parts: Vec<G1Projective> = [3u64, 5, 7].iter().map(|&v| g * Scalar::from(v)).collect();
        // 3 + 5·2^4 + 7·2^8
        assert_eq!(combine(&parts, 4), g * Scalar::from(3 + 5 * 16 + 7 * 256u64));
        assert_eq!(combine(&parts[..1], 4), parts[0]);
        assert_eq!(combine::<G1Projective>(&[], 4), G1Projective::identity());
    }

    #[test]
    fn test_sum_partials() {
        let g = G1Projective::generator();
        let sums = sum_partials(3, vec![(0, g), (2, g), (0, g.double())]);
        assert_eq!(sums, vec![g * Scalar::from(3u64), G1Projective::identity(), g]);
    }
}
