//! Hypergeometric projection.
//!
//! The log-gamma implementation is adapted from statrs.

use std::ops::RangeInclusive;

use factorial::ln_factorial;

use super::{check_projection, ProjectionError, Projector};

/// Projection by the expected spectrum under sampling without replacement.
///
/// Each site with `i` derived alleles among `n` chromosomes contributes to bin `s` of the projected
/// spectrum with the hypergeometric probability of drawing `s` derived alleles when drawing `m`
/// chromosomes without replacement. The projected spectrum therefore conserves the total number of
/// sites, and projecting to the original sample size is the identity.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Hypergeometric;

impl Projector for Hypergeometric {
    fn project(&self, original: &[u64], target_size: usize) -> Result<Vec<f64>, ProjectionError> {
        let sample_size = check_projection(original, target_size)?;

        let mut projected = vec![0.0; target_size + 1];

        for (successes, &count) in original.iter().enumerate().filter(|&(_, &c)| c > 0) {
            let count = count as f64;

            for observed in support(sample_size, successes, target_size) {
                projected[observed] += count * pmf(sample_size, successes, target_size, observed);
            }
        }

        Ok(projected)
    }
}

/// The values with non-zero probability.
fn support(size: usize, successes: usize, draws: usize) -> RangeInclusive<usize> {
    let lower = draws.saturating_sub(size - successes);
    let upper = draws.min(successes);

    lower..=upper
}

/// Returns the hypergeometric probability of observing `observed` successes in `draws` draws
/// without replacement from a population of `size` containing `successes` successes.
///
/// Probabilities are calculated in log space, and so remain finite for large populations. Values
/// outside the support, including parameters where `successes` or `draws` exceed `size`, have
/// probability zero.
pub fn pmf(size: usize, successes: usize, draws: usize, observed: usize) -> f64 {
    if successes > size || draws > size || !support(size, successes, draws).contains(&observed) {
        0.0
    } else {
        (ln_binomial(successes, observed) + ln_binomial(size - successes, draws - observed)
            - ln_binomial(size, draws))
        .exp()
    }
}

fn ln_binomial(n: usize, k: usize) -> f64 {
    debug_assert!(k <= n);

    ln_factorial(n) - ln_factorial(k) - ln_factorial(n - k)
}

mod factorial {
    use std::sync::OnceLock;

    use super::gamma::ln_gamma;

    const MAX: usize = 170;
    const PRECOMPUTED_LEN: usize = MAX + 1;

    fn precomputed() -> &'static [f64; PRECOMPUTED_LEN] {
        static PRECOMPUTED: OnceLock<[f64; PRECOMPUTED_LEN]> = OnceLock::new();

        PRECOMPUTED.get_or_init(|| {
            let mut precomputed = [0.0; PRECOMPUTED_LEN];

            let mut factorial = 1.0;
            for (i, x) in precomputed.iter_mut().enumerate().skip(1) {
                factorial *= i as f64;
                *x = factorial.ln();
            }

            precomputed
        })
    }

    pub(super) fn ln_factorial(x: usize) -> f64 {
        precomputed()
            .get(x)
            .copied()
            .unwrap_or_else(|| ln_gamma(x as f64 + 1.0))
    }
}

mod gamma {
    use std::f64::consts::E;

    const LN_2_SQRT_E_OVER_PI: f64 = 0.6207822376352452223455184457816472122518527279025978;
    const R: f64 = 10.900511;
    const DK: &[f64] = &[
        2.48574089138753565546e-5,
        1.05142378581721974210,
        -3.45687097222016235469,
        4.51227709466894823700,
        -2.98285225323576655721,
        1.05639711577126713077,
        -1.95428773191645869583e-1,
        1.70970543404441224307e-2,
        -5.71926117404305781283e-4,
        4.63399473359905636708e-6,
        -2.71994908488607703910e-9,
    ];

    /// Log-gamma for `x ≥ 1`, which covers all factorials.
    pub(super) fn ln_gamma(x: f64) -> f64 {
        debug_assert!(x >= 1.0);

        let s = DK
            .iter()
            .enumerate()
            .skip(1)
            .fold(DK[0], |s, (k, d)| s + d / (x + k as f64 - 1.0));

        s.ln() + LN_2_SQRT_E_OVER_PI + (x - 0.5) * ((x - 0.5 + R) / E).ln()
    }
}
