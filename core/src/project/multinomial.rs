use rand::{
    distributions::{Distribution, WeightedIndex},
    rngs::StdRng,
    SeedableRng,
};

use super::{Hypergeometric, ProjectionError, Projector};

/// Projection by a random multinomial draw.
///
/// The sites of the original spectrum are redistributed into the bins of the target sample size
/// with probabilities proportional to the [`Hypergeometric`] projection. The result is an
/// integer-valued spectrum with the same total number of sites as the original, which behaves like
/// a single realisation of subsampling rather than its expectation.
///
/// The random state for each projection is derived from the seed together with the original
/// spectrum and target sample size, so that the same input always gives the same output regardless
/// of the order or thread in which projections are performed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Multinomial {
    seed: u64,
}

impl Multinomial {
    /// Creates a new multinomial projection with the provided seed.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Returns the seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn rng_for(&self, original: &[u64], target_size: usize) -> StdRng {
        let state = [original.len() as u64, target_size as u64]
            .into_iter()
            .chain(original.iter().copied())
            .fold(self.seed, mix);

        StdRng::seed_from_u64(state)
    }
}

impl Projector for Multinomial {
    fn project(&self, original: &[u64], target_size: usize) -> Result<Vec<f64>, ProjectionError> {
        let expected = Hypergeometric.project(original, target_size)?;
        let sites = original.iter().sum::<u64>();

        let mut projected = vec![0.0; target_size + 1];
        if sites == 0 {
            return Ok(projected);
        }

        let distribution = WeightedIndex::new(&expected)?;
        let mut rng = self.rng_for(original, target_size);

        for _ in 0..sites {
            projected[distribution.sample(&mut rng)] += 1.0;
        }

        Ok(projected)
    }
}

/// Mixes a value into a hash state using the splitmix64 finaliser.
fn mix(state: u64, value: u64) -> u64 {
    let mut z = (state ^ value).wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}
