//! Projection of observed spectra to smaller sample sizes.
//!
//! Projecting a spectrum from sample size `n` to a target sample size `m ≤ n` gives the spectrum
//! that would have been observed if only `m` of the `n` chromosomes had been sampled. Two
//! strategies are provided: the exact expectation under hypergeometric sampling
//! ([`Hypergeometric`], the default), and a stochastic, integer-valued draw from the same
//! distribution ([`Multinomial`]).

use std::fmt;

use rand::distributions::WeightedError;

mod hypergeometric;
pub use hypergeometric::{pmf, Hypergeometric};

mod multinomial;
pub use multinomial::Multinomial;

/// A strategy for projecting a spectrum to a smaller sample size.
pub trait Projector {
    /// Projects a spectrum of site counts to a target sample size.
    ///
    /// The `original` spectrum has `n + 1` bins for sample size `n`, and the projected spectrum has
    /// `target_size + 1` bins.
    ///
    /// # Errors
    ///
    /// If the original spectrum is empty, or if the target sample size is greater than the
    /// original sample size.
    fn project(&self, original: &[u64], target_size: usize) -> Result<Vec<f64>, ProjectionError>;
}

impl<P> Projector for &P
where
    P: Projector + ?Sized,
{
    fn project(&self, original: &[u64], target_size: usize) -> Result<Vec<f64>, ProjectionError> {
        (**self).project(original, target_size)
    }
}

/// Returns the sample size of the original spectrum if it can be projected to the target.
fn check_projection(original: &[u64], target_size: usize) -> Result<usize, ProjectionError> {
    let sample_size = original
        .len()
        .checked_sub(1)
        .ok_or(ProjectionError::EmptySpectrum)?;

    if target_size > sample_size {
        Err(ProjectionError::InvalidSampleSize {
            sample_size,
            target_size,
        })
    } else {
        Ok(sample_size)
    }
}

/// An error associated with projection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProjectionError {
    /// The original spectrum has no bins.
    EmptySpectrum,
    /// The target sample size is greater than the original sample size.
    InvalidSampleSize {
        /// Original sample size.
        sample_size: usize,
        /// Target sample size.
        target_size: usize,
    },
    /// Failed to set up sampling weights.
    Weights(WeightedError),
}

impl From<WeightedError> for ProjectionError {
    fn from(e: WeightedError) -> Self {
        Self::Weights(e)
    }
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionError::EmptySpectrum => f.write_str("cannot project empty spectrum"),
            ProjectionError::InvalidSampleSize {
                sample_size,
                target_size,
            } => write!(
                f,
                "cannot project from sample size {sample_size} to larger sample size {target_size}"
            ),
            ProjectionError::Weights(e) => write!(f, "invalid projection weights: {e}"),
        }
    }
}

impl std::error::Error for ProjectionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_projection() {
        assert_eq!(check_projection(&[1, 2, 3], 2), Ok(2));
        assert_eq!(check_projection(&[1, 2, 3], 0), Ok(2));
        assert_eq!(check_projection(&[], 0), Err(ProjectionError::EmptySpectrum));
        assert_eq!(
            check_projection(&[1, 2, 3], 3),
            Err(ProjectionError::InvalidSampleSize {
                sample_size: 2,
                target_size: 3
            })
        );
    }

    #[test]
    fn test_projector_by_reference() {
        fn project_with<P: Projector>(projector: P) -> Vec<f64> {
            projector.project(&[2, 3, 5], 1).unwrap()
        }

        assert_approx_eq!(project_with(&Hypergeometric), vec![3.5, 6.5], epsilon = 1e-9);
    }
}
