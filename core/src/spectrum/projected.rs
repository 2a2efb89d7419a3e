use std::ops::{AddAssign, Index};

use serde::{Deserialize, Serialize};

/// A spectrum of expected site counts at a target sample size.
///
/// A projected spectrum is the pooled result of projecting observed spectra from one or more
/// native sample sizes down to a common target sample size. The native sample sizes that
/// contributed are kept as sources. A spectrum without sources holds no data: it is all zeros,
/// and indicates that no native sample size was large enough to project from.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ProjectedSpectrum {
    spectrum: Vec<f64>,
    sources: Vec<usize>,
}

impl ProjectedSpectrum {
    /// Adds a projection from a native sample size.
    ///
    /// The projection must have the same number of bins as the spectrum.
    pub(crate) fn add_projected(&mut self, source: usize, projected: &[f64]) {
        debug_assert_eq!(projected.len(), self.spectrum.len());

        self.spectrum
            .iter_mut()
            .zip(projected)
            .for_each(|(x, y)| *x += y);

        if let Err(position) = self.sources.binary_search(&source) {
            self.sources.insert(position, source);
        }
    }

    /// Returns the expected site counts.
    pub fn as_slice(&self) -> &[f64] {
        &self.spectrum
    }

    /// Returns true if at least one native sample size contributed to the spectrum.
    pub fn has_data(&self) -> bool {
        !self.sources.is_empty()
    }

    /// Returns the number of bins.
    pub fn len(&self) -> usize {
        self.spectrum.len()
    }

    /// Returns true if the spectrum has no bins.
    pub fn is_empty(&self) -> bool {
        self.spectrum.is_empty()
    }

    /// Creates a new spectrum from expected counts and the native sample sizes they came from.
    pub fn new(spectrum: Vec<f64>, mut sources: Vec<usize>) -> Self {
        sources.sort_unstable();
        sources.dedup();

        Self { spectrum, sources }
    }

    /// Returns the target sample size, i.e. the number of bins minus one.
    pub fn sample_size(&self) -> usize {
        self.spectrum.len().saturating_sub(1)
    }

    /// Returns the native sample sizes that contributed to the spectrum, in ascending order.
    pub fn sources(&self) -> &[usize] {
        &self.sources
    }

    /// Returns the total expected number of sites.
    pub fn sum(&self) -> f64 {
        self.spectrum.iter().sum()
    }

    /// Creates an empty spectrum without data for the provided target sample size.
    pub fn zeros(sample_size: usize) -> Self {
        Self {
            spectrum: vec![0.0; sample_size + 1],
            sources: Vec::new(),
        }
    }
}

impl AddAssign<&ProjectedSpectrum> for ProjectedSpectrum {
    fn add_assign(&mut self, other: &ProjectedSpectrum) {
        self.spectrum
            .iter_mut()
            .zip(other.spectrum.iter())
            .for_each(|(x, y)| *x += y);

        for &source in other.sources.iter() {
            if let Err(position) = self.sources.binary_search(&source) {
                self.sources.insert(position, source);
            }
        }
    }
}

impl Index<usize> for ProjectedSpectrum {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        self.spectrum.index(index)
    }
}
