//! Pooling of observed spectra across native sample sizes.
//!
//! Sites for a mutation type are typically observed at many different sample sizes, since the
//! number of called chromosomes varies between sites. To combine them, every spectrum with a
//! native sample size at least as large as the target is projected down to the target, and the
//! projections are summed.

use std::{collections::BTreeMap, fmt};

use indexmap::{map, IndexMap};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    project::{Hypergeometric, ProjectionError, Projector},
    spectrum::BySampleSize,
    Catalog, MutationType, ObservedSpectra, ProjectedSpectrum,
};

mod target;
pub use target::{InvalidSampleSize, TargetSizes};

/// Projected spectra for a mutation type, keyed by target sample size in ascending order.
pub type ByTargetSize = BTreeMap<usize, ProjectedSpectrum>;

/// The result of aggregation, keyed by mutation type and target sample size.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Aggregated(IndexMap<MutationType, ByTargetSize>);

impl Aggregated {
    /// Returns the projected spectra for a mutation type.
    pub fn get(&self, mutation_type: &MutationType) -> Option<&ByTargetSize> {
        self.0.get(mutation_type)
    }

    /// Returns true if there are no mutation types.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over mutation types and their projected spectra.
    pub fn iter(&self) -> map::Iter<'_, MutationType, ByTargetSize> {
        self.0.iter()
    }

    /// Returns an iterator over all spectra, together with mutation type and target sample size.
    pub fn iter_spectra(
        &self,
    ) -> impl Iterator<Item = (&MutationType, usize, &ProjectedSpectrum)> + '_ {
        self.0.iter().flat_map(|(mutation_type, by_target_size)| {
            by_target_size
                .iter()
                .map(move |(&target_size, spectrum)| (mutation_type, target_size, spectrum))
        })
    }

    /// Returns the number of mutation types.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns an iterator over mutation types and target sample sizes without data.
    pub fn missing(&self) -> impl Iterator<Item = (&MutationType, usize)> + '_ {
        self.iter_spectra()
            .filter(|(_, _, spectrum)| !spectrum.has_data())
            .map(|(mutation_type, target_size, _)| (mutation_type, target_size))
    }
}

impl<'a> IntoIterator for &'a Aggregated {
    type Item = (&'a MutationType, &'a ByTargetSize);
    type IntoIter = map::Iter<'a, MutationType, ByTargetSize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Projects and pools observed spectra to target sample sizes.
#[derive(Clone, Debug)]
pub struct Aggregator<'a, P = Hypergeometric> {
    catalog: &'a Catalog,
    projector: P,
    strict: bool,
}

impl<'a> Aggregator<'a> {
    /// Creates a new aggregator using hypergeometric projection.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self::with_projector(catalog, Hypergeometric)
    }
}

impl<'a, P> Aggregator<'a, P>
where
    P: Projector,
{
    /// Returns the pooled projection of a mutation type to a target sample size.
    ///
    /// All spectra of the mutation type with a native sample size at least as large as the target
    /// sample size are projected to the target, and summed. If there are no such spectra, the
    /// result is all zeros and has no sources, unless the aggregator is strict.
    ///
    /// # Errors
    ///
    /// If the mutation type is not in the catalog, if an eligible spectrum does not have one more
    /// bin than its sample size, if projection fails, or if the aggregator is strict and there are
    /// no spectra to project from.
    pub fn aggregate(
        &self,
        mutation_type: &MutationType,
        target_size: usize,
        observed: &ObservedSpectra,
    ) -> Result<ProjectedSpectrum, AggregateError> {
        if !self.catalog.contains(mutation_type) {
            return Err(AggregateError::UnknownMutationType(*mutation_type));
        }

        match observed.get(mutation_type) {
            Some(by_sample_size) => self.pool(mutation_type, target_size, by_sample_size),
            None => self.pool(mutation_type, target_size, &BySampleSize::new()),
        }
    }

    /// Returns the pooled projections of every observed mutation type to every target sample size.
    ///
    /// Mutation types are processed in parallel in the current rayon thread pool. The result
    /// keeps the order of mutation types in the observed spectra.
    ///
    /// # Errors
    ///
    /// See [`Aggregator::aggregate`].
    pub fn aggregate_all(
        &self,
        target_sizes: &TargetSizes,
        observed: &ObservedSpectra,
    ) -> Result<Aggregated, AggregateError>
    where
        P: Sync,
    {
        if let Some((&unknown, _)) = observed.iter().find(|(m, _)| !self.catalog.contains(m)) {
            return Err(AggregateError::UnknownMutationType(unknown));
        }

        let aggregated = observed
            .par_iter()
            .map(|(mutation_type, by_sample_size)| -> Result<_, AggregateError> {
                let by_target_size = target_sizes
                    .iter()
                    .map(|target_size| {
                        self.pool(mutation_type, target_size, by_sample_size)
                            .map(|spectrum| (target_size, spectrum))
                    })
                    .collect::<Result<ByTargetSize, _>>()?;

                Ok((*mutation_type, by_target_size))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Aggregated(aggregated.into_iter().collect()))
    }

    fn pool(
        &self,
        mutation_type: &MutationType,
        target_size: usize,
        by_sample_size: &BySampleSize,
    ) -> Result<ProjectedSpectrum, AggregateError> {
        let mut pooled = ProjectedSpectrum::zeros(target_size);

        for (&sample_size, spectrum) in by_sample_size.range(target_size..) {
            if spectrum.sample_size() != Some(sample_size) {
                return Err(AggregateError::MismatchedLength {
                    mutation_type: *mutation_type,
                    sample_size,
                    len: spectrum.len(),
                });
            }

            let projected = self.projector.project(spectrum.as_slice(), target_size)?;
            pooled.add_projected(sample_size, &projected);
        }

        if self.strict && !pooled.has_data() {
            Err(AggregateError::NoEligibleSamples {
                mutation_type: *mutation_type,
                target_size,
            })
        } else {
            Ok(pooled)
        }
    }

    /// Returns the projector.
    pub fn projector(&self) -> &P {
        &self.projector
    }

    /// Sets whether a target sample size without eligible native sample sizes is an error.
    ///
    /// By default, such targets give an all-zero spectrum without sources.
    pub fn set_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Creates a new aggregator using the provided projector.
    pub fn with_projector(catalog: &'a Catalog, projector: P) -> Self {
        Self {
            catalog,
            projector,
            strict: false,
        }
    }
}

/// An error associated with aggregation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AggregateError {
    /// The mutation type is not in the catalog.
    UnknownMutationType(MutationType),
    /// Projection of a spectrum failed.
    Projection(ProjectionError),
    /// The spectrum length does not match its sample size.
    MismatchedLength {
        /// Mutation type of the spectrum.
        mutation_type: MutationType,
        /// Sample size the spectrum was recorded under.
        sample_size: usize,
        /// Actual number of bins.
        len: usize,
    },
    /// No native sample size is at least as large as the target sample size.
    NoEligibleSamples {
        /// Mutation type being aggregated.
        mutation_type: MutationType,
        /// Requested target sample size.
        target_size: usize,
    },
}

impl From<ProjectionError> for AggregateError {
    fn from(e: ProjectionError) -> Self {
        Self::Projection(e)
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateError::UnknownMutationType(m) => write!(f, "unknown mutation type '{m}'"),
            AggregateError::Projection(e) => write!(f, "{e}"),
            AggregateError::MismatchedLength {
                mutation_type,
                sample_size,
                len,
            } => write!(
                f,
                "spectrum for '{mutation_type}' with sample size {sample_size} \
                 has {len} bins, expected {}",
                sample_size + 1
            ),
            AggregateError::NoEligibleSamples {
                mutation_type,
                target_size,
            } => write!(
                f,
                "no observed sample size for '{mutation_type}' \
                 at least as large as target sample size {target_size}"
            ),
        }
    }
}

impl std::error::Error for AggregateError {}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{project::Multinomial, ObservedSpectrum};

    fn mutation_type(s: &str) -> MutationType {
        s.parse().unwrap()
    }

    fn observed() -> ObservedSpectra {
        let a = mutation_type("ATT->ATC");
        let b = mutation_type("GGG->GGA");

        ObservedSpectra::from_iter([
            (a, 2, ObservedSpectrum::from([2, 3, 5])),
            (a, 4, ObservedSpectrum::from([1, 0, 2, 0, 1])),
            (a, 1, ObservedSpectrum::from([7, 7])),
            (b, 3, ObservedSpectrum::from([0, 1, 1, 0])),
        ])
    }

    #[test]
    fn test_aggregate_single_source() {
        let catalog = Catalog::synonymous();
        let aggregator = Aggregator::new(&catalog);

        let spectrum = aggregator
            .aggregate(&mutation_type("ATT->ATC"), 2, &observed())
            .unwrap();

        // Native size 4 projected to 2: [1, 0, 2, 0, 1] -> [1 + 1/3, 4/3, 1/3 + 1]
        let mut expected = ProjectedSpectrum::new(vec![2.0, 3.0, 5.0], vec![2]);
        expected += &ProjectedSpectrum::new(vec![4.0 / 3.0, 4.0 / 3.0, 4.0 / 3.0], vec![4]);

        assert_approx_eq!(spectrum, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_aggregate_additive() {
        let catalog = Catalog::synonymous();
        let aggregator = Aggregator::new(&catalog);
        let m = mutation_type("ATT->ATC");

        let pooled = aggregator.aggregate(&m, 1, &observed()).unwrap();

        let by_sample_size = observed().get(&m).unwrap().clone();
        let mut expected = vec![0.0; 2];
        for spectrum in by_sample_size.values() {
            let projected = Hypergeometric.project(spectrum.as_slice(), 1).unwrap();
            expected.iter_mut().zip(projected).for_each(|(x, y)| *x += y);
        }

        assert_approx_eq!(pooled.as_slice(), expected.as_slice(), epsilon = 1e-9);
        assert_eq!(pooled.sources(), &[1, 2, 4]);
        assert_approx_eq!(pooled.sum(), 28.0, epsilon = 1e-9);
    }

    #[test]
    fn test_aggregate_no_eligible_samples() {
        let catalog = Catalog::synonymous();
        let m = mutation_type("GGG->GGA");

        let spectrum = Aggregator::new(&catalog)
            .aggregate(&m, 5, &observed())
            .unwrap();
        assert_eq!(spectrum, ProjectedSpectrum::zeros(5));
        assert!(!spectrum.has_data());

        let result = Aggregator::new(&catalog)
            .set_strict(true)
            .aggregate(&m, 5, &observed());
        assert_eq!(
            result,
            Err(AggregateError::NoEligibleSamples {
                mutation_type: m,
                target_size: 5
            })
        );
    }

    #[test]
    fn test_aggregate_unobserved_mutation_type() {
        let catalog = Catalog::synonymous();
        let m = mutation_type("TTT->TTC");

        let spectrum = Aggregator::new(&catalog)
            .aggregate(&m, 2, &observed())
            .unwrap();

        assert_eq!(spectrum, ProjectedSpectrum::zeros(2));
    }

    #[test]
    fn test_aggregate_unknown_mutation_type() {
        let catalog = Catalog::synonymous();
        let m = mutation_type("ATG->ATA");

        assert_eq!(
            Aggregator::new(&catalog).aggregate(&m, 2, &observed()),
            Err(AggregateError::UnknownMutationType(m))
        );
    }

    #[test]
    fn test_aggregate_all() {
        let catalog = Catalog::synonymous();
        let aggregator = Aggregator::new(&catalog);
        let target_sizes = TargetSizes::new([3, 1]).unwrap();

        let aggregated = aggregator.aggregate_all(&target_sizes, &observed()).unwrap();

        let order = aggregated.iter().map(|(m, _)| m.to_string()).collect::<Vec<_>>();
        assert_eq!(order, vec!["ATT->ATC", "GGG->GGA"]);

        let a = aggregated.get(&mutation_type("ATT->ATC")).unwrap();
        assert_eq!(a.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(a[&1].sources(), &[1, 2, 4]);
        assert_eq!(a[&3].sources(), &[4]);

        let b = aggregated.get(&mutation_type("GGG->GGA")).unwrap();
        assert_approx_eq!(b[&3].as_slice(), &[0.0, 1.0, 1.0, 0.0][..], epsilon = 1e-9);
        assert_approx_eq!(b[&1].as_slice(), &[1.0, 1.0][..], epsilon = 1e-9);

        assert_eq!(aggregated.missing().count(), 0);
    }

    #[test]
    fn test_aggregate_all_missing_and_strict() {
        let catalog = Catalog::synonymous();
        let target_sizes = TargetSizes::new([4]).unwrap();

        let aggregated = Aggregator::new(&catalog)
            .aggregate_all(&target_sizes, &observed())
            .unwrap();
        assert_eq!(
            aggregated.missing().collect::<Vec<_>>(),
            vec![(&mutation_type("GGG->GGA"), 4)]
        );

        let result = Aggregator::new(&catalog)
            .set_strict(true)
            .aggregate_all(&target_sizes, &observed());
        assert!(matches!(
            result,
            Err(AggregateError::NoEligibleSamples { target_size: 4, .. })
        ));
    }

    #[test]
    fn test_aggregate_all_unknown_mutation_type() {
        let catalog = Catalog::synonymous();
        let unknown = mutation_type("ATG->ATA");
        let observed = ObservedSpectra::from_iter([(unknown, 1, ObservedSpectrum::from([1, 0]))]);

        assert_eq!(
            Aggregator::new(&catalog).aggregate_all(&TargetSizes::new([1]).unwrap(), &observed),
            Err(AggregateError::UnknownMutationType(unknown))
        );
    }

    #[test]
    fn test_aggregate_mismatched_length() {
        let catalog = Catalog::synonymous();
        let m = mutation_type("ATT->ATC");
        let observed = ObservedSpectra::from_iter([
            (m, 1, ObservedSpectrum::from([3, 1])),
            (m, 2, ObservedSpectrum::from([1, 0, 2, 0, 1])),
        ]);

        let expected = Err(AggregateError::MismatchedLength {
            mutation_type: m,
            sample_size: 2,
            len: 5,
        });

        let aggregator = Aggregator::new(&catalog);
        assert_eq!(aggregator.aggregate(&m, 2, &observed), expected);
        assert_eq!(
            aggregator
                .aggregate_all(&TargetSizes::new([1]).unwrap(), &observed)
                .map(|_| ()),
            expected.map(|_| ())
        );

        // Spectra below the target are never projected
        assert!(aggregator.aggregate(&m, 3, &observed).is_ok());
    }

    #[test]
    fn test_aggregate_all_multinomial() {
        let catalog = Catalog::synonymous();
        let aggregator = Aggregator::with_projector(&catalog, Multinomial::new(5));
        let target_sizes = TargetSizes::new([1, 2]).unwrap();

        let first = aggregator.aggregate_all(&target_sizes, &observed()).unwrap();
        let second = aggregator.aggregate_all(&target_sizes, &observed()).unwrap();

        assert_eq!(first, second);

        let a = first.get(&mutation_type("ATT->ATC")).unwrap();
        assert_eq!(a[&1].sum(), 28.0);
        assert_eq!(a[&2].sum(), 14.0);
        assert!(a[&2].as_slice().iter().all(|x| x.fract() == 0.0));
    }
}
