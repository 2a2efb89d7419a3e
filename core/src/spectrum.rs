//! Observed and projected site frequency spectra.

use std::{
    collections::{btree_map, BTreeMap},
    fmt,
    marker::PhantomData,
    ops::{AddAssign, Index},
};

use indexmap::{map, IndexMap};
use rayon::prelude::*;
use serde::{
    de::{MapAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};

use crate::{Catalog, MutationType};

mod projected;
pub use projected::ProjectedSpectrum;

/// An observed spectrum of site counts for a single sample size.
///
/// The spectrum for `n` sampled chromosomes has `n + 1` bins, where bin `k` holds the number of
/// sites at which `k` chromosomes carry the derived allele.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ObservedSpectrum(Vec<u64>);

impl ObservedSpectrum {
    /// Returns the site counts.
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    /// Returns the number of bins.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the spectrum has no bins.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn increment(&mut self, derived_count: usize) {
        self.0[derived_count] += 1;
    }

    /// Returns the sample size, i.e. the number of bins minus one.
    ///
    /// Returns `None` if the spectrum is empty.
    pub fn sample_size(&self) -> Option<usize> {
        self.0.len().checked_sub(1)
    }

    /// Returns the total number of sites.
    pub fn sites(&self) -> u64 {
        self.0.iter().sum()
    }

    /// Creates a zero-filled spectrum for the provided sample size.
    pub fn zeros(sample_size: usize) -> Self {
        Self(vec![0; sample_size + 1])
    }
}

impl From<Vec<u64>> for ObservedSpectrum {
    fn from(counts: Vec<u64>) -> Self {
        Self(counts)
    }
}

impl<const N: usize> From<[u64; N]> for ObservedSpectrum {
    fn from(counts: [u64; N]) -> Self {
        Self(counts.to_vec())
    }
}

impl AddAssign<&ObservedSpectrum> for ObservedSpectrum {
    fn add_assign(&mut self, other: &ObservedSpectrum) {
        if other.len() > self.len() {
            self.0.resize(other.len(), 0);
        }

        self.0
            .iter_mut()
            .zip(other.0.iter())
            .for_each(|(x, y)| *x += y);
    }
}

impl Index<usize> for ObservedSpectrum {
    type Output = u64;

    fn index(&self, index: usize) -> &Self::Output {
        self.0.index(index)
    }
}

/// Observed spectra for a sample size, keyed by sample size in ascending order.
pub type BySampleSize = BTreeMap<usize, ObservedSpectrum>;

/// A set of observed spectra, keyed by mutation type and sample size.
///
/// This is a frozen snapshot of a [`Store`](crate::Store). Mutation types are in catalog order,
/// and sample sizes in ascending order.
///
/// When deserializing, spectra given more than once for the same mutation type and sample size
/// are summed, as when collecting from an iterator.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ObservedSpectra(IndexMap<MutationType, BySampleSize>);

impl ObservedSpectra {
    /// Returns the spectra for a mutation type, if any were observed.
    pub fn get(&self, mutation_type: &MutationType) -> Option<&BySampleSize> {
        self.0.get(mutation_type)
    }

    /// Returns true if no spectra were observed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over mutation types and their spectra.
    pub fn iter(&self) -> map::Iter<'_, MutationType, BySampleSize> {
        self.0.iter()
    }

    /// Returns an iterator over all spectra, together with mutation type and sample size.
    pub fn iter_spectra(
        &self,
    ) -> impl Iterator<Item = (&MutationType, usize, &ObservedSpectrum)> + '_ {
        self.0.iter().flat_map(|(mutation_type, by_sample_size)| {
            by_sample_size
                .iter()
                .map(move |(&sample_size, spectrum)| (mutation_type, sample_size, spectrum))
        })
    }

    /// Returns a parallel iterator over mutation types and their spectra.
    pub fn par_iter(&self) -> map::rayon::ParIter<'_, MutationType, BySampleSize> {
        self.0.par_iter()
    }

    /// Returns the number of mutation types with observed spectra.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn new_unchecked(inner: IndexMap<MutationType, BySampleSize>) -> Self {
        Self(inner)
    }

    /// Returns the total number of sites across all spectra.
    pub fn sites(&self) -> u64 {
        self.iter_spectra().map(|(_, _, spectrum)| spectrum.sites()).sum()
    }

    /// Checks that every spectrum has length one greater than its sample size.
    pub fn check_lengths(&self) -> Result<(), SpectraError> {
        match self
            .iter_spectra()
            .find(|(_, sample_size, spectrum)| spectrum.sample_size() != Some(*sample_size))
        {
            Some((mutation_type, sample_size, spectrum)) => Err(SpectraError::MismatchedLength {
                mutation_type: *mutation_type,
                sample_size,
                len: spectrum.len(),
            }),
            None => Ok(()),
        }
    }

    /// Checks that the spectra are consistent with the catalog.
    ///
    /// Every mutation type must be in the catalog, and every spectrum must pass
    /// [`ObservedSpectra::check_lengths`].
    pub fn validate(&self, catalog: &Catalog) -> Result<(), SpectraError> {
        if let Some(unknown) = self.0.keys().find(|m| !catalog.contains(m)) {
            return Err(SpectraError::UnknownMutationType(*unknown));
        }

        self.check_lengths()
    }
}

impl<'a> IntoIterator for &'a ObservedSpectra {
    type Item = (&'a MutationType, &'a BySampleSize);
    type IntoIter = map::Iter<'a, MutationType, BySampleSize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<(MutationType, usize, ObservedSpectrum)> for ObservedSpectra {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (MutationType, usize, ObservedSpectrum)>,
    {
        let mut inner: IndexMap<MutationType, BySampleSize> = IndexMap::new();

        for (mutation_type, sample_size, spectrum) in iter {
            match inner.entry(mutation_type).or_default().entry(sample_size) {
                btree_map::Entry::Occupied(mut entry) => *entry.get_mut() += &spectrum,
                btree_map::Entry::Vacant(entry) => {
                    entry.insert(spectrum);
                }
            }
        }

        Self(inner)
    }
}

impl<'de> Deserialize<'de> for ObservedSpectra {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Entries(entries) =
            Entries::<MutationType, Entries<usize, ObservedSpectrum>>::deserialize(deserializer)?;

        Ok(entries
            .into_iter()
            .flat_map(|(mutation_type, Entries(by_sample_size))| {
                by_sample_size
                    .into_iter()
                    .map(move |(sample_size, spectrum)| (mutation_type, sample_size, spectrum))
            })
            .collect())
    }
}

/// Map entries in input order, keeping duplicate keys.
struct Entries<K, V>(Vec<(K, V)>);

impl<'de, K, V> Deserialize<'de> for Entries<K, V>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor<K, V>(PhantomData<(K, V)>);

        impl<'de, K, V> Visitor<'de> for EntriesVisitor<K, V>
        where
            K: Deserialize<'de>,
            V: Deserialize<'de>,
        {
            type Value = Entries<K, V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();

                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }

                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// An error associated with an inconsistent set of observed spectra.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SpectraError {
    /// The mutation type is not in the catalog.
    UnknownMutationType(MutationType),
    /// The spectrum length does not match its sample size.
    MismatchedLength {
        /// Mutation type of the spectrum.
        mutation_type: MutationType,
        /// Sample size the spectrum was recorded under.
        sample_size: usize,
        /// Actual number of bins.
        len: usize,
    },
}

impl fmt::Display for SpectraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpectraError::UnknownMutationType(m) => write!(f, "unknown mutation type '{m}'"),
            SpectraError::MismatchedLength {
                mutation_type,
                sample_size,
                len,
            } => write!(
                f,
                "spectrum for '{mutation_type}' with sample size {sample_size} \
                 has {len} bins, expected {}",
                sample_size + 1
            ),
        }
    }
}

impl std::error::Error for SpectraError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn mutation_type(s: &str) -> MutationType {
        s.parse().unwrap()
    }

    #[test]
    fn test_observed_spectrum() {
        let spectrum = ObservedSpectrum::from([2, 3, 5]);

        assert_eq!(spectrum.sample_size(), Some(2));
        assert_eq!(spectrum.sites(), 10);
        assert_eq!(spectrum[2], 5);
        assert_eq!(ObservedSpectrum::from(vec![]).sample_size(), None);
        assert_eq!(ObservedSpectrum::zeros(3).as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_add_assign_observed_spectrum() {
        let mut spectrum = ObservedSpectrum::from([1, 2, 3]);
        spectrum += &ObservedSpectrum::from([3, 2, 1]);

        assert_eq!(spectrum, ObservedSpectrum::from([4, 4, 4]));
    }

    #[test]
    fn test_collect_spectra_sums_duplicates() {
        let m = mutation_type("ATT->ATC");

        let spectra = ObservedSpectra::from_iter([
            (m, 2, ObservedSpectrum::from([1, 0, 0])),
            (m, 1, ObservedSpectrum::from([0, 1])),
            (m, 2, ObservedSpectrum::from([0, 0, 1])),
        ]);

        let by_sample_size = spectra.get(&m).unwrap();
        assert_eq!(by_sample_size.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(by_sample_size[&2], ObservedSpectrum::from([1, 0, 1]));
        assert_eq!(spectra.sites(), 3);
    }

    #[test]
    fn test_validate() {
        let catalog = Catalog::synonymous();
        let m = mutation_type("ATT->ATC");

        let valid = ObservedSpectra::from_iter([(m, 2, ObservedSpectrum::from([1, 0, 0]))]);
        assert_eq!(valid.validate(&catalog), Ok(()));

        let mismatched = ObservedSpectra::from_iter([(m, 3, ObservedSpectrum::from([1, 0, 0]))]);
        assert_eq!(
            mismatched.validate(&catalog),
            Err(SpectraError::MismatchedLength {
                mutation_type: m,
                sample_size: 3,
                len: 3
            })
        );

        let unknown = mutation_type("ATG->ATA");
        let invalid = ObservedSpectra::from_iter([(unknown, 1, ObservedSpectrum::from([1, 0]))]);
        assert_eq!(
            invalid.validate(&catalog),
            Err(SpectraError::UnknownMutationType(unknown))
        );
    }

    #[test]
    fn test_serde_spectra() {
        let m = mutation_type("ATT->ATC");
        let spectra = ObservedSpectra::from_iter([
            (m, 2, ObservedSpectrum::from([2, 3, 5])),
            (m, 1, ObservedSpectrum::from([1, 1])),
        ]);

        let json = serde_json::to_string(&spectra).unwrap();
        assert_eq!(json, r#"{"ATT->ATC":{"1":[1,1],"2":[2,3,5]}}"#);

        let parsed: ObservedSpectra = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, spectra);
    }

    #[test]
    fn test_deserialize_sums_duplicates() {
        let json = r#"{"att->atc":{"2":[1,0,0]},"GGG->GGA":{"1":[0,4]},"ATT->ATC":{"2":[0,1,0],"1":[1,1]}}"#;

        let parsed: ObservedSpectra = serde_json::from_str(json).unwrap();

        let m = mutation_type("ATT->ATC");
        let by_sample_size = parsed.get(&m).unwrap();
        assert_eq!(by_sample_size[&2], ObservedSpectrum::from([1, 1, 0]));
        assert_eq!(by_sample_size[&1], ObservedSpectrum::from([1, 1]));

        let order = parsed.iter().map(|(m, _)| m.to_string()).collect::<Vec<_>>();
        assert_eq!(order, vec!["ATT->ATC", "GGG->GGA"]);
        assert_eq!(parsed.sites(), 8);
    }
}
