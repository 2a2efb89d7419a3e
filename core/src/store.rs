//! Accumulating observed spectra from classified records.

use std::{fmt, ops::AddAssign, sync::Arc};

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::{
    spectrum::{BySampleSize, ObservedSpectra, ObservedSpectrum},
    Catalog, Record,
};

type Exclusion<'a> = Arc<dyn Fn(&Record) -> bool + Send + Sync + 'a>;

/// A store accumulating observed spectra per mutation type and sample size.
///
/// Registration is commutative, so the order in which records are registered does not affect
/// the resulting [`snapshot`](Store::snapshot).
pub struct Store<'a> {
    catalog: &'a Catalog,
    spectra: Vec<BySampleSize>,
    exclusion: Option<Exclusion<'a>>,
    tally: Tally,
}

impl<'a> Store<'a> {
    /// The largest accepted sample size.
    ///
    /// Records with larger sample sizes are rejected rather than allocating their spectrum.
    pub const MAX_SAMPLE_SIZE: usize = 10_000_000;

    /// Returns the catalog used to validate mutation types.
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Registers all records, skipping excluded and invalid records.
    ///
    /// Returns the tally for the provided records only.
    pub fn ingest<I>(&mut self, records: I) -> Tally
    where
        I: IntoIterator<Item = Record>,
    {
        let before = self.tally;

        for record in records {
            // Rejections are recorded in the tally
            let _ = self.register_record(&record);
        }

        self.tally.since(before)
    }

    /// Registers all records in parallel, skipping excluded and invalid records.
    ///
    /// Each worker accumulates into its own store, and worker stores are merged at the end.
    /// Returns the tally for the provided records only.
    pub fn ingest_par(&mut self, records: &[Record]) -> Tally {
        let before = self.tally;

        let merged = records
            .par_iter()
            .fold(
                || self.empty_like(),
                |mut store, record| {
                    let _ = store.register_record(record);
                    store
                },
            )
            .reduce(
                || self.empty_like(),
                |mut store, other| {
                    store.merge_unchecked(other);
                    store
                },
            );

        self.merge_unchecked(merged);
        self.tally.since(before)
    }

    fn empty_like(&self) -> Self {
        Self {
            catalog: self.catalog,
            spectra: vec![BySampleSize::new(); self.catalog.len()],
            exclusion: self.exclusion.clone(),
            tally: Tally::default(),
        }
    }

    /// Merges another store into this one.
    ///
    /// # Errors
    ///
    /// If the stores do not use the same catalog.
    pub fn merge(&mut self, other: Store<'_>) -> Result<(), MergeError> {
        if std::ptr::eq(self.catalog, other.catalog) || self.catalog == other.catalog {
            self.merge_unchecked(other);
            Ok(())
        } else {
            Err(MergeError)
        }
    }

    fn merge_unchecked(&mut self, other: Store<'_>) {
        for (by_sample_size, other) in self.spectra.iter_mut().zip(other.spectra) {
            for (sample_size, spectrum) in other {
                *by_sample_size
                    .entry(sample_size)
                    .or_insert_with(|| ObservedSpectrum::zeros(sample_size)) += &spectrum;
            }
        }

        self.tally += other.tally;
    }

    /// Creates a new, empty store without exclusion.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            spectra: vec![BySampleSize::new(); catalog.len()],
            exclusion: None,
            tally: Tally::default(),
        }
    }

    /// Registers a single observed site.
    ///
    /// # Errors
    ///
    /// If the mutation type is not in the catalog, if either count is negative, if the sample size
    /// is greater than [`Store::MAX_SAMPLE_SIZE`], or if the derived count is greater than the
    /// sample size.
    pub fn register(
        &mut self,
        mutation_type: &str,
        sample_size: i64,
        derived_count: i64,
    ) -> Result<(), InvalidRecord> {
        match self.try_register(mutation_type, sample_size, derived_count) {
            Ok(()) => {
                self.tally.registered += 1;
                Ok(())
            }
            Err(e) => {
                self.tally.rejected += 1;
                Err(e)
            }
        }
    }

    /// Registers a record, unless it is excluded.
    ///
    /// Excluded records are skipped and counted, and are not an error.
    ///
    /// # Errors
    ///
    /// See [`Store::register`].
    pub fn register_record(&mut self, record: &Record) -> Result<Registration, InvalidRecord> {
        if self.exclusion.as_ref().is_some_and(|exclude| exclude(record)) {
            self.tally.excluded += 1;
            return Ok(Registration::Excluded);
        }

        self.register(
            &record.mutation_type,
            record.sample_size,
            record.derived_count,
        )
        .map(|()| Registration::Registered)
    }

    /// Returns a frozen copy of the spectra registered so far.
    ///
    /// # Errors
    ///
    /// If nothing has been registered.
    pub fn snapshot(&self) -> Result<ObservedSpectra, EmptyStore> {
        if self.tally.registered == 0 {
            return Err(EmptyStore);
        }

        let inner = self
            .catalog
            .iter()
            .zip(self.spectra.iter())
            .filter(|(_, by_sample_size)| !by_sample_size.is_empty())
            .map(|(&mutation_type, by_sample_size)| (mutation_type, by_sample_size.clone()))
            .collect::<IndexMap<_, _>>();

        Ok(ObservedSpectra::new_unchecked(inner))
    }

    /// Returns the counts of registered, excluded, and rejected records.
    pub fn tally(&self) -> Tally {
        self.tally
    }

    fn try_register(
        &mut self,
        mutation_type: &str,
        sample_size: i64,
        derived_count: i64,
    ) -> Result<(), InvalidRecord> {
        let index = self
            .catalog
            .resolve(mutation_type)
            .ok()
            .and_then(|mutation_type| self.catalog.index_of(&mutation_type))
            .ok_or_else(|| InvalidRecord::UnknownMutationType(mutation_type.to_string()))?;

        let sample_size =
            usize::try_from(sample_size).map_err(|_| InvalidRecord::NegativeSampleSize(sample_size))?;
        let derived_count = usize::try_from(derived_count)
            .map_err(|_| InvalidRecord::NegativeDerivedCount(derived_count))?;

        if sample_size > Self::MAX_SAMPLE_SIZE {
            return Err(InvalidRecord::SampleSizeTooLarge(sample_size));
        }

        if derived_count > sample_size {
            return Err(InvalidRecord::DerivedCountExceedsSampleSize {
                derived_count,
                sample_size,
            });
        }

        self.spectra[index]
            .entry(sample_size)
            .or_insert_with(|| ObservedSpectrum::zeros(sample_size))
            .increment(derived_count);

        Ok(())
    }

    /// Creates a new, empty store which skips records matching the exclusion predicate.
    pub fn with_exclusion<F>(catalog: &'a Catalog, exclusion: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'a,
    {
        Self {
            exclusion: Some(Arc::new(exclusion)),
            ..Self::new(catalog)
        }
    }
}

impl<'a> fmt::Debug for Store<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("tally", &self.tally)
            .field("exclusion", &self.exclusion.is_some())
            .finish_non_exhaustive()
    }
}

/// The outcome of registering a record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Registration {
    /// The record was added to the store.
    Registered,
    /// The record matched the exclusion predicate and was skipped.
    Excluded,
}

/// Counts of records seen by a store.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Tally {
    /// Records added to the store.
    pub registered: u64,
    /// Records skipped by the exclusion predicate.
    pub excluded: u64,
    /// Records rejected as invalid.
    pub rejected: u64,
}

impl Tally {
    fn since(self, before: Tally) -> Tally {
        Tally {
            registered: self.registered - before.registered,
            excluded: self.excluded - before.excluded,
            rejected: self.rejected - before.rejected,
        }
    }

    /// Returns the total number of records seen.
    pub fn total(&self) -> u64 {
        self.registered + self.excluded + self.rejected
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, other: Tally) {
        self.registered += other.registered;
        self.excluded += other.excluded;
        self.rejected += other.rejected;
    }
}

/// An error associated with registering an invalid record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InvalidRecord {
    /// The mutation type is not in the catalog.
    UnknownMutationType(String),
    /// The sample size is negative.
    NegativeSampleSize(i64),
    /// The derived count is negative.
    NegativeDerivedCount(i64),
    /// The derived count is greater than the sample size.
    DerivedCountExceedsSampleSize {
        /// Derived allele count.
        derived_count: usize,
        /// Sample size.
        sample_size: usize,
    },
    /// The sample size is greater than [`Store::MAX_SAMPLE_SIZE`].
    SampleSizeTooLarge(usize),
}

impl InvalidRecord {
    /// Returns the kind of error, without associated data.
    pub fn kind(&self) -> InvalidRecordKind {
        match self {
            InvalidRecord::UnknownMutationType(_) => InvalidRecordKind::UnknownMutationType,
            InvalidRecord::NegativeSampleSize(_) => InvalidRecordKind::NegativeSampleSize,
            InvalidRecord::NegativeDerivedCount(_) => InvalidRecordKind::NegativeDerivedCount,
            InvalidRecord::DerivedCountExceedsSampleSize { .. } => {
                InvalidRecordKind::DerivedCountExceedsSampleSize
            }
            InvalidRecord::SampleSizeTooLarge(_) => InvalidRecordKind::SampleSizeTooLarge,
        }
    }
}

impl fmt::Display for InvalidRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidRecord::UnknownMutationType(m) => {
                write!(f, "invalid record: unknown mutation type '{m}'")
            }
            InvalidRecord::NegativeSampleSize(n) => {
                write!(f, "invalid record: negative sample size {n}")
            }
            InvalidRecord::NegativeDerivedCount(k) => {
                write!(f, "invalid record: negative derived count {k}")
            }
            InvalidRecord::DerivedCountExceedsSampleSize {
                derived_count,
                sample_size,
            } => write!(
                f,
                "invalid record: derived count {derived_count} exceeds sample size {sample_size}"
            ),
            InvalidRecord::SampleSizeTooLarge(n) => write!(
                f,
                "invalid record: sample size {n} exceeds maximum {}",
                Store::MAX_SAMPLE_SIZE
            ),
        }
    }
}

impl std::error::Error for InvalidRecord {}

/// The kind of an [`InvalidRecord`] error.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum InvalidRecordKind {
    /// See [`InvalidRecord::UnknownMutationType`].
    UnknownMutationType,
    /// See [`InvalidRecord::NegativeSampleSize`].
    NegativeSampleSize,
    /// See [`InvalidRecord::NegativeDerivedCount`].
    NegativeDerivedCount,
    /// See [`InvalidRecord::DerivedCountExceedsSampleSize`].
    DerivedCountExceedsSampleSize,
    /// See [`InvalidRecord::SampleSizeTooLarge`].
    SampleSizeTooLarge,
}

impl InvalidRecordKind {
    /// The number of kinds.
    pub const N: usize = Self::VARIANTS.len();

    /// All kinds.
    pub const VARIANTS: [Self; 5] = [
        Self::UnknownMutationType,
        Self::NegativeSampleSize,
        Self::NegativeDerivedCount,
        Self::DerivedCountExceedsSampleSize,
        Self::SampleSizeTooLarge,
    ];

    /// A short description of the kind, for use in messages.
    pub fn reason(&self) -> &'static str {
        match self {
            InvalidRecordKind::UnknownMutationType => "unknown mutation type",
            InvalidRecordKind::NegativeSampleSize => "negative sample size",
            InvalidRecordKind::NegativeDerivedCount => "negative derived count",
            InvalidRecordKind::DerivedCountExceedsSampleSize => {
                "derived count exceeding sample size"
            }
            InvalidRecordKind::SampleSizeTooLarge => "sample size exceeding maximum",
        }
    }
}

/// An error associated with taking a snapshot of an empty store.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EmptyStore;

impl fmt::Display for EmptyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no records registered in store")
    }
}

impl std::error::Error for EmptyStore {}

/// An error associated with merging stores using different catalogs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MergeError;

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("cannot merge stores using different catalogs")
    }
}

impl std::error::Error for MergeError {}
